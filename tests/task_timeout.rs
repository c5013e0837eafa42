//! Integration tests for per-task timeout enforcement.

mod common;

use common::MockEngine;
use mysql_lab::{run_tasks, ExecTask, ProvisionError, TaskExecutor};
use std::sync::Arc;
use std::time::Duration;

fn slow_engine(delay: Duration) -> Arc<MockEngine> {
    Arc::new(MockEngine {
        exec_delay: Some(delay),
        ..MockEngine::new()
    })
}

#[tokio::test]
async fn test_task_exceeding_its_timeout_fails() {
    let engine = slow_engine(Duration::from_secs(5));
    let executor = TaskExecutor::new(engine, "mysql-lab-source".to_string());
    let task = ExecTask::new(
        "slow statement",
        vec!["mysql".to_string(), "-e".to_string(), "SELECT 1;".to_string()],
    )
    .with_timeout(Duration::from_millis(50));

    match executor.execute(&task).await {
        Err(ProvisionError::Runtime(msg)) => {
            assert!(msg.contains("slow statement"));
            assert!(msg.contains("timed out"));
        }
        other => panic!("expected Runtime timeout error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_task_within_its_timeout_succeeds() {
    let engine = slow_engine(Duration::from_millis(10));
    let executor = TaskExecutor::new(engine, "mysql-lab-source".to_string());
    let task = ExecTask::new("quick statement", vec!["mysql".to_string()])
        .with_timeout(Duration::from_secs(5));

    let out = executor.execute(&task).await.unwrap();
    assert!(out.success());
}

#[tokio::test]
async fn test_timed_out_task_stops_the_sequence() {
    let engine = slow_engine(Duration::from_secs(5));
    let executor = TaskExecutor::new(engine.clone(), "mysql-lab-source".to_string());
    let tasks = vec![
        ExecTask::new("first", vec!["mysql".to_string()])
            .with_timeout(Duration::from_millis(50)),
        ExecTask::new("second", vec!["mysql".to_string()]),
    ];

    let result = run_tasks(&tasks, &executor, 0, 100, |_, _| {}).await;
    assert!(result.is_err());

    // Only the timed-out exec was ever issued.
    let execs: Vec<String> = engine
        .calls()
        .into_iter()
        .filter(|c| c.starts_with("exec"))
        .collect();
    assert_eq!(execs.len(), 1);
}
