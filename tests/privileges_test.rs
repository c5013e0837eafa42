//! Integration tests for the privilege initializer.

mod common;

use common::MockEngine;
use mysql_lab::{
    grant_sql, InstanceRole, LabConfig, PrivilegeInitializer, ServiceInstance,
};
use std::sync::Arc;

#[test]
fn test_grant_sql_statement_set() {
    let sql = grant_sql("user", "password");

    assert!(sql.contains("CREATE USER IF NOT EXISTS 'user'@'%'"));
    assert!(sql.contains("GRANT ALL PRIVILEGES ON *.* TO 'user'@'%' WITH GRANT OPTION"));
    assert!(sql.contains("FLUSH PRIVILEGES"));
}

#[test]
fn test_grant_sql_escapes_quoted_credentials() {
    let sql = grant_sql("o'brien", r"pa'ss\word");

    assert!(sql.contains("CREATE USER IF NOT EXISTS 'o''brien'@'%'"));
    assert!(sql.contains(r"IDENTIFIED BY 'pa''ss\\word'"));
    // No credential fragment survives unescaped.
    assert!(!sql.contains("'o'brien'"));
    assert!(!sql.contains(r"'pa'ss\word'"));
}

#[tokio::test]
async fn test_grant_runs_under_administrative_credential() {
    let engine = Arc::new(MockEngine::new());
    let config = LabConfig::default();
    let initializer = PrivilegeInitializer::new(engine.clone(), config.credentials.clone());
    let source = ServiceInstance::from_config(InstanceRole::Source, &config.instances);

    initializer.grant_full_access(&source).await.unwrap();

    let calls = engine.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].starts_with("exec mysql-lab-source mysql -uroot"));
    assert!(calls[0].contains("GRANT ALL PRIVILEGES"));
}

#[tokio::test]
async fn test_grant_is_idempotent_across_invocations() {
    let engine = Arc::new(MockEngine::new());
    let config = LabConfig::default();
    let initializer = PrivilegeInitializer::new(engine.clone(), config.credentials.clone());
    let target = ServiceInstance::from_config(InstanceRole::Target, &config.instances);

    initializer.grant_full_access(&target).await.unwrap();
    initializer.grant_full_access(&target).await.unwrap();

    // The same statement set both times; IF NOT EXISTS keeps it safe.
    let calls = engine.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], calls[1]);
}

#[tokio::test]
async fn test_failed_grant_surfaces_diagnostics() {
    let engine = Arc::new(MockEngine {
        fail_exec_containing: Some("GRANT ALL PRIVILEGES".to_string()),
        ..MockEngine::new()
    });
    let config = LabConfig::default();
    let initializer = PrivilegeInitializer::new(engine, config.credentials.clone());
    let source = ServiceInstance::from_config(InstanceRole::Source, &config.instances);

    let err = initializer.grant_full_access(&source).await.unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("mysql-lab-source"));
    assert!(msg.contains("exit 1"));
}
