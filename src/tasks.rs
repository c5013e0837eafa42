//! Named exec tasks and their sequential executor.

use crate::engine::{ContainerEngine, ExecOutput};
use crate::error::ProvisionError;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

const DEFAULT_TASK_TIMEOUT: Duration = Duration::from_secs(120);

/// A command to run inside a service instance.
#[derive(Debug, Clone)]
pub struct ExecTask {
    pub name: String,
    pub command: Vec<String>,
    pub timeout: Duration,
}

impl ExecTask {
    pub fn new(name: impl Into<String>, command: Vec<String>) -> Self {
        Self {
            name: name.into(),
            command,
            timeout: DEFAULT_TASK_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Runs exec tasks inside one target container.
pub struct TaskExecutor {
    engine: Arc<dyn ContainerEngine>,
    container: String,
}

impl TaskExecutor {
    pub fn new(engine: Arc<dyn ContainerEngine>, container: String) -> Self {
        Self { engine, container }
    }

    /// Execute a single task, enforcing its timeout.
    pub async fn execute(&self, task: &ExecTask) -> Result<ExecOutput, ProvisionError> {
        tracing::info!(
            "[TaskExecutor] Executing task '{}' in container '{}'",
            task.name,
            self.container
        );

        let task_start = std::time::Instant::now();
        let result = timeout(task.timeout, self.engine.exec(&self.container, &task.command))
            .await
            .map_err(|_| {
                ProvisionError::Runtime(format!(
                    "task '{}' timed out after {:?}",
                    task.name, task.timeout
                ))
            })?
            .map_err(|e| ProvisionError::Runtime(format!("exec failed: {}", e)))?;

        if result.success() {
            tracing::info!(
                "[TaskExecutor] Task '{}' completed in {}ms",
                task.name,
                task_start.elapsed().as_millis()
            );
        } else {
            tracing::error!(
                "[TaskExecutor] Task '{}' failed (exit {}) after {}ms: {}",
                task.name,
                result.exit_code,
                task_start.elapsed().as_millis(),
                result.last_stderr_line()
            );
        }

        Ok(result)
    }
}

/// Execute a sequence of tasks with progress tracking.
/// Fail-fast: stops on the first task failure.
pub async fn run_tasks<F>(
    tasks: &[ExecTask],
    executor: &TaskExecutor,
    progress_start: u32,
    progress_end: u32,
    progress_fn: F,
) -> Result<(), ProvisionError>
where
    F: Fn(u32, &str),
{
    if tasks.is_empty() {
        return Ok(());
    }

    let total = tasks.len() as u32;
    let span = progress_end.saturating_sub(progress_start);

    for (index, task) in tasks.iter().enumerate() {
        let progress = progress_start + span.saturating_mul(index as u32) / total.max(1);
        progress_fn(progress, &format!("Executing {}", task.name));

        let result = executor.execute(task).await?;
        if !result.success() {
            return Err(ProvisionError::Runtime(format!(
                "task '{}' failed (exit {}): {}",
                task.name,
                result.exit_code,
                result.last_stderr_line()
            )));
        }
    }

    progress_fn(progress_end, "Tasks complete");
    Ok(())
}
