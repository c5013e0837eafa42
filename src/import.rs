//! Dataset import orchestration against the source instance.
//!
//! Jobs run in catalog order. A failing job is recorded with its diagnostic
//! and the orchestrator moves on to the next dataset: the five datasets are
//! independent, so one failure never blocks the rest. The aggregated report
//! is the orchestrator's result; nothing is discarded.

use crate::datasets::{catalog, Dataset, ImportContext};
use crate::engine::ContainerEngine;
use crate::progress::ProgressReporter;
use crate::tasks::{run_tasks, ExecTask, TaskExecutor};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Terminal-once state machine of one import job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

/// One dataset's import outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportJob {
    pub dataset: String,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

impl ImportJob {
    fn new(dataset: &str) -> Self {
        Self {
            dataset: dataset.to_string(),
            status: JobStatus::Pending,
            diagnostic: None,
        }
    }
}

/// Aggregated outcome of a full import run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub jobs: Vec<ImportJob>,
}

impl ImportReport {
    pub fn all_succeeded(&self) -> bool {
        self.jobs.iter().all(|j| j.status == JobStatus::Succeeded)
    }

    pub fn failed_jobs(&self) -> Vec<&ImportJob> {
        self.jobs
            .iter()
            .filter(|j| j.status == JobStatus::Failed)
            .collect()
    }
}

/// Sequences the five dataset import jobs into the source instance.
pub struct ImportOrchestrator {
    engine: Arc<dyn ContainerEngine>,
    source_container: String,
    ctx: ImportContext,
}

impl ImportOrchestrator {
    pub fn new(
        engine: Arc<dyn ContainerEngine>,
        source_container: String,
        ctx: ImportContext,
    ) -> Self {
        Self {
            engine,
            source_container,
            ctx,
        }
    }

    /// Run every import job, continuing through failures.
    pub async fn run(&self, reporter: &dyn ProgressReporter) -> ImportReport {
        let datasets = catalog();
        let executor = TaskExecutor::new(self.engine.clone(), self.source_container.clone());

        // Precondition for the bulk text-file loads: the server-side flag
        // must be on before any job that depends on it executes.
        if datasets.iter().any(Dataset::requires_local_infile) {
            if let Err(diag) = self.enable_local_infile(&executor).await {
                tracing::warn!("[Import] Could not enable local_infile: {}", diag);
            }
        }

        let total = datasets.len() as u32;
        let mut jobs = Vec::with_capacity(datasets.len());

        for (index, dataset) in datasets.iter().enumerate() {
            let mut job = ImportJob::new(dataset.name);
            job.status = JobStatus::Running;

            let pct = (index as u32) * 100 / total;
            reporter.emit_phased(
                pct,
                format!("Importing dataset {}", dataset.name),
                Some("import".to_string()),
                Some(dataset.name.to_string()),
            );
            tracing::info!(
                "[Import] ({}/{}) Loading dataset '{}' into database '{}'",
                index + 1,
                total,
                dataset.name,
                dataset.database
            );

            match self.run_plan(&executor, dataset).await {
                Ok(()) => {
                    job.status = JobStatus::Succeeded;
                    tracing::info!("[Import] Dataset '{}' loaded", dataset.name);
                }
                Err(diag) => {
                    tracing::error!("[Import] Dataset '{}' failed: {}", dataset.name, diag);
                    job.status = JobStatus::Failed;
                    job.diagnostic = Some(diag);
                    // Remaining datasets are independent; keep going.
                }
            }
            jobs.push(job);
        }

        reporter.emit_phased(
            100,
            "Dataset imports finished".to_string(),
            Some("import".to_string()),
            None,
        );

        let report = ImportReport { jobs };
        let failed = report.failed_jobs();
        if failed.is_empty() {
            tracing::info!("[Import] All {} datasets imported", total);
        } else {
            tracing::warn!(
                "[Import] {} of {} datasets failed: {}",
                failed.len(),
                total,
                failed
                    .iter()
                    .map(|j| j.dataset.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
        report
    }

    /// Execute one dataset's plan. The first failing task fails the job and
    /// skips the job's remaining tasks (intra-dataset ordering).
    async fn run_plan(&self, executor: &TaskExecutor, dataset: &Dataset) -> Result<(), String> {
        let plan = dataset.plan(&self.ctx);
        run_tasks(&plan, executor, 0, 100, |pct, msg| {
            tracing::debug!("[Import] {} {:>3}% {}", dataset.name, pct, msg);
        })
        .await
        .map_err(|e| e.to_string())
    }

    async fn enable_local_infile(&self, executor: &TaskExecutor) -> Result<(), String> {
        let task = ExecTask::new(
            "enable local_infile",
            vec![
                "mysql".to_string(),
                "-uroot".to_string(),
                format!("-p{}", self.ctx.root_password),
                "-e".to_string(),
                "SET GLOBAL local_infile = 'ON';".to_string(),
            ],
        );
        let outcome = executor.execute(&task).await.map_err(|e| e.to_string())?;
        if !outcome.success() {
            return Err(format!(
                "exit {}: {}",
                outcome.exit_code,
                outcome.last_stderr_line()
            ));
        }
        Ok(())
    }
}
