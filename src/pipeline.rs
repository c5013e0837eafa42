//! End-to-end provisioning pipeline.
//!
//! Sequencing: reset -> build both images -> run both containers ->
//! readiness -> grants (both instances) -> dataset imports (source only).
//! Fatal conditions (engine down, build or start failure, readiness timeout)
//! abort immediately; grant and import failures are recorded into the final
//! report and the pipeline continues to the next independent step.

use crate::config::LabConfig;
use crate::datasets::ImportContext;
use crate::engine::{ContainerEngine, EngineError, RunContainerSpec};
use crate::error::ProvisionError;
use crate::import::{ImportOrchestrator, ImportReport};
use crate::instance::{InstanceRole, InstanceState, ServiceInstance};
use crate::lifecycle::LifecycleManager;
use crate::privileges::PrivilegeInitializer;
use crate::progress::ProgressReporter;
use crate::readiness::ReadinessProbe;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Outcome of one grant step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantOutcome {
    pub instance: String,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

/// Aggregated outcome of a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub grants: Vec<GrantOutcome>,
    pub imports: ImportReport,
    pub elapsed_secs: f64,
}

impl PipelineReport {
    pub fn all_succeeded(&self) -> bool {
        self.grants.iter().all(|g| g.succeeded) && self.imports.all_succeeded()
    }
}

/// The environment-provisioning pipeline.
pub struct ProvisionPipeline {
    engine: Arc<dyn ContainerEngine>,
    config: LabConfig,
}

impl ProvisionPipeline {
    pub fn new(engine: Arc<dyn ContainerEngine>, config: LabConfig) -> Self {
        Self { engine, config }
    }

    /// Run the full pipeline and return the aggregated report.
    pub async fn run(
        &self,
        reporter: &dyn ProgressReporter,
    ) -> Result<PipelineReport, ProvisionError> {
        let started = Instant::now();
        self.config.validate()?;

        // Engine down is fatal before anything else runs.
        self.engine.ping().await.map_err(|e| match e {
            EngineError::Unavailable(msg) => ProvisionError::EngineUnavailable(msg),
            other => ProvisionError::EngineUnavailable(other.to_string()),
        })?;

        let lifecycle = LifecycleManager::new(self.engine.clone());

        reporter.emit(0, "Resetting environment".to_string());
        lifecycle.reset_environment().await?;

        let mut source = ServiceInstance::from_config(InstanceRole::Source, &self.config.instances);
        let mut target = ServiceInstance::from_config(InstanceRole::Target, &self.config.instances);

        reporter.emit(10, "Building instance images".to_string());
        lifecycle
            .build_image(&source.image_tag, &self.config.instances.source.build_context)
            .await?;
        lifecycle
            .build_image(&target.image_tag, &self.config.instances.target.build_context)
            .await?;

        reporter.emit(25, "Starting instances".to_string());
        lifecycle.run_instance(&self.run_spec(&source)).await?;
        source.state = InstanceState::Running;
        lifecycle.run_instance(&self.run_spec(&target)).await?;
        target.state = InstanceState::Running;

        reporter.emit(35, "Waiting for instances to accept connections".to_string());
        let probe = ReadinessProbe::new(&self.config.readiness);
        let endpoints = vec![
            (source.role.as_str().to_string(), source.endpoint()),
            (target.role.as_str().to_string(), target.endpoint()),
        ];
        probe.wait_until_ready(&endpoints, reporter).await?;

        reporter.emit(60, "Granting application privileges".to_string());
        let privileges =
            PrivilegeInitializer::new(self.engine.clone(), self.config.credentials.clone());
        let mut grants = Vec::new();
        // The two grants are independent; record failures and continue.
        for instance in [&source, &target] {
            let outcome = match privileges.grant_full_access(instance).await {
                Ok(()) => GrantOutcome {
                    instance: instance.role.as_str().to_string(),
                    succeeded: true,
                    diagnostic: None,
                },
                Err(e) => {
                    tracing::error!(
                        "[Pipeline] Grant on {} instance failed: {}",
                        instance.role.as_str(),
                        e
                    );
                    GrantOutcome {
                        instance: instance.role.as_str().to_string(),
                        succeeded: false,
                        diagnostic: Some(e.to_string()),
                    }
                }
            };
            grants.push(outcome);
        }

        reporter.emit(65, "Importing sample datasets".to_string());
        let orchestrator = ImportOrchestrator::new(
            self.engine.clone(),
            source.container_name.clone(),
            ImportContext {
                dataset_root: self.config.datasets.container_dir.clone(),
                root_password: self.config.credentials.root_password.clone(),
                dump_threads: self.config.datasets.dump_threads,
            },
        );
        let imports = orchestrator.run(reporter).await;

        let report = PipelineReport {
            grants,
            imports,
            elapsed_secs: started.elapsed().as_secs_f64(),
        };

        reporter.emit(100, "Provisioning finished".to_string());
        tracing::info!(
            "[Pipeline] Finished in {:.1}s, source={} target={}, overall {}",
            report.elapsed_secs,
            source.endpoint(),
            target.endpoint(),
            if report.all_succeeded() { "ok" } else { "with failures" }
        );

        Ok(report)
    }

    /// Container run parameters for one instance. The source instance gets
    /// the datasets mount and server-side local-infile support; the target
    /// starts empty.
    fn run_spec(&self, instance: &ServiceInstance) -> RunContainerSpec {
        let mut spec = RunContainerSpec {
            name: instance.container_name.clone(),
            image: instance.image_tag.clone(),
            host_port: instance.host_port,
            container_port: instance.container_port,
            env: vec![(
                "MYSQL_ROOT_PASSWORD".to_string(),
                self.config.credentials.root_password.clone(),
            )],
            volumes: Vec::new(),
            args: Vec::new(),
        };
        if instance.role == InstanceRole::Source {
            spec.volumes.push((
                self.config.datasets.host_dir.clone(),
                self.config.datasets.container_dir.clone(),
            ));
            spec.args.push("--local-infile=1".to_string());
        }
        spec
    }
}
