//! MySQL migration lab provisioner.
//!
//! Resets the host's lab container state, builds and launches two MySQL
//! service instances (source and target), waits for them to accept
//! connections, grants the application identity full privileges on both, and
//! populates the source with five sample datasets, each via its own loading
//! strategy. The downstream migration engine consumes the two endpoints this
//! crate produces.

pub mod config;
pub mod datasets;
pub mod engine;
pub mod error;
pub mod import;
pub mod instance;
pub mod lifecycle;
pub mod pipeline;
pub mod privileges;
pub mod progress;
pub mod readiness;
pub mod tasks;

pub use config::{CredentialsConfig, DatasetsConfig, InstancesConfig, LabConfig, ReadinessConfig};
pub use datasets::{catalog, Dataset, ImportContext, InfileStep, LoadStrategy};
pub use engine::{ContainerEngine, DockerEngine, EngineError, ExecOutput, RunContainerSpec};
pub use error::ProvisionError;
pub use import::{ImportJob, ImportOrchestrator, ImportReport, JobStatus};
pub use instance::{InstanceRole, InstanceState, ServiceInstance};
pub use lifecycle::LifecycleManager;
pub use pipeline::{GrantOutcome, PipelineReport, ProvisionPipeline};
pub use privileges::{grant_sql, PrivilegeInitializer};
pub use progress::{
    ChannelProgressReporter, LogProgressReporter, ProgressReporter, ProvisionProgress,
};
pub use readiness::ReadinessProbe;
pub use tasks::{run_tasks, ExecTask, TaskExecutor};
