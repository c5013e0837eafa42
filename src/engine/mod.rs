//! Container engine abstraction.
//!
//! The pipeline talks to the container host through `ContainerEngine` so the
//! orchestration logic can be exercised against a mock engine in tests. All
//! list/stop/remove operations are scoped to resources carrying the lab's
//! ownership label.

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

pub mod docker;
pub use docker::DockerEngine;

/// Ownership label applied to every container and image the lab creates.
/// Reset only ever acts on resources carrying this label.
pub const OWNER_LABEL: &str = "mysql.lab.owner";

/// Result of a command executed inside a container.
#[derive(Debug, Clone)]
pub struct ExecOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Last stderr line, the most useful fragment for diagnostics.
    pub fn last_stderr_line(&self) -> &str {
        self.stderr.lines().last().unwrap_or("no output available")
    }
}

/// Parameters for launching a detached service container.
#[derive(Debug, Clone, Default)]
pub struct RunContainerSpec {
    pub name: String,
    pub image: String,
    pub host_port: u16,
    pub container_port: u16,
    /// Environment variables passed to the container.
    pub env: Vec<(String, String)>,
    /// Read-only bind mounts, host path to container path.
    pub volumes: Vec<(std::path::PathBuf, String)>,
    /// Extra arguments appended after the image (forwarded to the entrypoint).
    pub args: Vec<String>,
}

/// Container engine errors.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Engine unavailable: {0}")]
    Unavailable(String),

    #[error("Command failed (exit {exit_code}): {stderr}")]
    CommandFailed { exit_code: i32, stderr: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

/// Container lifecycle and exec operations, label-scoped.
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Confirm the engine daemon is reachable.
    async fn ping(&self) -> Result<(), EngineError>;

    /// Build a named image from a build context directory.
    async fn build_image(&self, tag: &str, context: &Path) -> Result<(), EngineError>;

    /// Start a detached container with a fixed port mapping.
    async fn run_container(&self, spec: &RunContainerSpec) -> Result<(), EngineError>;

    /// IDs of lab-labeled containers. `all` includes stopped ones.
    async fn list_containers(&self, all: bool) -> Result<Vec<String>, EngineError>;

    /// IDs of lab-labeled images.
    async fn list_images(&self) -> Result<Vec<String>, EngineError>;

    async fn stop_containers(&self, ids: &[String]) -> Result<(), EngineError>;

    async fn remove_containers(&self, ids: &[String]) -> Result<(), EngineError>;

    async fn remove_images(&self, ids: &[String]) -> Result<(), EngineError>;

    /// Prune leftover lab-labeled state.
    async fn prune(&self) -> Result<(), EngineError>;

    /// Execute a command inside a running container. A non-zero exit code is
    /// reported through `ExecOutput`, not as an `Err`.
    async fn exec(&self, container: &str, cmd: &[String]) -> Result<ExecOutput, EngineError>;
}
