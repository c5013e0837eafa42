//! Error types for provisioning operations.

use thiserror::Error;

/// Error type for the provisioning pipeline.
///
/// Fatal variants (`EngineUnavailable`, `ImageBuild`, `ContainerStart`,
/// `ReadinessTimeout`) abort the pipeline. Grant and import failures are
/// recorded into the final report instead of being raised through here.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("Container engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("Image build failed: {0}")]
    ImageBuild(String),

    #[error("Container start failed: {0}")]
    ContainerStart(String),

    #[error("Readiness timeout: {0}")]
    ReadinessTimeout(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
