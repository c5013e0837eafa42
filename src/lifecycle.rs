//! Container lifecycle operations (reset, build, run).

use crate::engine::{ContainerEngine, EngineError, RunContainerSpec};
use crate::error::ProvisionError;
use std::path::Path;
use std::sync::Arc;

/// Destroys prior lab state, builds fresh images, and launches instances.
pub struct LifecycleManager {
    engine: Arc<dyn ContainerEngine>,
}

impl LifecycleManager {
    pub fn new(engine: Arc<dyn ContainerEngine>) -> Self {
        Self { engine }
    }

    /// Stop and remove every lab-labeled container, remove every lab-labeled
    /// image, then prune leftover lab state.
    ///
    /// Empty selections are skipped entirely: the underlying commands fail on
    /// empty argument lists and an empty host is a valid starting point.
    pub async fn reset_environment(&self) -> Result<(), ProvisionError> {
        tracing::info!("[Lifecycle] Resetting lab container state");

        let running = self.engine.list_containers(false).await.map_err(fatal)?;
        if running.is_empty() {
            tracing::debug!("[Lifecycle] No running lab containers to stop");
        } else {
            tracing::info!("[Lifecycle] Stopping {} container(s)", running.len());
            self.engine.stop_containers(&running).await.map_err(fatal)?;
        }

        let all = self.engine.list_containers(true).await.map_err(fatal)?;
        if all.is_empty() {
            tracing::debug!("[Lifecycle] No lab containers to remove");
        } else {
            tracing::info!("[Lifecycle] Removing {} container(s)", all.len());
            self.engine.remove_containers(&all).await.map_err(fatal)?;
        }

        let images = self.engine.list_images().await.map_err(fatal)?;
        if images.is_empty() {
            tracing::debug!("[Lifecycle] No lab images to remove");
        } else {
            tracing::info!("[Lifecycle] Removing {} image(s)", images.len());
            self.engine.remove_images(&images).await.map_err(fatal)?;
        }

        self.engine.prune().await.map_err(fatal)?;
        tracing::info!("[Lifecycle] Environment reset complete");
        Ok(())
    }

    /// Build a named image. Failure is fatal: no instance can start from a
    /// missing image.
    pub async fn build_image(&self, tag: &str, context: &Path) -> Result<(), ProvisionError> {
        self.engine
            .build_image(tag, context)
            .await
            .map_err(|e| ProvisionError::ImageBuild(format!("{}: {}", tag, e)))?;
        tracing::info!("[Lifecycle] Built image {}", tag);
        Ok(())
    }

    /// Launch a detached instance. Failure is fatal.
    pub async fn run_instance(&self, spec: &RunContainerSpec) -> Result<(), ProvisionError> {
        self.engine
            .run_container(spec)
            .await
            .map_err(|e| ProvisionError::ContainerStart(format!("{}: {}", spec.name, e)))?;
        tracing::info!(
            "[Lifecycle] Instance {} running on host port {}",
            spec.name,
            spec.host_port
        );
        Ok(())
    }
}

fn fatal(e: EngineError) -> ProvisionError {
    match e {
        EngineError::Unavailable(msg) => ProvisionError::EngineUnavailable(msg),
        other => ProvisionError::Runtime(other.to_string()),
    }
}
