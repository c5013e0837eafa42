//! Progress reporting for pipeline phases.

use serde::{Deserialize, Serialize};

/// Progress event emitted while the pipeline runs.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct ProvisionProgress {
    pub percentage: u32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

impl ProvisionProgress {
    pub fn new(percentage: u32, message: String) -> Self {
        Self {
            percentage,
            message,
            phase: None,
            instance: None,
        }
    }
}

/// Progress reporter for provisioning phases.
pub trait ProgressReporter: Send + Sync + 'static {
    fn emit(&self, percentage: u32, message: String);

    /// Emit progress with phase and instance metadata.
    fn emit_phased(
        &self,
        percentage: u32,
        message: String,
        _phase: Option<String>,
        _instance: Option<String>,
    ) {
        self.emit(percentage, message);
    }
}

/// Channel-based progress reporter.
pub struct ChannelProgressReporter {
    sender: tokio::sync::mpsc::Sender<ProvisionProgress>,
}

impl ChannelProgressReporter {
    pub fn new(sender: tokio::sync::mpsc::Sender<ProvisionProgress>) -> Self {
        Self { sender }
    }
}

impl ProgressReporter for ChannelProgressReporter {
    fn emit(&self, percentage: u32, message: String) {
        self.emit_phased(percentage, message, None, None);
    }

    fn emit_phased(
        &self,
        percentage: u32,
        message: String,
        phase: Option<String>,
        instance: Option<String>,
    ) {
        let mut progress = ProvisionProgress::new(percentage, message);
        progress.phase = phase;
        progress.instance = instance;
        let _ = self.sender.try_send(progress);
    }
}

/// Reporter that forwards progress straight to the log.
pub struct LogProgressReporter;

impl ProgressReporter for LogProgressReporter {
    fn emit(&self, percentage: u32, message: String) {
        tracing::info!("[Progress] {:>3}% {}", percentage, message);
    }
}
