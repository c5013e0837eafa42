//! Mock container engine shared across integration tests.

use async_trait::async_trait;
use mysql_lab::{ContainerEngine, EngineError, ExecOutput, RunContainerSpec};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

/// In-memory engine recording every call, with failure injection knobs.
#[derive(Default)]
pub struct MockEngine {
    pub calls: Mutex<Vec<String>>,
    pub running: Mutex<Vec<String>>,
    pub stopped: Mutex<Vec<String>>,
    pub images: Mutex<Vec<String>>,
    pub fail_build: bool,
    /// Fail any exec whose rendered command line contains this fragment.
    pub fail_exec_containing: Option<String>,
    /// Hold every exec for this long before responding.
    pub exec_delay: Option<Duration>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine seeded with pre-existing lab containers and images.
    pub fn with_existing(running: &[&str], images: &[&str]) -> Self {
        Self {
            running: Mutex::new(running.iter().map(|s| s.to_string()).collect()),
            images: Mutex::new(images.iter().map(|s| s.to_string()).collect()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ContainerEngine for MockEngine {
    async fn ping(&self) -> Result<(), EngineError> {
        self.record("ping".to_string());
        Ok(())
    }

    async fn build_image(&self, tag: &str, _context: &Path) -> Result<(), EngineError> {
        self.record(format!("build {}", tag));
        if self.fail_build {
            return Err(EngineError::CommandFailed {
                exit_code: 1,
                stderr: "simulated build failure".to_string(),
            });
        }
        self.images.lock().unwrap().push(tag.to_string());
        Ok(())
    }

    async fn run_container(&self, spec: &RunContainerSpec) -> Result<(), EngineError> {
        self.record(format!(
            "run {} {} {}:{}",
            spec.name, spec.image, spec.host_port, spec.container_port
        ));
        self.running.lock().unwrap().push(spec.name.clone());
        Ok(())
    }

    async fn list_containers(&self, all: bool) -> Result<Vec<String>, EngineError> {
        let mut ids = self.running.lock().unwrap().clone();
        if all {
            ids.extend(self.stopped.lock().unwrap().iter().cloned());
        }
        Ok(ids)
    }

    async fn list_images(&self) -> Result<Vec<String>, EngineError> {
        Ok(self.images.lock().unwrap().clone())
    }

    async fn stop_containers(&self, ids: &[String]) -> Result<(), EngineError> {
        self.record(format!("stop {}", ids.join(",")));
        let mut running = self.running.lock().unwrap();
        self.stopped.lock().unwrap().extend(running.drain(..));
        Ok(())
    }

    async fn remove_containers(&self, ids: &[String]) -> Result<(), EngineError> {
        self.record(format!("rm {}", ids.join(",")));
        self.running.lock().unwrap().clear();
        self.stopped.lock().unwrap().clear();
        Ok(())
    }

    async fn remove_images(&self, ids: &[String]) -> Result<(), EngineError> {
        self.record(format!("rmi {}", ids.join(",")));
        self.images.lock().unwrap().clear();
        Ok(())
    }

    async fn prune(&self) -> Result<(), EngineError> {
        self.record("prune".to_string());
        Ok(())
    }

    async fn exec(&self, container: &str, cmd: &[String]) -> Result<ExecOutput, EngineError> {
        let line = format!("exec {} {}", container, cmd.join(" "));
        self.record(line.clone());

        if let Some(delay) = self.exec_delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(fragment) = &self.fail_exec_containing {
            if line.contains(fragment.as_str()) {
                return Ok(ExecOutput {
                    exit_code: 1,
                    stdout: String::new(),
                    stderr: "simulated exec failure".to_string(),
                });
            }
        }

        Ok(ExecOutput {
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}
