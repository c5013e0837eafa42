//! Docker CLI engine.
//!
//! Shells out to the `docker` binary via `tokio::process`. Every resource the
//! lab creates is tagged with the ownership label so the destructive
//! operations here never touch containers or images owned by anything else.

use super::{ContainerEngine, EngineError, ExecOutput, RunContainerSpec, OWNER_LABEL};
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

/// Engine backed by the `docker` command-line client.
pub struct DockerEngine {
    binary: String,
    owner: String,
}

impl DockerEngine {
    pub fn new() -> Self {
        Self {
            binary: "docker".to_string(),
            owner: "mysql-lab".to_string(),
        }
    }

    /// Override the docker binary path (used by integration environments).
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    fn label(&self) -> String {
        format!("{}={}", OWNER_LABEL, self.owner)
    }

    fn label_filter(&self) -> String {
        format!("label={}", self.label())
    }

    /// Run a docker subcommand and capture its output.
    async fn run(&self, args: &[String]) -> Result<ExecOutput, EngineError> {
        tracing::debug!("[DockerEngine] {} {}", self.binary, args.join(" "));

        let output = Command::new(&self.binary)
            .args(args)
            .output()
            .await
            .map_err(|e| {
                EngineError::Unavailable(format!("failed to spawn {}: {}", self.binary, e))
            })?;

        Ok(ExecOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Run a docker subcommand and turn a non-zero exit into an error.
    async fn run_checked(&self, args: &[String]) -> Result<ExecOutput, EngineError> {
        let out = self.run(args).await?;
        if !out.success() {
            return Err(EngineError::CommandFailed {
                exit_code: out.exit_code,
                stderr: out.last_stderr_line().to_string(),
            });
        }
        Ok(out)
    }

    fn parse_ids(out: &ExecOutput) -> Vec<String> {
        out.stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl Default for DockerEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContainerEngine for DockerEngine {
    async fn ping(&self) -> Result<(), EngineError> {
        let args = vec!["version".to_string(), "--format".to_string(), "{{.Server.Version}}".to_string()];
        let out = self.run(&args).await?;
        if !out.success() {
            return Err(EngineError::Unavailable(format!(
                "docker daemon not responding: {}",
                out.last_stderr_line()
            )));
        }
        tracing::debug!("[DockerEngine] daemon version {}", out.stdout.trim());
        Ok(())
    }

    async fn build_image(&self, tag: &str, context: &Path) -> Result<(), EngineError> {
        tracing::info!("[DockerEngine] Building image {} from {:?}", tag, context);
        let args = vec![
            "build".to_string(),
            "--label".to_string(),
            self.label(),
            "-t".to_string(),
            tag.to_string(),
            context.display().to_string(),
        ];
        self.run_checked(&args).await?;
        Ok(())
    }

    async fn run_container(&self, spec: &RunContainerSpec) -> Result<(), EngineError> {
        tracing::info!(
            "[DockerEngine] Starting container {} ({} -> {}:{})",
            spec.name,
            spec.image,
            spec.host_port,
            spec.container_port
        );

        let mut args = vec![
            "run".to_string(),
            "-d".to_string(),
            "--name".to_string(),
            spec.name.clone(),
            "--label".to_string(),
            self.label(),
            "-p".to_string(),
            format!("{}:{}", spec.host_port, spec.container_port),
        ];
        for (key, value) in &spec.env {
            args.push("-e".to_string());
            args.push(format!("{}={}", key, value));
        }
        for (host_path, container_path) in &spec.volumes {
            args.push("-v".to_string());
            args.push(format!("{}:{}:ro", host_path.display(), container_path));
        }
        args.push(spec.image.clone());
        args.extend(spec.args.iter().cloned());

        self.run_checked(&args).await?;
        Ok(())
    }

    async fn list_containers(&self, all: bool) -> Result<Vec<String>, EngineError> {
        let mut args = vec!["ps".to_string(), "-q".to_string()];
        if all {
            args.push("-a".to_string());
        }
        args.push("--filter".to_string());
        args.push(self.label_filter());

        let out = self.run_checked(&args).await?;
        Ok(Self::parse_ids(&out))
    }

    async fn list_images(&self) -> Result<Vec<String>, EngineError> {
        let args = vec![
            "images".to_string(),
            "-q".to_string(),
            "--filter".to_string(),
            self.label_filter(),
        ];
        let out = self.run_checked(&args).await?;
        Ok(Self::parse_ids(&out))
    }

    async fn stop_containers(&self, ids: &[String]) -> Result<(), EngineError> {
        let mut args = vec!["stop".to_string()];
        args.extend(ids.iter().cloned());
        self.run_checked(&args).await?;
        Ok(())
    }

    async fn remove_containers(&self, ids: &[String]) -> Result<(), EngineError> {
        let mut args = vec!["rm".to_string(), "-f".to_string()];
        args.extend(ids.iter().cloned());
        self.run_checked(&args).await?;
        Ok(())
    }

    async fn remove_images(&self, ids: &[String]) -> Result<(), EngineError> {
        let mut args = vec!["rmi".to_string(), "-f".to_string()];
        args.extend(ids.iter().cloned());
        self.run_checked(&args).await?;
        Ok(())
    }

    async fn prune(&self) -> Result<(), EngineError> {
        let args = vec![
            "system".to_string(),
            "prune".to_string(),
            "-af".to_string(),
            "--filter".to_string(),
            self.label_filter(),
        ];
        self.run_checked(&args).await?;
        Ok(())
    }

    async fn exec(&self, container: &str, cmd: &[String]) -> Result<ExecOutput, EngineError> {
        let mut args = vec!["exec".to_string(), container.to_string()];
        args.extend(cmd.iter().cloned());
        // Exit code of the inner command is part of the result, not an error.
        self.run(&args).await
    }
}
