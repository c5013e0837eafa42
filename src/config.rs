//! Lab configuration.
//! Loaded from mysql-lab.toml; credentials can be overridden from the
//! environment so no password has to live in a checked-in file.

use crate::error::ProvisionError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for the provisioning pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LabConfig {
    #[serde(default)]
    pub instances: InstancesConfig,

    #[serde(default)]
    pub credentials: CredentialsConfig,

    #[serde(default)]
    pub readiness: ReadinessConfig,

    #[serde(default)]
    pub datasets: DatasetsConfig,
}

impl LabConfig {
    /// Load configuration from `app_dir`, falling back to defaults when no
    /// file is present. Environment overrides are applied last. Candidates
    /// resolve against `app_dir` only, never the process working directory.
    pub fn load(app_dir: &Path) -> Result<Self, ProvisionError> {
        let config_paths = [
            app_dir.join("mysql-lab.toml"),
            app_dir.join("config").join("mysql-lab.toml"),
        ];

        let mut config = None;
        for path in config_paths {
            if path.exists() {
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    ProvisionError::Config(format!("failed to read config file {:?}: {}", path, e))
                })?;
                let parsed: LabConfig = toml::from_str(&content).map_err(|e| {
                    ProvisionError::Config(format!("failed to parse config file {:?}: {}", path, e))
                })?;
                tracing::info!("[Config] Loaded lab config from {:?}", path);
                config = Some(parsed);
                break;
            }
        }

        let mut config = config.unwrap_or_else(|| {
            tracing::warn!("[Config] No mysql-lab.toml found, using defaults");
            LabConfig::default()
        });

        config.credentials.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Enforce the role/port invariant: distinct host ports, same container
    /// port for both instances by construction.
    pub fn validate(&self) -> Result<(), ProvisionError> {
        if self.instances.source.host_port == self.instances.target.host_port {
            return Err(ProvisionError::Config(format!(
                "source and target must use distinct host ports (both {})",
                self.instances.source.host_port
            )));
        }
        Ok(())
    }
}

/// Per-instance settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceConfig {
    pub container_name: String,
    pub image_tag: String,
    pub build_context: PathBuf,
    pub host_port: u16,
}

/// Settings for both service instances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstancesConfig {
    #[serde(default = "default_source_instance")]
    pub source: InstanceConfig,

    #[serde(default = "default_target_instance")]
    pub target: InstanceConfig,

    /// Internal MySQL port, identical for both instances.
    #[serde(default = "default_container_port")]
    pub container_port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_source_instance() -> InstanceConfig {
    InstanceConfig {
        container_name: "mysql-lab-source".to_string(),
        image_tag: "mysql-lab/source:latest".to_string(),
        build_context: PathBuf::from("docker/source"),
        host_port: 3307,
    }
}

fn default_target_instance() -> InstanceConfig {
    InstanceConfig {
        container_name: "mysql-lab-target".to_string(),
        image_tag: "mysql-lab/target:latest".to_string(),
        build_context: PathBuf::from("docker/target"),
        host_port: 3308,
    }
}

fn default_container_port() -> u16 {
    3306
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

impl Default for InstancesConfig {
    fn default() -> Self {
        Self {
            source: default_source_instance(),
            target: default_target_instance(),
            container_port: default_container_port(),
            host: default_host(),
        }
    }
}

/// Administrative and application credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Root password handed to the image at container start.
    #[serde(default = "default_password")]
    pub root_password: String,

    /// Application identity the Privilege Initializer grants.
    #[serde(default = "default_app_user")]
    pub app_user: String,

    #[serde(default = "default_password")]
    pub app_password: String,
}

fn default_app_user() -> String {
    "user".to_string()
}

fn default_password() -> String {
    "password".to_string()
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            root_password: default_password(),
            app_user: default_app_user(),
            app_password: default_password(),
        }
    }
}

impl CredentialsConfig {
    /// Environment variables win over file values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("MYSQL_LAB_ROOT_PASSWORD") {
            self.root_password = v;
        }
        if let Ok(v) = std::env::var("MYSQL_LAB_APP_USER") {
            self.app_user = v;
        }
        if let Ok(v) = std::env::var("MYSQL_LAB_APP_PASSWORD") {
            self.app_password = v;
        }
    }
}

/// Readiness probe tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessConfig {
    /// Overall deadline for both instances to accept connections.
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,

    /// Per-attempt TCP connect timeout.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

fn default_deadline_secs() -> u64 {
    60
}

fn default_connect_timeout_ms() -> u64 {
    1000
}

fn default_initial_backoff_ms() -> u64 {
    500
}

fn default_max_backoff_ms() -> u64 {
    8000
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            deadline_secs: default_deadline_secs(),
            connect_timeout_ms: default_connect_timeout_ms(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// Where the sample datasets live and how they are mounted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetsConfig {
    /// Host directory holding the five dataset directories.
    #[serde(default = "default_datasets_dir")]
    pub host_dir: PathBuf,

    /// Mount point inside the source container.
    #[serde(default = "default_container_dir")]
    pub container_dir: String,

    /// Worker count handed to the dump-loading utility (airport).
    #[serde(default = "default_dump_threads")]
    pub dump_threads: u32,
}

fn default_datasets_dir() -> PathBuf {
    PathBuf::from("datasets")
}

fn default_container_dir() -> String {
    "/opt/datasets".to_string()
}

fn default_dump_threads() -> u32 {
    4
}

impl Default for DatasetsConfig {
    fn default() -> Self {
        Self {
            host_dir: default_datasets_dir(),
            container_dir: default_container_dir(),
            dump_threads: default_dump_threads(),
        }
    }
}
