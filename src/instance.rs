//! Service instance model.

use crate::config::InstancesConfig;
use serde::{Deserialize, Serialize};

/// Role of a service instance in the migration lab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstanceRole {
    /// Holds the five sample datasets; the migration origin.
    Source,
    /// Empty instance the downstream migrator copies into.
    Target,
}

impl InstanceRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceRole::Source => "source",
            InstanceRole::Target => "target",
        }
    }
}

/// Lifecycle state of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstanceState {
    Created,
    Running,
    Stopped,
    Failed,
}

/// A MySQL server instance reachable over a fixed host port mapping.
///
/// Both roles expose the same container-internal port and are distinguished
/// only by the host side of the mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInstance {
    pub role: InstanceRole,
    pub container_name: String,
    pub image_tag: String,
    pub host: String,
    pub host_port: u16,
    pub container_port: u16,
    pub state: InstanceState,
}

impl ServiceInstance {
    pub fn from_config(role: InstanceRole, instances: &InstancesConfig) -> Self {
        let inst = match role {
            InstanceRole::Source => &instances.source,
            InstanceRole::Target => &instances.target,
        };
        Self {
            role,
            container_name: inst.container_name.clone(),
            image_tag: inst.image_tag.clone(),
            host: instances.host.clone(),
            host_port: inst.host_port,
            container_port: instances.container_port,
            state: InstanceState::Created,
        }
    }

    /// Host-side endpoint the downstream migrator connects to.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.host_port)
    }
}
