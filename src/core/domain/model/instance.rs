//! Domain models for containers and virtual machines on a node.
//!
//! Proxmox exposes the two instance kinds under parallel API trees
//! (`/nodes/{node}/lxc/...` and `/nodes/{node}/qemu/...`) that share one
//! numeric id space. [`InstanceKind`] selects the tree.

use crate::core::domain::{
    error::{ProxmoxResult, ValidationError},
    value_object::{InstanceId, NodeName},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The instance category, which decides the API sub-path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum InstanceKind {
    /// An LXC container (`lxc`).
    #[serde(rename = "lxc", alias = "container")]
    Container,
    /// A QEMU/KVM virtual machine (`qemu`).
    #[serde(rename = "qemu", alias = "vm")]
    VirtualMachine,
}

impl InstanceKind {
    /// The path segment used by the Proxmox API for this kind.
    #[must_use]
    pub fn api_segment(self) -> &'static str {
        match self {
            InstanceKind::Container => "lxc",
            InstanceKind::VirtualMachine => "qemu",
        }
    }

    /// Human-readable label used in outcome messages.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            InstanceKind::Container => "Container",
            InstanceKind::VirtualMachine => "Virtual machine",
        }
    }
}

impl fmt::Display for InstanceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_segment())
    }
}

/// Normalized power state of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerState {
    Running,
    Stopped,
    /// The state could not be determined (unreachable, unknown id, odd status).
    Unknown,
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PowerState::Running => "running",
            PowerState::Stopped => "stopped",
            PowerState::Unknown => "unknown",
        })
    }
}

/// Addresses an existing instance: id, node and kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceTarget {
    pub id: InstanceId,
    pub node: NodeName,
    pub kind: InstanceKind,
}

impl InstanceTarget {
    pub fn new(id: InstanceId, node: NodeName, kind: InstanceKind) -> Self {
        Self { id, node, kind }
    }

    /// Builds a target from a stored request record whose id may not be set yet.
    ///
    /// # Errors
    /// Returns `ProxmoxError::Validation` if `id` is absent or reserved.
    pub fn from_record(id: Option<u32>, node: NodeName, kind: InstanceKind) -> ProxmoxResult<Self> {
        let id = id.ok_or_else(|| {
            ValidationError::field("instance_id", "No instance is associated with this request")
        })?;
        Ok(Self::new(InstanceId::new(id)?, node, kind))
    }

    /// API path of the instance itself, relative to `/api2/json`.
    pub(crate) fn path(&self) -> String {
        format!(
            "nodes/{}/{}/{}",
            self.node,
            self.kind.api_segment(),
            self.id
        )
    }

    /// API path of one of the instance's `status/*` endpoints.
    pub(crate) fn status_path(&self, action: &str) -> String {
        format!("{}/status/{}", self.path(), action)
    }
}

impl fmt::Display for InstanceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.node, self.kind.api_segment(), self.id)
    }
}

/// An entry of `/nodes/{node}/{lxc|qemu}`. Only the id is needed for allocation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InstanceListItem {
    /// Proxmox returns the id as a number for qemu and occasionally as a string for lxc.
    #[serde(deserialize_with = "vmid::deserialize")]
    pub vmid: u32,
}

/// Runtime status from `/nodes/{node}/{lxc|qemu}/{vmid}/status/current`.
///
/// Containers and VMs report different field sets; both fields are optional
/// here and [`InstanceStatusCurrent::power_state`] reconciles them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InstanceStatusCurrent {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub uptime: Option<u64>,
}

impl InstanceStatusCurrent {
    /// Explicit `status` wins; otherwise a positive uptime means running.
    #[must_use]
    pub fn power_state(&self) -> PowerState {
        match self.status.as_deref().filter(|s| !s.is_empty()) {
            Some("running") => PowerState::Running,
            Some("stopped") => PowerState::Stopped,
            Some(_) => PowerState::Unknown,
            None if self.uptime.unwrap_or(0) > 0 => PowerState::Running,
            None => PowerState::Stopped,
        }
    }
}

/// Body of a `POST .../{template}/clone` request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CloneParams {
    pub newid: u32,
    /// Containers take a `hostname`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    /// VMs take a `name`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Full copy rather than a linked clone.
    pub full: u8,
    pub target: String,
    pub storage: String,
}

impl CloneParams {
    pub fn new(
        kind: InstanceKind,
        newid: InstanceId,
        display_name: &str,
        node: &NodeName,
        storage: &str,
    ) -> Self {
        let (hostname, name) = match kind {
            InstanceKind::Container => (Some(display_name.to_string()), None),
            InstanceKind::VirtualMachine => (None, Some(display_name.to_string())),
        };
        Self {
            newid: newid.get(),
            hostname,
            name,
            full: 1,
            target: node.to_string(),
            storage: storage.to_string(),
        }
    }
}

mod vmid {
    use serde::{Deserialize, Deserializer, de::Error};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(n),
            Raw::Text(s) => s.parse().map_err(D::Error::custom),
        }
    }
}
