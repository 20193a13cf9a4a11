//! The fixed set of size tiers users can request.

use crate::core::domain::model::instance::InstanceKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named resource/template profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SizeTier {
    /// Lookup key (`bronze`, `silver`, ...). Filled from the table key when loaded from config.
    #[serde(default)]
    pub key: String,
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    pub cores: u32,
    /// Memory in MiB.
    #[serde(rename = "memory")]
    pub memory_mb: u32,
    /// Root disk in GiB.
    #[serde(rename = "disk")]
    pub disk_gb: u32,
    /// Name of the template the tier is cloned from.
    #[serde(rename = "template")]
    pub template_name: String,
    /// `vmid` of the template.
    pub template_id: u32,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: InstanceKind,
}

fn default_kind() -> InstanceKind {
    InstanceKind::Container
}

/// Read-only `tier -> SizeTier` lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceCatalog {
    tiers: BTreeMap<String, SizeTier>,
}

impl InstanceCatalog {
    /// Builds a catalog keyed by each tier's `key`.
    pub fn new(tiers: impl IntoIterator<Item = SizeTier>) -> Self {
        Self {
            tiers: tiers.into_iter().map(|t| (t.key.clone(), t)).collect(),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&SizeTier> {
        self.tiers.get(key)
    }

    pub fn tiers(&self) -> impl Iterator<Item = &SizeTier> {
        self.tiers.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}

impl Default for InstanceCatalog {
    /// The stock bronze/silver/gold container tiers.
    fn default() -> Self {
        let tier = |key: &str, name: &str, description: &str, cores, memory_mb, disk_gb, template_id| {
            SizeTier {
                key: key.to_string(),
                display_name: name.to_string(),
                description: description.to_string(),
                cores,
                memory_mb,
                disk_gb,
                template_name: format!("ct-{key}-template"),
                template_id,
                kind: InstanceKind::Container,
            }
        };
        Self::new([
            tier("bronze", "Bronze", "Basic machine for simple workloads", 1, 512, 2, 1800),
            tier("silver", "Silver", "Mid-sized machine for standard workloads", 2, 1024, 4, 1801),
            tier("gold", "Gold", "Powerful machine for advanced workloads", 2, 2048, 8, 1802),
        ])
    }
}
