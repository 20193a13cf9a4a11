use crate::core::domain::value_object::NodeName;
use serde::Deserialize;

/// Where new instances land. The node is fixed; there is no scheduling.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Placement {
    pub node: NodeName,
    /// Storage pool the clone's disks are written to.
    #[serde(default = "default_storage")]
    pub storage: String,
}

fn default_storage() -> String {
    "local-lvm".to_string()
}

impl Placement {
    pub fn new(node: NodeName, storage: impl Into<String>) -> Self {
        Self {
            node,
            storage: storage.into(),
        }
    }
}
