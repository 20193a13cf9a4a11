//! The operations the portal needs from a hypervisor control plane.

use crate::core::domain::{
    error::ProxmoxResult,
    model::{
        catalog::SizeTier,
        instance::{InstanceKind, InstanceTarget, PowerState},
        outcome::ProvisioningOutcome,
    },
    value_object::{InstanceId, NodeName},
};
use async_trait::async_trait;

/// Everything needed to clone a tier's template into a new instance and boot it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneRequest {
    pub id: InstanceId,
    pub display_name: String,
    pub tier: SizeTier,
    pub node: NodeName,
    pub storage: String,
}

impl CloneRequest {
    /// The instance the clone will produce.
    pub fn target(&self) -> InstanceTarget {
        InstanceTarget::new(self.id, self.node.clone(), self.tier.kind)
    }
}

/// Remote control plane operations. Each call authenticates on its own.
///
/// [`crate::ProxmoxClient`] is the production implementation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Returns one more than the highest id listed on `node` for `kind`
    /// (never below 101). Nothing is reserved: concurrent callers can get the
    /// same id.
    async fn allocate_instance_id(
        &self,
        node: &NodeName,
        kind: InstanceKind,
    ) -> ProxmoxResult<InstanceId>;

    /// Clones the tier template into `request.id`, then starts it.
    /// The start is skipped when the clone fails.
    async fn clone_and_start(&self, request: &CloneRequest) -> ProvisioningOutcome;

    /// Best-effort status read; any failure is reported as [`PowerState::Unknown`].
    async fn read_power_state(&self, target: &InstanceTarget) -> PowerState;

    async fn start(&self, target: &InstanceTarget) -> ProxmoxResult<()>;

    async fn stop(&self, target: &InstanceTarget) -> ProxmoxResult<()>;

    /// Deletes the instance whether or not it is still running.
    async fn delete(&self, target: &InstanceTarget) -> ProxmoxResult<()>;
}
