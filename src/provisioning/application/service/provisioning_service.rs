use crate::core::domain::{
    control_plane::{CloneRequest, ControlPlane},
    error::{ProxmoxError, ProxmoxResult, ValidationError},
    model::{
        catalog::InstanceCatalog,
        outcome::{ProvisioningOutcome, ProvisioningState},
        placement::Placement,
    },
};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Prefix of every generated instance name.
pub const DISPLAY_NAME_PREFIX: &str = "ct";

/// Longest hostname label Proxmox accepts for a container.
const MAX_DISPLAY_NAME_LEN: usize = 63;

/// Builds the `ct-<owner>-<ordinal>` name of a new instance.
///
/// The owner is lower-cased and every character outside `[a-z0-9-]` becomes
/// `-`, so the result is always a valid hostname label.
///
/// # Errors
/// Returns `ProxmoxError::Validation` if nothing usable is left of `owner`.
pub fn derive_display_name(owner: &str, ordinal: u64) -> ProxmoxResult<String> {
    let sanitized: String = owner
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();

    let suffix = ordinal.to_string();
    let budget = MAX_DISPLAY_NAME_LEN - DISPLAY_NAME_PREFIX.len() - suffix.len() - 2;
    let owner_part: String = sanitized.trim_matches('-').chars().take(budget).collect();
    let owner_part = owner_part.trim_end_matches('-');

    if owner_part.is_empty() {
        return Err(ValidationError::field(
            "owner",
            format!("'{owner}' does not contain any hostname-safe characters"),
        )
        .into());
    }

    Ok(format!("{DISPLAY_NAME_PREFIX}-{owner_part}-{suffix}"))
}

/// Turns an approved request into a running instance: allocate, clone, start.
///
/// Each step runs only after the previous one succeeded. Nothing is retried
/// and nothing is rolled back; a failed start leaves the clone in place and
/// reports its id.
pub struct ProvisioningService<C: ControlPlane + ?Sized> {
    plane: Arc<C>,
    catalog: InstanceCatalog,
    placement: Placement,
}

impl<C: ControlPlane + ?Sized> ProvisioningService<C> {
    pub fn new(plane: Arc<C>, catalog: InstanceCatalog, placement: Placement) -> Self {
        Self {
            plane,
            catalog,
            placement,
        }
    }

    pub fn catalog(&self) -> &InstanceCatalog {
        &self.catalog
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    #[instrument(skip(self), fields(node = %self.placement.node))]
    pub async fn provision(&self, tier: &str, owner: &str, ordinal: u64) -> ProvisioningOutcome {
        let Some(size) = self.catalog.get(tier) else {
            let err: ProxmoxError =
                ValidationError::field("tier", format!("Unknown size tier '{tier}'")).into();
            error!(error = %err, "provisioning rejected");
            return ProvisioningOutcome::failed(ProvisioningState::Requested, &err, err.to_string());
        };

        let display_name = match derive_display_name(owner, ordinal) {
            Ok(name) => name,
            Err(err) => {
                error!(error = %err, "provisioning rejected");
                return ProvisioningOutcome::failed(
                    ProvisioningState::Requested,
                    &err,
                    err.to_string(),
                );
            }
        };

        info!(state = %ProvisioningState::Allocating, %display_name, "allocating instance id");
        let id = match self
            .plane
            .allocate_instance_id(&self.placement.node, size.kind)
            .await
        {
            Ok(id) => id,
            Err(err) => {
                error!(error = %err, "instance id allocation failed");
                return ProvisioningOutcome::failed(
                    ProvisioningState::Allocating,
                    &err,
                    format!("Allocation failed: {err}"),
                )
                .with_display_name(&display_name);
            }
        };

        let request = CloneRequest {
            id,
            display_name,
            tier: size.clone(),
            node: self.placement.node.clone(),
            storage: self.placement.storage.clone(),
        };
        info!(
            state = %ProvisioningState::Cloning,
            instance = %request.target(),
            template = size.template_id,
            "cloning template"
        );

        let outcome = self.plane.clone_and_start(&request).await;
        if outcome.success {
            info!(state = %outcome.state, instance = %request.target(), "instance provisioned");
        } else {
            error!(state = %outcome.state, reason = %outcome.message, "provisioning failed");
        }
        outcome
    }
}
