//! Result values handed back to the portal's request workflow.

use crate::core::domain::{
    error::{ErrorKind, ProxmoxError},
    value_object::InstanceId,
};
use serde::Serialize;
use std::fmt;

/// Stages of one provisioning attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisioningState {
    Requested,
    Allocating,
    Cloning,
    Starting,
    Provisioned,
    Failed,
}

impl fmt::Display for ProvisioningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProvisioningState::Requested => "requested",
            ProvisioningState::Allocating => "allocating",
            ProvisioningState::Cloning => "cloning",
            ProvisioningState::Starting => "starting",
            ProvisioningState::Provisioned => "provisioned",
            ProvisioningState::Failed => "failed",
        })
    }
}

/// Outcome of one provisioning attempt. Never mutated after it is returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisioningOutcome {
    pub success: bool,
    pub message: String,
    /// Set on success, and on a start failure where the clone was left behind.
    pub instance_id: Option<InstanceId>,
    /// Hostname/name given to the instance, once derived.
    pub display_name: Option<String>,
    /// Kind of the first failure, `None` on success.
    pub failure: Option<ErrorKind>,
    /// Stage the attempt ended in: `Provisioned`, or the stage that failed.
    pub state: ProvisioningState,
}

impl ProvisioningOutcome {
    pub fn provisioned(id: InstanceId, display_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            instance_id: Some(id),
            display_name: Some(display_name.into()),
            failure: None,
            state: ProvisioningState::Provisioned,
        }
    }

    /// A failed attempt; `stage` is where it stopped.
    pub fn failed(stage: ProvisioningState, error: &ProxmoxError, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            instance_id: None,
            display_name: None,
            failure: Some(error.kind()),
            state: stage,
        }
    }

    pub(crate) fn with_instance(mut self, id: InstanceId, display_name: &str) -> Self {
        self.instance_id = Some(id);
        self.display_name = Some(display_name.to_string());
        self
    }

    pub(crate) fn with_display_name(mut self, display_name: &str) -> Self {
        self.display_name = Some(display_name.to_string());
        self
    }

    /// True when the remote side may hold an instance the caller has to clean up.
    #[must_use]
    pub fn left_partial_instance(&self) -> bool {
        !self.success && self.instance_id.is_some()
    }
}

/// The `(success, message)` result of a start/stop/teardown call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationOutcome {
    pub success: bool,
    pub message: String,
    pub failure: Option<ErrorKind>,
}

impl OperationOutcome {
    pub fn succeeded(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            failure: None,
        }
    }

    pub fn failed(error: &ProxmoxError) -> Self {
        Self {
            success: false,
            message: error.to_string(),
            failure: Some(error.kind()),
        }
    }
}
