use crate::core::domain::error::ValidationError;
use serde::Serialize;
use std::fmt;

/// A cluster-wide instance identifier (Proxmox `vmid`).
///
/// The numeric namespace is shared by containers and virtual machines on
/// every node. Ids at or below [`InstanceId::FLOOR`] are reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct InstanceId(u32);

impl InstanceId {
    /// Highest reserved id; every allocated id is strictly greater.
    pub const FLOOR: u32 = 100;

    pub fn new(id: u32) -> Result<Self, ValidationError> {
        if id <= Self::FLOOR {
            return Err(ValidationError::ConstraintViolation(format!(
                "Instance id must be greater than {} (got {})",
                Self::FLOOR,
                id
            )));
        }
        Ok(Self(id))
    }

    /// Builds the id that follows the highest of `existing`, never below `FLOOR + 1`.
    pub(crate) fn next_after<I>(existing: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = u32>,
    {
        let highest = existing.into_iter().fold(Self::FLOOR, u32::max);
        let next = highest.checked_add(1).ok_or_else(|| {
            ValidationError::ConstraintViolation("Instance id space exhausted".to_string())
        })?;
        Self::new(next)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for InstanceId {
    type Error = ValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
