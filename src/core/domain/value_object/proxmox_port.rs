use crate::core::domain::error::ValidationError;

/// A validated Proxmox API port number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProxmoxPort(u16);

impl ProxmoxPort {
    /// Port the Proxmox VE API listens on out of the box.
    pub const DEFAULT: u16 = 8006;

    /// Creates a port after validating it.
    pub fn new(port: u16) -> Result<Self, ValidationError> {
        validate_port(port)?;
        Ok(Self(port))
    }

    /// Returns the port number.
    pub fn get(&self) -> u16 {
        self.0
    }
}

impl Default for ProxmoxPort {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

/// Validates a port number.
pub(crate) fn validate_port(port: u16) -> Result<(), ValidationError> {
    if port == 0 {
        return Err(ValidationError::field("port", "Port cannot be 0"));
    }
    Ok(())
}
