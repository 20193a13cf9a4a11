use crate::core::domain::error::ValidationError;

/// A Proxmox user id in `user@realm` form (e.g. `root@pam`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxmoxUsername(String);

impl ProxmoxUsername {
    /// Creates a username after validating it.
    pub fn new(username: impl Into<String>) -> Result<Self, ValidationError> {
        let username = username.into();
        validate_username(&username)?;
        Ok(Self(username))
    }

    /// Returns the full `user@realm` id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the realm part (`pam`, `pve`, ...).
    #[must_use]
    pub fn realm(&self) -> &str {
        self.0.rsplit_once('@').map(|(_, realm)| realm).unwrap_or("")
    }
}

/// Validates a `user@realm` id.
pub(crate) fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::field("username", "Username cannot be empty"));
    }
    let Some((user, realm)) = username.rsplit_once('@') else {
        return Err(ValidationError::Format(
            "Username must be in the form user@realm".to_string(),
        ));
    };
    if user.is_empty() || realm.is_empty() {
        return Err(ValidationError::Format(
            "Username must be in the form user@realm".to_string(),
        ));
    }
    if username.len() > 64 {
        return Err(ValidationError::Format(format!(
            "Username cannot exceed 64 characters (got {})",
            username.len()
        )));
    }
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@');
    if !username.chars().all(allowed) {
        return Err(ValidationError::Format(
            "Username contains invalid characters. Allowed: alphanumeric, -, _, ., @".to_string(),
        ));
    }
    Ok(())
}
