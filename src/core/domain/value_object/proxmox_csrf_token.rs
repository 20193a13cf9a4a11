use crate::core::domain::error::ValidationError;

/// The anti-forgery token paired with a ticket, sent as the `CSRFPreventionToken` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxmoxCSRFToken(String);

impl ProxmoxCSRFToken {
    /// Name of the header Proxmox expects on write requests.
    pub const HEADER: &'static str = "CSRFPreventionToken";

    /// Creates a token after checking its `TOKENID:VALUE` shape.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        validate_csrf_token(&value)?;
        Ok(Self(value))
    }

    /// Returns the token value as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validates the format of a CSRF token string.
pub(crate) fn validate_csrf_token(token: &str) -> Result<(), ValidationError> {
    if token.is_empty() {
        return Err(ValidationError::field(
            "csrf_token",
            "CSRF token cannot be empty",
        ));
    }
    let Some((token_id, _)) = token.split_once(':') else {
        return Err(ValidationError::Format(
            "CSRF token must be in format TOKENID:VALUE".to_string(),
        ));
    };
    if token_id.len() != 8 || !token_id.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ValidationError::Format(
            "Token ID must be 8 hexadecimal characters".to_string(),
        ));
    }
    Ok(())
}
