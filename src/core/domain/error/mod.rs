use serde::Serialize;
use thiserror::Error;

/// Longest slice of a remote response body kept in a [`ProxmoxError::RemoteRejection`].
pub const MAX_DIAGNOSTIC_BODY: usize = 200;

/// The main error type for control plane operations.
///
/// Every fault raised while talking to Proxmox VE is converted into one of
/// these variants at the call boundary, so callers can branch on the kind of
/// failure instead of on message text.
#[derive(Error, Debug)]
pub enum ProxmoxError {
    /// Credentials are missing or incomplete, or the ticket exchange was rejected.
    ///
    /// # Fields
    /// * `0` - A description of the authentication failure
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The remote endpoint could not be reached or answered with something unreadable.
    ///
    /// # Fields
    /// * `0` - A description of the transport failure (timeout, connect, TLS, parse)
    #[error("Transport error: {0}")]
    Transport(String),

    /// A reachable endpoint answered with a status the operation does not accept.
    ///
    /// # Fields
    /// * `status` - The HTTP status code returned by Proxmox
    /// * `body` - The response body, truncated to [`MAX_DIAGNOSTIC_BODY`] characters
    #[error("Remote rejected request ({status}): {body}")]
    RemoteRejection { status: u16, body: String },

    /// Input rejected before any network call was made.
    ///
    /// # Fields
    /// * `0` - The underlying validation error
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl ProxmoxError {
    /// Builds a [`ProxmoxError::RemoteRejection`], truncating the body on a char boundary.
    pub fn remote_rejection(status: u16, body: &str) -> Self {
        ProxmoxError::RemoteRejection {
            status,
            body: body.chars().take(MAX_DIAGNOSTIC_BODY).collect(),
        }
    }

    /// Returns the failure category, for callers that branch on kind.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProxmoxError::Authentication(_) => ErrorKind::Authentication,
            ProxmoxError::Transport(_) => ErrorKind::Transport,
            ProxmoxError::RemoteRejection { .. } => ErrorKind::RemoteRejection,
            ProxmoxError::Validation(_) => ErrorKind::Validation,
        }
    }
}

impl From<reqwest::Error> for ProxmoxError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ProxmoxError::Transport(format!("request timed out: {}", error))
        } else if error.is_decode() {
            ProxmoxError::Transport(format!("failed to parse response: {}", error))
        } else {
            ProxmoxError::Transport(format!("HTTP request failed: {}", error))
        }
    }
}

/// Tag describing which class of failure an outcome carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Authentication,
    Transport,
    RemoteRejection,
    Validation,
}

/// Specialized error type for validation failures.
///
/// This enum provides detailed context about why a validation
/// failed, including field-specific errors and format violations.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Represents a validation failure for a specific field
    ///
    /// # Fields
    /// * `field` - The name of the field that failed validation
    /// * `message` - A detailed message about why validation failed
    #[error("Field '{field}' validation failed: {message}")]
    Field { field: String, message: String },

    /// Represents format/syntax validation failures
    ///
    /// # Fields
    /// * `0` - Description of the format violation
    #[error("Format error: {0}")]
    Format(String),

    /// Represents violations of domain constraints
    ///
    /// # Fields
    /// * `0` - Description of the constraint violation
    #[error("Domain constraint violation: {0}")]
    ConstraintViolation(String),
}

impl ValidationError {
    pub(crate) fn field(field: &str, message: impl Into<String>) -> Self {
        ValidationError::Field {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Type alias for Results that may fail with a ProxmoxError
pub type ProxmoxResult<T> = Result<T, ProxmoxError>;
