use crate::core::domain::error::ValidationError;
use std::fmt;

/// A Proxmox authentication ticket, sent back as the `PVEAuthCookie` cookie.
///
/// Tickets are fetched for a single operation and dropped with it, so there
/// is no expiry bookkeeping here.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxmoxTicket(String);

impl ProxmoxTicket {
    /// Creates a ticket after checking its shape.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        validate_ticket(&value)?;
        Ok(Self(value))
    }

    /// Returns the ticket value as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Formats the ticket as a cookie header value.
    #[must_use]
    pub fn as_cookie_header(&self) -> String {
        format!("PVEAuthCookie={}", self.0)
    }
}

impl fmt::Debug for ProxmoxTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProxmoxTicket(***)")
    }
}

/// Validates the format of a ticket string.
pub(crate) fn validate_ticket(ticket: &str) -> Result<(), ValidationError> {
    if ticket.is_empty() {
        return Err(ValidationError::field("ticket", "Ticket cannot be empty"));
    }
    let parts: Vec<&str> = ticket.split(':').collect();
    if parts.len() < 5 || parts[0] != "PVE" {
        return Err(ValidationError::Format(
            "Invalid ticket format: must start with 'PVE:' and have at least 5 parts".to_string(),
        ));
    }
    Ok(())
}
