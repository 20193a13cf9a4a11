use std::fmt;

/// A Proxmox password, kept only for the ticket exchange.
///
/// May be empty: an empty password makes the ticket scheme incomplete, which
/// is reported at authentication time rather than at construction.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxmoxPassword(String);

impl ProxmoxPassword {
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    /// Returns the password as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ProxmoxPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProxmoxPassword(***)")
    }
}
