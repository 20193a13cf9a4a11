use std::fmt;

/// A Proxmox API token: the token id (the part after `!` in `user@realm!id`)
/// and its secret.
///
/// Both parts may be empty at construction; [`ApiToken::is_complete`] is
/// checked when a request is about to be authenticated.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken {
    token_id: String,
    secret: String,
}

impl ApiToken {
    pub fn new(token_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            token_id: token_id.into(),
            secret: secret.into(),
        }
    }

    #[must_use]
    pub fn token_id(&self) -> &str {
        &self.token_id
    }

    /// Returns `true` when both the id and the secret are present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.token_id.trim().is_empty() && !self.secret.trim().is_empty()
    }

    /// Formats the `Authorization` header value for `username`.
    #[must_use]
    pub fn authorization_header(&self, username: &str) -> String {
        format!("PVEAPIToken={}!{}={}", username, self.token_id, self.secret)
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiToken")
            .field("token_id", &self.token_id)
            .field("secret", &"***")
            .finish()
    }
}
