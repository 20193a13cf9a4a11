use crate::core::domain::value_object::{
    ApiToken, ProxmoxCSRFToken, ProxmoxPassword, ProxmoxTicket, ProxmoxUsername,
};
use reqwest::{RequestBuilder, header::AUTHORIZATION, header::COOKIE};
use serde::Deserialize;
use std::fmt;

/// Which credential scheme a client is configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    /// Static API token sent with every request.
    Token,
    /// Username/password exchanged for a ticket before each operation.
    Ticket,
}

/// The configured credentials. Exactly one scheme is active.
#[derive(Debug, Clone)]
pub enum Credentials {
    ApiToken {
        username: ProxmoxUsername,
        token: ApiToken,
    },
    Ticket {
        username: ProxmoxUsername,
        password: ProxmoxPassword,
    },
}

impl Credentials {
    #[must_use]
    pub fn scheme(&self) -> AuthScheme {
        match self {
            Credentials::ApiToken { .. } => AuthScheme::Token,
            Credentials::Ticket { .. } => AuthScheme::Ticket,
        }
    }

    #[must_use]
    pub fn username(&self) -> &ProxmoxUsername {
        match self {
            Credentials::ApiToken { username, .. } | Credentials::Ticket { username, .. } => {
                username
            }
        }
    }
}

/// Credentials ready to be attached to requests for the span of one operation.
#[derive(Clone)]
pub enum SessionCredentials {
    /// Full `Authorization` header value (`PVEAPIToken=...`).
    ApiToken(String),
    Ticket {
        ticket: ProxmoxTicket,
        csrf_token: ProxmoxCSRFToken,
    },
}

impl SessionCredentials {
    #[must_use]
    pub fn scheme(&self) -> AuthScheme {
        match self {
            SessionCredentials::ApiToken(_) => AuthScheme::Token,
            SessionCredentials::Ticket { .. } => AuthScheme::Ticket,
        }
    }

    /// Adds the authentication headers for this session to `request`.
    pub(crate) fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            SessionCredentials::ApiToken(header) => request.header(AUTHORIZATION, header),
            SessionCredentials::Ticket { ticket, csrf_token } => request
                .header(COOKIE, ticket.as_cookie_header())
                .header(ProxmoxCSRFToken::HEADER, csrf_token.as_str()),
        }
    }
}

impl fmt::Debug for SessionCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionCredentials::ApiToken(_) => f.write_str("SessionCredentials::ApiToken(***)"),
            SessionCredentials::Ticket { ticket, .. } => f
                .debug_struct("SessionCredentials::Ticket")
                .field("ticket", ticket)
                .finish_non_exhaustive(),
        }
    }
}
