use crate::{
    auth::application::{
        request::login_request::LoginRequest, response::login_response::LoginResponse,
    },
    core::domain::{
        error::{ProxmoxError, ProxmoxResult},
        model::{
            credentials::{Credentials, SessionCredentials},
            proxmox_connection::ProxmoxConnection,
        },
        value_object::{ApiToken, ProxmoxCSRFToken, ProxmoxPassword, ProxmoxTicket, ProxmoxUsername},
    },
};

use reqwest::{
    Client, StatusCode,
    header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use std::time::Duration;
use tracing::{debug, warn};

/// Turns the configured [`Credentials`] into [`SessionCredentials`] for one operation.
///
/// The token scheme never touches the network. The ticket scheme performs one
/// exchange per call; tickets are not cached.
pub struct LoginService {
    default_headers: HeaderMap,
}

impl LoginService {
    pub fn new() -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Self { default_headers }
    }

    /// # Errors
    /// Returns `ProxmoxError::Authentication` when the credentials are incomplete,
    /// the ticket endpoint rejects them or cannot be reached, or the ticket is malformed.
    pub async fn execute(
        &self,
        client: &Client,
        connection: &ProxmoxConnection,
        timeout: Duration,
    ) -> ProxmoxResult<SessionCredentials> {
        match connection.credentials() {
            Credentials::ApiToken { username, token } => self.token_session(username, token),
            Credentials::Ticket { username, password } => {
                self.ticket_session(client, connection, username, password, timeout)
                    .await
            }
        }
    }

    fn token_session(
        &self,
        username: &ProxmoxUsername,
        token: &ApiToken,
    ) -> ProxmoxResult<SessionCredentials> {
        if !token.is_complete() {
            return Err(ProxmoxError::Authentication(
                "API token id or secret is missing; control plane access is disabled".to_string(),
            ));
        }
        Ok(SessionCredentials::ApiToken(
            token.authorization_header(username.as_str()),
        ))
    }

    async fn ticket_session(
        &self,
        client: &Client,
        connection: &ProxmoxConnection,
        username: &ProxmoxUsername,
        password: &ProxmoxPassword,
        timeout: Duration,
    ) -> ProxmoxResult<SessionCredentials> {
        if password.is_empty() {
            return Err(ProxmoxError::Authentication(
                "Password is missing; control plane access is disabled".to_string(),
            ));
        }

        let url = connection.endpoint("access/ticket")?;
        let request = LoginRequest {
            username: username.as_str(),
            password: password.as_str(),
        };

        let response = client
            .post(url)
            .headers(self.default_headers.clone())
            .timeout(timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "ticket endpoint unreachable");
                ProxmoxError::Authentication(format!("Ticket endpoint unreachable: {}", e))
            })?;

        match response.status() {
            StatusCode::OK => self.handle_successful_login(response).await,
            StatusCode::UNAUTHORIZED => Err(ProxmoxError::Authentication(
                "Invalid credentials provided".to_string(),
            )),
            status => Err(ProxmoxError::Authentication(format!(
                "Ticket request rejected with status {}",
                status.as_u16()
            ))),
        }
    }

    async fn handle_successful_login(
        &self,
        response: reqwest::Response,
    ) -> ProxmoxResult<SessionCredentials> {
        let login_response = response.json::<LoginResponse>().await.map_err(|e| {
            ProxmoxError::Authentication(format!("Failed to parse login response: {}", e))
        })?;
        let data = login_response.data;

        let ticket = ProxmoxTicket::new(data.ticket)
            .map_err(|e| ProxmoxError::Authentication(format!("Malformed ticket: {}", e)))?;
        let csrf_token = ProxmoxCSRFToken::new(data.csrf_token)
            .map_err(|e| ProxmoxError::Authentication(format!("Malformed CSRF token: {}", e)))?;

        debug!(
            user = data.username.as_deref().unwrap_or_default(),
            "ticket issued"
        );
        Ok(SessionCredentials::Ticket { ticket, csrf_token })
    }
}

impl Default for LoginService {
    fn default() -> Self {
        Self::new()
    }
}
