//! Internal HTTP client that authenticates each operation and talks to the Proxmox API.

use crate::{
    auth::application::service::login_service::LoginService,
    core::{
        domain::{
            error::{ProxmoxError, ProxmoxResult, ValidationError},
            model::{credentials::SessionCredentials, proxmox_connection::ProxmoxConnection},
        },
        infrastructure::client_config::ClientConfig,
    },
};
use governor::{DefaultDirectRateLimiter, Quota};
use reqwest::{Client, Method, Response, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Status codes accepted by a plain read or write.
pub(crate) const ACCEPT_OK: &[StatusCode] = &[StatusCode::OK];
/// Power actions answer 200, some proxies answer 201.
pub(crate) const ACCEPT_POWER: &[StatusCode] = &[StatusCode::OK, StatusCode::CREATED];
/// Deletion answers 200 with a task id, or 204.
pub(crate) const ACCEPT_DELETE: &[StatusCode] = &[StatusCode::OK, StatusCode::NO_CONTENT];

/// The `{"data": ...}` envelope around every Proxmox response.
#[derive(Deserialize)]
struct ApiResponse<T> {
    data: Option<T>,
}

/// Internal HTTP client that attaches session credentials and maps every
/// failure to a [`ProxmoxError`].
///
/// It holds no session state: callers obtain [`SessionCredentials`] through
/// [`ApiClient::authenticate`] and pass them to each request.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http_client: Client,
    connection: Arc<ProxmoxConnection>,
    config: Arc<ClientConfig>,
    rate_limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl ApiClient {
    /// # Errors
    /// Returns `ProxmoxError::Validation` for an invalid config and
    /// `ProxmoxError::Transport` if the HTTP client cannot be built.
    pub fn new(connection: ProxmoxConnection, config: ClientConfig) -> ProxmoxResult<Self> {
        config.validate()?;

        let http_client = Client::builder()
            .tls_danger_accept_invalid_certs(connection.accepts_invalid_certs())
            .build()
            .map_err(|e| ProxmoxError::Transport(e.to_string()))?;

        let rate_limiter = config
            .rate_limit
            .map(|rl| -> ProxmoxResult<_> {
                let rate = NonZeroU32::new(rl.requests_per_second).ok_or_else(|| {
                    ValidationError::field("rate_limit", "requests_per_second must be > 0")
                })?;
                let burst = NonZeroU32::new(rl.burst_size)
                    .ok_or_else(|| ValidationError::field("rate_limit", "burst_size must be > 0"))?;
                let quota = Quota::per_second(rate).allow_burst(burst);
                Ok(Arc::new(DefaultDirectRateLimiter::direct(quota)))
            })
            .transpose()?;

        Ok(Self {
            http_client,
            connection: Arc::new(connection),
            config: Arc::new(config),
            rate_limiter,
        })
    }

    pub fn connection(&self) -> &ProxmoxConnection {
        &self.connection
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Obtains fresh credentials for one operation.
    ///
    /// # Errors
    /// Returns `ProxmoxError::Authentication` if no session can be established.
    pub async fn authenticate(&self) -> ProxmoxResult<SessionCredentials> {
        self.throttle().await;
        LoginService::new()
            .execute(
                &self.http_client,
                &self.connection,
                self.config.timeouts.ticket,
            )
            .await
    }

    /// Performs an authenticated GET and unwraps the `data` field.
    ///
    /// A `null` or missing `data` yields `T::default()`.
    pub async fn get<T>(
        &self,
        session: &SessionCredentials,
        path: &str,
        timeout: Duration,
    ) -> ProxmoxResult<T>
    where
        T: DeserializeOwned + Default,
    {
        let response = self
            .send(Method::GET, session, path, None::<&()>, timeout)
            .await?;
        let response = Self::accept(response, ACCEPT_OK).await?;
        let envelope = response.json::<ApiResponse<T>>().await?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// Performs an authenticated POST with an optional JSON body.
    pub async fn post<B>(
        &self,
        session: &SessionCredentials,
        path: &str,
        body: Option<&B>,
        timeout: Duration,
        accepted: &[StatusCode],
    ) -> ProxmoxResult<()>
    where
        B: Serialize + ?Sized,
    {
        let response = self
            .send(Method::POST, session, path, body, timeout)
            .await?;
        Self::accept(response, accepted).await.map(drop)
    }

    /// Performs an authenticated DELETE.
    pub async fn delete(
        &self,
        session: &SessionCredentials,
        path: &str,
        timeout: Duration,
    ) -> ProxmoxResult<()> {
        let response = self
            .send(Method::DELETE, session, path, None::<&()>, timeout)
            .await?;
        Self::accept(response, ACCEPT_DELETE).await.map(drop)
    }

    async fn send<B>(
        &self,
        method: Method,
        session: &SessionCredentials,
        path: &str,
        body: Option<&B>,
        timeout: Duration,
    ) -> ProxmoxResult<Response>
    where
        B: Serialize + ?Sized,
    {
        self.throttle().await;

        let url = self.connection.endpoint(path)?;
        debug!(%method, %url, "proxmox request");

        let mut req_builder = session.apply(self.http_client.request(method, url).timeout(timeout));
        if let Some(body) = body {
            req_builder = req_builder.json(body);
        }

        Ok(req_builder.send().await?)
    }

    /// Turns a response with an unaccepted status into `RemoteRejection`.
    async fn accept(response: Response, accepted: &[StatusCode]) -> ProxmoxResult<Response> {
        let status = response.status();
        if accepted.contains(&status) {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ProxmoxError::remote_rejection(status.as_u16(), &body))
    }

    async fn throttle(&self) {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }
    }
}
