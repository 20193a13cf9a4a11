mod auth;
mod core;
mod lifecycle;
mod provisioning;

#[cfg(test)]
mod tests;

pub use crate::core::domain::{
    control_plane::{CloneRequest, ControlPlane},
    error::{ErrorKind, ProxmoxError, ProxmoxResult, ValidationError},
    model::{
        catalog::{InstanceCatalog, SizeTier},
        credentials::{AuthScheme, Credentials, SessionCredentials},
        instance::{InstanceKind, InstanceTarget, PowerState},
        outcome::{OperationOutcome, ProvisioningOutcome, ProvisioningState},
        placement::Placement,
    },
    value_object::{InstanceId, NodeName},
};
pub use crate::core::infrastructure::{
    client_config::{ClientConfig, RateLimitConfig, RequestTimeouts},
    settings::{AuthSection, PlacementSection, PortalSettings, ProxmoxSection},
};
pub use crate::lifecycle::application::service::lifecycle_service::{
    DEFAULT_TEARDOWN_WAIT_SECONDS, LifecycleService, ensure_stopped_then_delete,
};
pub use crate::provisioning::application::service::provisioning_service::{
    ProvisioningService, derive_display_name,
};

use crate::core::{
    domain::{
        model::{
            instance::{CloneParams, InstanceListItem, InstanceStatusCurrent},
            proxmox_connection::ProxmoxConnection,
        },
        value_object::{ApiToken, ProxmoxHost, ProxmoxPassword, ProxmoxPort, ProxmoxUsername},
    },
    infrastructure::api_client::{ACCEPT_OK, ACCEPT_POWER, ApiClient},
};
use async_trait::async_trait;
use tracing::{info, instrument, warn};

/// A client for the parts of the Proxmox VE API the portal drives.
///
/// The client keeps no session: every operation authenticates on its own,
/// either by attaching the configured API token or by exchanging the
/// username/password for a fresh ticket.
///
/// # Examples
///
/// ```no_run
/// use leeca_portal::{ControlPlane, InstanceKind, NodeName, ProxmoxClient, ProxmoxResult};
///
/// #[tokio::main]
/// async fn main() -> ProxmoxResult<()> {
///     let client = ProxmoxClient::builder()
///         .host("proxmox.example.com")?
///         .port(8006)?
///         .api_token("portal@pve", "provisioner", "secret")
///         .secure(true)
///         .build()?;
///
///     let node = NodeName::new("px1")?;
///     let id = client
///         .allocate_instance_id(&node, InstanceKind::Container)
///         .await?;
///     println!("next id: {id}");
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ProxmoxClient {
    api_client: ApiClient,
}

/// Builder for ProxmoxClient configuration
#[derive(Debug)]
pub struct ProxmoxClientBuilder {
    host: Option<ProxmoxHost>,
    port: ProxmoxPort,
    username: Option<String>,
    password: Option<String>,
    token: Option<ApiToken>,
    secure: bool,
    accept_invalid_certs: bool,
    config: ClientConfig,
}

impl Default for ProxmoxClientBuilder {
    fn default() -> Self {
        Self {
            host: None,
            port: ProxmoxPort::default(),
            username: None,
            password: None,
            token: None,
            secure: true,
            accept_invalid_certs: false,
            config: ClientConfig::default(),
        }
    }
}

impl ProxmoxClientBuilder {
    pub fn host(mut self, host: impl Into<String>) -> ProxmoxResult<Self> {
        self.host = Some(ProxmoxHost::new(host)?);
        Ok(self)
    }

    pub fn port(mut self, port: u16) -> ProxmoxResult<Self> {
        self.port = ProxmoxPort::new(port)?;
        Ok(self)
    }

    /// Ticket scheme: `username` is `user@realm`.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self.token = None;
        self
    }

    /// Token scheme: sends `PVEAPIToken=<username>!<token_id>=<secret>` with every request.
    pub fn api_token(
        mut self,
        username: impl Into<String>,
        token_id: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.token = Some(ApiToken::new(token_id, secret));
        self.password = None;
        self
    }

    /// `false` talks plain HTTP.
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Accept self-signed certificates.
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// # Errors
    /// Returns `ProxmoxError::Validation` if the host or username is missing
    /// or malformed, or the config is invalid.
    pub fn build(self) -> ProxmoxResult<ProxmoxClient> {
        let host = self
            .host
            .ok_or_else(|| ValidationError::field("host", "Host is required"))?;
        let username = ProxmoxUsername::new(
            self.username
                .ok_or_else(|| ValidationError::field("username", "Username is required"))?,
        )?;

        // Incomplete credentials are reported by `authenticate`, not here.
        let credentials = match self.token {
            Some(token) => Credentials::ApiToken { username, token },
            None => Credentials::Ticket {
                username,
                password: ProxmoxPassword::new(self.password.unwrap_or_default()),
            },
        };

        let connection = ProxmoxConnection::new(
            host,
            self.port,
            credentials,
            self.secure,
            self.accept_invalid_certs,
        )?;

        Ok(ProxmoxClient {
            api_client: ApiClient::new(connection, self.config)?,
        })
    }
}

impl ProxmoxClient {
    /// Creates a new builder for ProxmoxClient configuration
    pub fn builder() -> ProxmoxClientBuilder {
        ProxmoxClientBuilder::default()
    }

    pub fn config(&self) -> &ClientConfig {
        self.api_client.config()
    }

    pub fn auth_scheme(&self) -> AuthScheme {
        self.api_client.connection().credentials().scheme()
    }

    /// Obtains session credentials for one operation.
    ///
    /// With an API token this only checks that both parts are present. With
    /// a password it performs one ticket exchange.
    ///
    /// # Errors
    /// Returns `ProxmoxError::Authentication` if credentials are incomplete,
    /// rejected, or the ticket endpoint cannot be reached.
    pub async fn authenticate(&self) -> ProxmoxResult<SessionCredentials> {
        self.api_client.authenticate().await
    }

    /// Stop-if-running, bounded wait, then delete, polling at the configured interval.
    pub async fn stop_and_delete(
        &self,
        target: &InstanceTarget,
        wait_seconds: u32,
    ) -> OperationOutcome {
        let poll_interval = self.config().status_poll_interval;
        match ensure_stopped_then_delete(self, target, wait_seconds, poll_interval).await {
            Ok(()) => OperationOutcome::succeeded(format!(
                "{} {} deleted",
                target.kind.label(),
                target.id
            )),
            Err(e) => OperationOutcome::failed(&e),
        }
    }

    /// `None` when the endpoint answers without a `data` payload.
    async fn current_status(
        &self,
        target: &InstanceTarget,
    ) -> ProxmoxResult<Option<InstanceStatusCurrent>> {
        let session = self.authenticate().await?;
        self.api_client
            .get(
                &session,
                &target.status_path("current"),
                self.config().timeouts.status,
            )
            .await
    }

    async fn post_power(&self, target: &InstanceTarget, action: &str) -> ProxmoxResult<()> {
        let session = self.authenticate().await?;
        self.api_client
            .post::<()>(
                &session,
                &target.status_path(action),
                None,
                self.config().timeouts.power,
                ACCEPT_POWER,
            )
            .await
    }
}

#[async_trait]
impl ControlPlane for ProxmoxClient {
    #[instrument(skip_all, fields(node = %node, kind = %kind))]
    async fn allocate_instance_id(
        &self,
        node: &NodeName,
        kind: InstanceKind,
    ) -> ProxmoxResult<InstanceId> {
        let session = self.authenticate().await?;
        let path = format!("nodes/{}/{}", node, kind.api_segment());

        let listed = match self
            .api_client
            .get::<Vec<InstanceListItem>>(&session, &path, self.config().timeouts.listing)
            .await
        {
            Ok(items) => items,
            Err(ProxmoxError::RemoteRejection { status, .. }) => {
                warn!(status, "instance listing rejected, allocating from the floor");
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        let id = InstanceId::next_after(listed.iter().map(|item| item.vmid))?;
        info!(%id, existing = listed.len(), "allocated instance id");
        Ok(id)
    }

    #[instrument(skip_all, fields(instance = %request.target(), template = request.tier.template_id))]
    async fn clone_and_start(&self, request: &CloneRequest) -> ProvisioningOutcome {
        let kind = request.tier.kind;

        let session = match self.authenticate().await {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "authentication failed before clone");
                return ProvisioningOutcome::failed(
                    ProvisioningState::Cloning,
                    &e,
                    format!("Clone failed: {e}"),
                )
                .with_display_name(&request.display_name);
            }
        };

        let clone_path = format!(
            "nodes/{}/{}/{}/clone",
            request.node,
            kind.api_segment(),
            request.tier.template_id
        );
        let params = CloneParams::new(
            kind,
            request.id,
            &request.display_name,
            &request.node,
            &request.storage,
        );
        if let Err(e) = self
            .api_client
            .post(
                &session,
                &clone_path,
                Some(&params),
                self.config().timeouts.clone,
                ACCEPT_OK,
            )
            .await
        {
            warn!(error = %e, "clone failed");
            return ProvisioningOutcome::failed(
                ProvisioningState::Cloning,
                &e,
                format!("Clone failed: {e}"),
            )
            .with_display_name(&request.display_name);
        }
        info!("clone accepted");

        let target = request.target();
        if let Err(e) = self
            .api_client
            .post::<()>(
                &session,
                &target.status_path("start"),
                None,
                self.config().timeouts.power,
                ACCEPT_POWER,
            )
            .await
        {
            warn!(error = %e, "start failed, clone left in place");
            return ProvisioningOutcome::failed(
                ProvisioningState::Starting,
                &e,
                format!("Start failed: {e}"),
            )
            .with_instance(request.id, &request.display_name);
        }
        info!("instance started");

        ProvisioningOutcome::provisioned(
            request.id,
            request.display_name.clone(),
            format!(
                "{} {} '{}' created and started",
                kind.label(),
                request.id,
                request.display_name
            ),
        )
    }

    #[instrument(skip_all, fields(instance = %target))]
    async fn read_power_state(&self, target: &InstanceTarget) -> PowerState {
        match self.current_status(target).await {
            Ok(Some(status)) => status.power_state(),
            Ok(None) => {
                warn!("status endpoint returned no data");
                PowerState::Unknown
            }
            Err(e) => {
                warn!(error = %e, "power state unavailable");
                PowerState::Unknown
            }
        }
    }

    #[instrument(skip_all, fields(instance = %target))]
    async fn start(&self, target: &InstanceTarget) -> ProxmoxResult<()> {
        self.post_power(target, "start").await
    }

    #[instrument(skip_all, fields(instance = %target))]
    async fn stop(&self, target: &InstanceTarget) -> ProxmoxResult<()> {
        self.post_power(target, "stop").await
    }

    #[instrument(skip_all, fields(instance = %target))]
    async fn delete(&self, target: &InstanceTarget) -> ProxmoxResult<()> {
        let session = self.authenticate().await?;
        self.api_client
            .delete(&session, &target.path(), self.config().timeouts.delete)
            .await
    }
}
