//! Portal settings loaded from a TOML document.
//!
//! ```toml
//! [proxmox]
//! host = "pve.example.com"
//! port = 8006
//! accept_invalid_certs = true
//!
//! [proxmox.auth]
//! scheme = "token"
//! username = "portal@pve"
//! token_id = "provisioner"
//! token_secret = "..."
//!
//! [placement]
//! node = "px1"
//! storage = "local-lvm"
//! ```
//!
//! `[proxmox.client]` tunes timeouts and rate limiting, and `[tiers.<key>]`
//! tables replace the stock catalog when present.

use crate::{
    ProxmoxClient,
    core::{
        domain::{
            error::{ProxmoxResult, ValidationError},
            model::{
                catalog::{InstanceCatalog, SizeTier},
                credentials::AuthScheme,
                placement::Placement,
            },
            value_object::NodeName,
        },
        infrastructure::client_config::ClientConfig,
    },
    lifecycle::application::service::lifecycle_service::DEFAULT_TEARDOWN_WAIT_SECONDS,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Top-level portal configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PortalSettings {
    pub proxmox: ProxmoxSection,
    pub placement: PlacementSection,
    #[serde(default)]
    pub tiers: BTreeMap<String, SizeTier>,
}

/// Connection to the Proxmox API.
#[derive(Debug, Clone, Deserialize)]
pub struct ProxmoxSection {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// `false` selects plain HTTP.
    #[serde(default = "default_true")]
    pub secure: bool,
    #[serde(default)]
    pub accept_invalid_certs: bool,
    pub auth: AuthSection,
    #[serde(default)]
    pub client: ClientConfig,
}

/// Credentials for the configured scheme.
///
/// The username must be `user@realm`; anything else fails [`PortalSettings::build_client`]
/// with a validation error. A missing password, token id or token secret only
/// surfaces as an authentication failure on first use.
#[derive(Clone, Deserialize)]
pub struct AuthSection {
    pub scheme: AuthScheme,
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub token_id: Option<String>,
    #[serde(default)]
    pub token_secret: Option<String>,
}

impl std::fmt::Debug for AuthSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSection")
            .field("scheme", &self.scheme)
            .field("username", &self.username)
            .field("token_id", &self.token_id)
            .finish_non_exhaustive()
    }
}

/// Where new instances are created.
#[derive(Debug, Clone, Deserialize)]
pub struct PlacementSection {
    pub node: NodeName,
    #[serde(default = "default_storage")]
    pub storage: String,
    /// Polls spent waiting for a stop during teardown.
    #[serde(default = "default_teardown_wait")]
    pub teardown_wait_seconds: u32,
}

fn default_port() -> u16 {
    8006
}
fn default_true() -> bool {
    true
}
fn default_storage() -> String {
    "local-lvm".to_string()
}
fn default_teardown_wait() -> u32 {
    DEFAULT_TEARDOWN_WAIT_SECONDS
}

impl PortalSettings {
    /// Load settings from a TOML file.
    pub async fn from_file(path: impl AsRef<Path>) -> ProxmoxResult<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            ValidationError::Format(format!(
                "Failed to read settings {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&content)
    }

    /// Parse settings from a TOML string.
    pub fn parse(s: &str) -> ProxmoxResult<Self> {
        let settings: Self = toml::from_str(s)
            .map_err(|e| ValidationError::Format(format!("Failed to parse settings TOML: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> ProxmoxResult<()> {
        self.proxmox.client.validate()?;
        for (key, tier) in &self.tiers {
            if tier.template_id == 0 {
                return Err(ValidationError::field(
                    "tiers",
                    format!("Tier '{key}' needs a template_id"),
                )
                .into());
            }
        }
        Ok(())
    }

    /// Builds a client for the configured host and credential scheme.
    pub fn build_client(&self) -> ProxmoxResult<ProxmoxClient> {
        let proxmox = &self.proxmox;
        let auth = &proxmox.auth;
        let builder = ProxmoxClient::builder()
            .host(proxmox.host.clone())?
            .port(proxmox.port)?
            .secure(proxmox.secure)
            .accept_invalid_certs(proxmox.accept_invalid_certs)
            .config(proxmox.client.clone());

        let builder = match auth.scheme {
            AuthScheme::Token => builder.api_token(
                auth.username.clone(),
                auth.token_id.clone().unwrap_or_default(),
                auth.token_secret.clone().unwrap_or_default(),
            ),
            AuthScheme::Ticket => builder.credentials(
                auth.username.clone(),
                auth.password.clone().unwrap_or_default(),
            ),
        };
        builder.build()
    }

    /// Configured tiers, or the stock catalog when none are listed.
    pub fn catalog(&self) -> InstanceCatalog {
        if self.tiers.is_empty() {
            return InstanceCatalog::default();
        }
        InstanceCatalog::new(self.tiers.iter().map(|(key, tier)| SizeTier {
            key: key.clone(),
            ..tier.clone()
        }))
    }

    pub fn placement(&self) -> Placement {
        Placement::new(self.placement.node.clone(), self.placement.storage.clone())
    }

    pub fn teardown_wait_seconds(&self) -> u32 {
        self.placement.teardown_wait_seconds
    }
}
