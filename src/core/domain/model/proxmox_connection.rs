use crate::core::domain::{
    error::{ProxmoxResult, ValidationError},
    model::credentials::Credentials,
    value_object::{ProxmoxHost, ProxmoxPort},
};
use url::Url;

/// Where and how to reach the Proxmox API.
#[derive(Debug, Clone)]
pub struct ProxmoxConnection {
    credentials: Credentials,
    accept_invalid_certs: bool,
    base_url: Url,
}

impl ProxmoxConnection {
    pub fn new(
        proxmox_host: ProxmoxHost,
        proxmox_port: ProxmoxPort,
        credentials: Credentials,
        secure: bool,
        accept_invalid_certs: bool,
    ) -> ProxmoxResult<Self> {
        let scheme = if secure { "https" } else { "http" };
        let host = match proxmox_host.as_str() {
            h if h.contains(':') => format!("[{h}]"),
            h => h.to_string(),
        };
        let base_url = Url::parse(&format!(
            "{}://{}:{}/api2/json/",
            scheme,
            host,
            proxmox_port.get()
        ))
        .map_err(|e| ValidationError::Format(format!("Invalid URL format: {}", e)))?;

        Ok(Self {
            credentials,
            accept_invalid_certs,
            base_url,
        })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn accepts_invalid_certs(&self) -> bool {
        self.accept_invalid_certs
    }

    /// Resolves an API path (e.g. `access/ticket`) against `/api2/json/`.
    ///
    /// # Errors
    /// Returns `ProxmoxError::Validation` if the path cannot be joined.
    pub fn endpoint(&self, path: &str) -> ProxmoxResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ValidationError::Format(format!("Invalid API path '{}': {}", path, e)).into())
    }
}
