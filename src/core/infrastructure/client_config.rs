//! Tunables for the HTTP side of the client.

use crate::core::domain::error::{ProxmoxResult, ValidationError};
use serde::Deserialize;
use std::time::Duration;

/// Per-request timeouts, one per class of call.
///
/// Cloning copies a whole root filesystem on the remote side, so it gets by
/// far the longest budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RequestTimeouts {
    #[serde(with = "secs")]
    pub ticket: Duration,
    #[serde(with = "secs")]
    pub listing: Duration,
    #[serde(with = "secs")]
    pub status: Duration,
    #[serde(with = "secs")]
    pub power: Duration,
    #[serde(with = "secs")]
    pub delete: Duration,
    #[serde(with = "secs")]
    pub clone: Duration,
}

impl Default for RequestTimeouts {
    fn default() -> Self {
        Self {
            ticket: Duration::from_secs(10),
            listing: Duration::from_secs(10),
            status: Duration::from_secs(8),
            power: Duration::from_secs(30),
            delete: Duration::from_secs(60),
            clone: Duration::from_secs(120),
        }
    }
}

/// Client-side throttle for outbound requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RateLimitConfig {
    pub requests_per_second: u32,
    pub burst_size: u32,
}

/// Configuration of a [`crate::ProxmoxClient`] beyond host and credentials.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub timeouts: RequestTimeouts,
    /// Disabled when `None`.
    pub rate_limit: Option<RateLimitConfig>,
    /// Delay between power-state polls while waiting for a stop.
    #[serde(with = "millis", rename = "status_poll_interval_ms")]
    pub status_poll_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeouts: RequestTimeouts::default(),
            rate_limit: None,
            status_poll_interval: Duration::from_secs(1),
        }
    }
}

impl ClientConfig {
    /// # Errors
    /// Returns `ProxmoxError::Validation` for a zero rate or burst.
    pub fn validate(&self) -> ProxmoxResult<()> {
        if let Some(limit) = self.rate_limit {
            if limit.requests_per_second == 0 || limit.burst_size == 0 {
                return Err(ValidationError::field(
                    "rate_limit",
                    "requests_per_second and burst_size must be greater than 0",
                )
                .into());
            }
        }
        Ok(())
    }
}

mod secs {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

mod millis {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
