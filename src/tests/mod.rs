mod resources;

use crate::{ClientConfig, ProxmoxClient};
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

pub(crate) const TICKET: &str = "PVE:portal@pve:4EEC61E2::c2lnbmF0dXJl";
pub(crate) const CSRF_TOKEN: &str = "4EEC61E2:bXktY3NyZg";

/// Routes `tracing` output through the test harness; `RUST_LOG` picks the level.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn test_config() -> ClientConfig {
    ClientConfig {
        status_poll_interval: Duration::from_millis(1),
        ..Default::default()
    }
}

/// A plain-HTTP client pointed at `server` using the API token scheme.
pub(crate) fn token_client(server: &MockServer) -> ProxmoxClient {
    init_tracing();
    let address = server.address();
    ProxmoxClient::builder()
        .host(address.ip().to_string())
        .unwrap()
        .port(address.port())
        .unwrap()
        .api_token("portal@pve", "provisioner", "secret")
        .secure(false)
        .config(test_config())
        .build()
        .unwrap()
}

/// A plain-HTTP client pointed at `server` using the ticket scheme.
pub(crate) fn ticket_client(server: &MockServer) -> ProxmoxClient {
    init_tracing();
    let address = server.address();
    ProxmoxClient::builder()
        .host(address.ip().to_string())
        .unwrap()
        .port(address.port())
        .unwrap()
        .credentials("portal@pve", "hunter2")
        .secure(false)
        .config(test_config())
        .build()
        .unwrap()
}

/// Mounts a ticket endpoint that must be hit exactly `calls` times.
pub(crate) async fn mount_ticket_endpoint(server: &MockServer, calls: u64) {
    Mock::given(method("POST"))
        .and(path("/api2/json/access/ticket"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "ticket": TICKET,
                "CSRFPreventionToken": CSRF_TOKEN,
                "username": "portal@pve"
            }
        })))
        .expect(calls)
        .mount(server)
        .await;
}

/// A Proxmox task id, the `data` of every asynchronous action.
pub(crate) fn task_response() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "data": "UPID:px1:0000A1B2:0001C3D4:6530F1E2:vzcreate:142:portal@pve:"
    }))
}
