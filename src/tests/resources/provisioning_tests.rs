use crate::{
    ErrorKind, InstanceCatalog, InstanceId, NodeName, Placement, ProvisioningService,
    ProvisioningState, ProxmoxClient,
    tests::{task_response, token_client},
};
use std::sync::Arc;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, method, path},
};

fn service(client: ProxmoxClient) -> ProvisioningService<ProxmoxClient> {
    ProvisioningService::new(
        Arc::new(client),
        InstanceCatalog::default(),
        Placement::new(NodeName::new("px1").unwrap(), "local-lvm"),
    )
}

async fn mount_listing(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api2/json/nodes/px1/lxc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [
                { "vmid": 1800, "name": "ct-bronze-template", "status": "stopped", "template": 1 },
                { "vmid": 1801, "name": "ct-silver-template", "status": "stopped", "template": 1 },
                { "vmid": 1802, "name": "ct-gold-template", "status": "stopped", "template": 1 },
                { "vmid": 141, "name": "ct-bob-3", "status": "running" }
            ]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_provision_silver_for_alice() {
    let server = MockServer::start().await;
    let client = token_client(&server);

    Mock::given(method("GET"))
        .and(path("/api2/json/nodes/px1/lxc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [
                { "vmid": 141, "name": "ct-bob-3", "status": "running" },
                { "vmid": 120, "name": "ct-eve-1", "status": "stopped" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api2/json/nodes/px1/lxc/1801/clone"))
        .and(body_partial_json(serde_json::json!({
            "newid": 142,
            "hostname": "ct-alice-7",
            "full": 1,
            "target": "px1",
            "storage": "local-lvm"
        })))
        .respond_with(task_response())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api2/json/nodes/px1/lxc/142/status/start"))
        .respond_with(task_response())
        .expect(1)
        .mount(&server)
        .await;

    let outcome = service(client).provision("silver", "alice", 7).await;

    assert!(outcome.success, "{}", outcome.message);
    assert_eq!(outcome.state, ProvisioningState::Provisioned);
    assert_eq!(outcome.instance_id, Some(InstanceId::new(142).unwrap()));
    assert_eq!(outcome.display_name.as_deref(), Some("ct-alice-7"));
    assert!(outcome.message.contains("142"));
    assert!(outcome.message.contains("ct-alice-7"));
}

#[tokio::test]
async fn test_clone_failure_skips_start() {
    let server = MockServer::start().await;
    let client = token_client(&server);
    mount_listing(&server).await;

    Mock::given(method("POST"))
        .and(path("/api2/json/nodes/px1/lxc/1800/clone"))
        .respond_with(
            ResponseTemplate::new(500).set_body_string("unable to create CT 1803 - already exists"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api2/json/nodes/px1/lxc/1803/status/start"))
        .respond_with(task_response())
        .expect(0)
        .mount(&server)
        .await;

    let outcome = service(client).provision("bronze", "alice", 1).await;

    assert!(!outcome.success);
    assert_eq!(outcome.state, ProvisioningState::Cloning);
    assert_eq!(outcome.failure, Some(ErrorKind::RemoteRejection));
    assert!(outcome.message.starts_with("Clone failed"));
    assert!(outcome.message.contains("500"));
    assert!(!outcome.left_partial_instance());
}

#[tokio::test]
async fn test_start_failure_reports_leftover_clone() {
    let server = MockServer::start().await;
    let client = token_client(&server);
    mount_listing(&server).await;

    Mock::given(method("POST"))
        .and(path("/api2/json/nodes/px1/lxc/1802/clone"))
        .respond_with(task_response())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api2/json/nodes/px1/lxc/1803/status/start"))
        .respond_with(ResponseTemplate::new(500).set_body_string("CT is locked (clone)"))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = service(client).provision("gold", "carol", 2).await;

    assert!(!outcome.success);
    assert_eq!(outcome.state, ProvisioningState::Starting);
    assert_eq!(outcome.instance_id, Some(InstanceId::new(1803).unwrap()));
    assert!(outcome.left_partial_instance());
    assert!(outcome.message.contains("locked"));
}

#[tokio::test]
async fn test_unknown_tier_makes_no_requests() {
    let server = MockServer::start().await;
    let client = token_client(&server);
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = service(client).provision("platinum", "alice", 1).await;

    assert!(!outcome.success);
    assert_eq!(outcome.failure, Some(ErrorKind::Validation));
}
