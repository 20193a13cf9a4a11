use crate::{
    ControlPlane, InstanceId, InstanceKind, InstanceTarget, NodeName, PowerState,
    tests::{CSRF_TOKEN, TICKET, mount_ticket_endpoint, task_response, ticket_client, token_client},
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path},
};

fn target(id: u32, kind: InstanceKind) -> InstanceTarget {
    InstanceTarget::new(InstanceId::new(id).unwrap(), NodeName::new("px1").unwrap(), kind)
}

async fn mount_status(server: &MockServer, data: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api2/json/nodes/px1/lxc/142/status/current"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": data })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_never_created_instance_is_unknown() {
    let server = MockServer::start().await;
    let client = token_client(&server);
    Mock::given(method("GET"))
        .and(path("/api2/json/nodes/px1/lxc/999/status/current"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_string("Configuration file 'nodes/px1/lxc/999.conf' does not exist"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let state = client
        .read_power_state(&target(999, InstanceKind::Container))
        .await;
    assert_eq!(state, PowerState::Unknown);
}

#[tokio::test]
async fn test_explicit_status_wins() {
    let server = MockServer::start().await;
    let client = token_client(&server);
    mount_status(&server, serde_json::json!({ "status": "stopped", "uptime": 5000 })).await;

    let state = client
        .read_power_state(&target(142, InstanceKind::Container))
        .await;
    assert_eq!(state, PowerState::Stopped);
}

#[tokio::test]
async fn test_uptime_decides_without_status() {
    let server = MockServer::start().await;
    let client = token_client(&server);
    mount_status(&server, serde_json::json!({ "uptime": 42 })).await;

    let state = client
        .read_power_state(&target(142, InstanceKind::Container))
        .await;
    assert_eq!(state, PowerState::Running);
}

#[tokio::test]
async fn test_null_status_payload_is_unknown() {
    let server = MockServer::start().await;
    let client = token_client(&server);
    mount_status(&server, serde_json::Value::Null).await;

    let state = client
        .read_power_state(&target(142, InstanceKind::Container))
        .await;
    assert_eq!(state, PowerState::Unknown);
}

#[tokio::test]
async fn test_unreachable_host_is_unknown() {
    let server = MockServer::start().await;
    let client = token_client(&server);
    drop(server);

    let state = client
        .read_power_state(&target(142, InstanceKind::Container))
        .await;
    assert_eq!(state, PowerState::Unknown);
}

#[tokio::test]
async fn test_virtual_machine_status_path() {
    let server = MockServer::start().await;
    let client = token_client(&server);
    Mock::given(method("GET"))
        .and(path("/api2/json/nodes/px1/qemu/300/status/current"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "status": "running", "qmpstatus": "running", "uptime": 12 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let state = client
        .read_power_state(&target(300, InstanceKind::VirtualMachine))
        .await;
    assert_eq!(state, PowerState::Running);
}

#[tokio::test]
async fn test_start_and_stop_accept_created() {
    let server = MockServer::start().await;
    let client = token_client(&server);
    for action in ["start", "stop"] {
        Mock::given(method("POST"))
            .and(path(format!("/api2/json/nodes/px1/lxc/142/status/{action}")))
            .and(header("authorization", "PVEAPIToken=portal@pve!provisioner=secret"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;
    }

    let target = target(142, InstanceKind::Container);
    assert!(client.start(&target).await.is_ok());
    assert!(client.stop(&target).await.is_ok());
}

#[tokio::test]
async fn test_token_scheme_never_requests_ticket() {
    let server = MockServer::start().await;
    let client = token_client(&server);
    mount_ticket_endpoint(&server, 0).await;
    mount_status(&server, serde_json::json!({ "status": "running" })).await;
    Mock::given(method("POST"))
        .and(path("/api2/json/nodes/px1/lxc/142/status/stop"))
        .respond_with(task_response())
        .mount(&server)
        .await;

    let target = target(142, InstanceKind::Container);
    assert_eq!(client.read_power_state(&target).await, PowerState::Running);
    assert!(client.stop(&target).await.is_ok());
}

#[tokio::test]
async fn test_ticket_scheme_requests_one_ticket_per_operation() {
    let server = MockServer::start().await;
    let client = ticket_client(&server);
    mount_ticket_endpoint(&server, 3).await;
    Mock::given(method("GET"))
        .and(path("/api2/json/nodes/px1/lxc/142/status/current"))
        .and(header("cookie", format!("PVEAuthCookie={TICKET}").as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "data": { "status": "stopped" } })),
        )
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api2/json/nodes/px1/lxc/142/status/start"))
        .and(header("CSRFPreventionToken", CSRF_TOKEN))
        .respond_with(task_response())
        .expect(1)
        .mount(&server)
        .await;

    let target = target(142, InstanceKind::Container);
    assert_eq!(client.read_power_state(&target).await, PowerState::Stopped);
    assert!(client.start(&target).await.is_ok());
    assert_eq!(client.read_power_state(&target).await, PowerState::Stopped);
}
