use crate::{
    ControlPlane, ErrorKind, InstanceKind, NodeName,
    tests::{mount_ticket_endpoint, ticket_client, token_client},
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

fn node() -> NodeName {
    NodeName::new("px1").unwrap()
}

async fn mount_listing(server: &MockServer, segment: &str, data: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api2/json/nodes/px1/{segment}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": data })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_empty_listing_allocates_101() {
    let server = MockServer::start().await;
    let client = token_client(&server);
    mount_listing(&server, "lxc", serde_json::json!([])).await;

    let id = client
        .allocate_instance_id(&node(), InstanceKind::Container)
        .await
        .unwrap();
    assert_eq!(id.get(), 101);
}

#[tokio::test]
async fn test_allocates_one_past_highest() {
    let server = MockServer::start().await;
    let client = token_client(&server);
    mount_listing(
        &server,
        "lxc",
        serde_json::json!([
            { "vmid": 101, "name": "ct-bob-1", "status": "running" },
            { "vmid": 205, "name": "ct-eve-4", "status": "stopped" },
            { "vmid": "150", "name": "ct-dan-2", "status": "running" }
        ]),
    )
    .await;

    let id = client
        .allocate_instance_id(&node(), InstanceKind::Container)
        .await
        .unwrap();
    assert_eq!(id.get(), 206);
}

#[tokio::test]
async fn test_virtual_machines_are_listed_under_qemu() {
    let server = MockServer::start().await;
    let client = token_client(&server);
    mount_listing(&server, "qemu", serde_json::json!([{ "vmid": 9000 }])).await;

    let id = client
        .allocate_instance_id(&node(), InstanceKind::VirtualMachine)
        .await
        .unwrap();
    assert_eq!(id.get(), 9001);
}

#[tokio::test]
async fn test_rejected_listing_falls_back_to_floor() {
    let server = MockServer::start().await;
    let client = token_client(&server);
    Mock::given(method("GET"))
        .and(path("/api2/json/nodes/px1/lxc"))
        .respond_with(ResponseTemplate::new(500).set_body_string("node 'px1' offline"))
        .mount(&server)
        .await;

    let id = client
        .allocate_instance_id(&node(), InstanceKind::Container)
        .await
        .unwrap();
    assert_eq!(id.get(), 101);
}

#[tokio::test]
async fn test_failed_login_aborts_allocation() {
    let server = MockServer::start().await;
    let client = ticket_client(&server);
    Mock::given(method("POST"))
        .and(path("/api2/json/access/ticket"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api2/json/nodes/px1/lxc"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client
        .allocate_instance_id(&node(), InstanceKind::Container)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authentication);
}

#[tokio::test]
async fn test_ticket_scheme_logs_in_once_per_allocation() {
    let server = MockServer::start().await;
    let client = ticket_client(&server);
    mount_ticket_endpoint(&server, 2).await;
    Mock::given(method("GET"))
        .and(path("/api2/json/nodes/px1/lxc"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": [{ "vmid": 120 }] })),
        )
        .expect(2)
        .mount(&server)
        .await;

    for _ in 0..2 {
        let id = client
            .allocate_instance_id(&node(), InstanceKind::Container)
            .await
            .unwrap();
        assert_eq!(id.get(), 121);
    }
}
