use crate::{
    InstanceId, InstanceKind, InstanceTarget, LifecycleService, NodeName, ProxmoxClient,
    tests::{task_response, token_client},
};
use std::sync::Arc;
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

fn target() -> InstanceTarget {
    InstanceTarget::new(
        InstanceId::new(142).unwrap(),
        NodeName::new("px1").unwrap(),
        InstanceKind::Container,
    )
}

async fn mount_status(server: &MockServer, status: &str, calls: u64) {
    Mock::given(method("GET"))
        .and(path("/api2/json/nodes/px1/lxc/142/status/current"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "data": { "status": status } })),
        )
        .expect(calls)
        .mount(server)
        .await;
}

async fn mount_stop(server: &MockServer, calls: u64) {
    Mock::given(method("POST"))
        .and(path("/api2/json/nodes/px1/lxc/142/status/stop"))
        .respond_with(task_response())
        .expect(calls)
        .mount(server)
        .await;
}

async fn mount_delete(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("DELETE"))
        .and(path("/api2/json/nodes/px1/lxc/142"))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_stuck_instance_is_polled_exactly_wait_seconds_times() {
    let server = MockServer::start().await;
    let client = token_client(&server);
    let wait_seconds = 4;

    mount_status(&server, "running", 1 + u64::from(wait_seconds)).await;
    mount_stop(&server, 1).await;
    mount_delete(&server, task_response()).await;

    let outcome = client.stop_and_delete(&target(), wait_seconds).await;
    assert!(outcome.success, "{}", outcome.message);
    assert_eq!(outcome.message, "Container 142 deleted");
}

#[tokio::test]
async fn test_stopped_instance_is_deleted_directly() {
    let server = MockServer::start().await;
    let client = token_client(&server);

    mount_status(&server, "stopped", 1).await;
    mount_stop(&server, 0).await;
    mount_delete(&server, ResponseTemplate::new(204)).await;

    assert!(client.stop_and_delete(&target(), 20).await.success);
}

#[tokio::test]
async fn test_unreadable_state_still_deletes() {
    let server = MockServer::start().await;
    let client = token_client(&server);

    Mock::given(method("GET"))
        .and(path("/api2/json/nodes/px1/lxc/142/status/current"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(1)
        .mount(&server)
        .await;
    mount_stop(&server, 0).await;
    mount_delete(&server, task_response()).await;

    assert!(client.stop_and_delete(&target(), 20).await.success);
}

#[tokio::test]
async fn test_delete_rejection_is_reported() {
    let server = MockServer::start().await;
    let client = token_client(&server);

    mount_status(&server, "stopped", 1).await;
    mount_delete(
        &server,
        ResponseTemplate::new(403).set_body_string("Permission check failed (/vms/142, VM.Allocate)"),
    )
    .await;

    let outcome = client.stop_and_delete(&target(), 20).await;
    assert!(!outcome.success);
    assert!(outcome.message.contains("403"));
    assert!(outcome.message.contains("Permission check failed"));
}

#[tokio::test]
async fn test_lifecycle_teardown_uses_configured_budget() {
    let server = MockServer::start().await;
    let client: ProxmoxClient = token_client(&server);

    mount_status(&server, "running", 3).await;
    mount_stop(&server, 1).await;
    mount_delete(&server, task_response()).await;

    let lifecycle = LifecycleService::for_client(Arc::new(client)).with_teardown_wait(2);
    assert_eq!(lifecycle.poll_interval(), Duration::from_millis(1));
    let outcome = lifecycle.teardown(&target()).await;
    assert!(outcome.success);
}
