// Integration tests for `SchematicsClient` using wiremock.
#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ibmtf_api::schematics::{GetWorkspaceOptions, GetWorkspaceTemplateStateOptions};
use ibmtf_api::{BaseService, Error, NoAuth, SchematicsClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, SchematicsClient) {
    let server = MockServer::start().await;
    let service =
        BaseService::with_client(&server.uri(), reqwest::Client::new(), Arc::new(NoAuth))
            .unwrap();
    (server, SchematicsClient::from_service(service))
}

// ── Template state ──────────────────────────────────────────────────

#[tokio::test]
async fn test_get_workspace_template_state_is_free_form() {
    let (server, client) = setup().await;

    let state = json!({
        "version": 4,
        "terraform_version": "1.5.7",
        "serial": 12,
        "outputs": {"ip": {"value": "10.0.0.1", "type": "string"}},
        "resources": []
    });

    Mock::given(method("GET"))
        .and(path("/v1/workspaces/ws-1/runtime_data/tpl-1/state_store"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&state))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client
        .get_workspace_template_state(&GetWorkspaceTemplateStateOptions::new("ws-1", "tpl-1"))
        .await
        .unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(resp.result, state);
}

#[tokio::test]
async fn test_template_state_numbers_keep_source_text() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/workspaces/ws-1/runtime_data/tpl-1/state_store"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"serial": 12345678901234567890123, "ratio": 1.50, "lineage": "f00"}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let state = client
        .get_workspace_template_state(&GetWorkspaceTemplateStateOptions::new("ws-1", "tpl-1"))
        .await
        .unwrap()
        .into_result();
    assert_eq!(
        state.to_string(),
        r#"{"serial":12345678901234567890123,"ratio":1.50,"lineage":"f00"}"#
    );
}

#[tokio::test]
async fn test_workspace_state_missing_template_id() {
    let (server, client) = setup().await;

    let err = client
        .get_workspace_template_state(&GetWorkspaceTemplateStateOptions::new("ws-1", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MissingParameter { name: "t_id" }));
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ── Workspace ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_workspace() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/workspaces/ws-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "ws-1",
            "name": "network",
            "location": "us-south",
            "status": "ACTIVE",
            "template_data": [{"id": "tpl-1", "folder": ".", "type": "terraform_v1.5"}]
        })))
        .mount(&server)
        .await;

    let ws = client
        .get_workspace(&GetWorkspaceOptions::new("ws-1"))
        .await
        .unwrap()
        .result;
    assert_eq!(ws.name.as_deref(), Some("network"));
    assert_eq!(ws.template_data[0].id.as_deref(), Some("tpl-1"));
    assert_eq!(ws.template_data[0].template_type.as_deref(), Some("terraform_v1.5"));
}

#[tokio::test]
async fn test_get_workspace_requires_id() {
    let (server, client) = setup().await;

    let err = client
        .get_workspace(&GetWorkspaceOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MissingParameter { name: "w_id" }));
    assert!(server.received_requests().await.unwrap().is_empty());
}
