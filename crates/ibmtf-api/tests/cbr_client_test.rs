// Integration tests for `CbrClient` using wiremock.
#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ibmtf_api::cbr::{
    Address, CreateRuleOptions, CreateZoneOptions, DeleteRuleOptions, DeleteZoneOptions,
    GetAccountSettingsOptions, GetRuleOptions, GetZoneOptions,
    ListAvailableServicerefTargetsOptions, ListRulesOptions, ListZonesOptions, ReplaceRuleOptions,
    ReplaceZoneOptions, Resource, ResourceAttribute, RuleContext, RuleContextAttribute,
    ServiceRefTargetType, ServiceRefValue,
};
use ibmtf_api::{BaseService, CallHeaders, CbrClient, Error, NoAuth, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, CbrClient) {
    let server = MockServer::start().await;
    let service =
        BaseService::with_client(&server.uri(), reqwest::Client::new(), Arc::new(NoAuth)).unwrap();
    (server, CbrClient::from_service(service))
}

fn zone_json(id: &str) -> Value {
    json!({
        "id": id,
        "crn": format!("crn:v1:bluemix:public:context-based-restrictions:global:a/12ab34cd::zone:{id}"),
        "address_count": 2,
        "excluded_count": 1,
        "name": "office",
        "account_id": "12ab34cd",
        "description": "Office network",
        "addresses": [
            {"type": "ipRange", "value": "169.23.22.0-169.23.22.255"},
            {"type": "serviceRef", "ref": {"account_id": "12ab34cd", "service_name": "cloud-object-storage"}}
        ],
        "excluded": [{"type": "ipAddress", "value": "169.23.22.10"}],
        "href": format!("https://cbr.cloud.ibm.com/v1/zones/{id}"),
        "created_at": "2024-03-01T10:00:00.000Z",
        "created_by_id": "IBMid-3100015XDS",
        "last_modified_at": "2024-03-01T10:00:00.000Z",
        "last_modified_by_id": "IBMid-3100015XDS"
    })
}

fn rule_json(id: &str) -> Value {
    json!({
        "id": id,
        "crn": format!("crn:v1:bluemix:public:context-based-restrictions:global:a/12ab34cd::rule:{id}"),
        "description": "COS from office",
        "contexts": [{"attributes": [{"name": "networkZoneId", "value": "zone-1"}]}],
        "resources": [{
            "attributes": [
                {"name": "accountId", "value": "12ab34cd"},
                {"name": "serviceName", "value": "cloud-object-storage"}
            ],
            "tags": [{"name": "env", "value": "prod", "operator": "stringEquals"}]
        }],
        "href": format!("https://cbr.cloud.ibm.com/v1/rules/{id}"),
        "created_at": "2024-03-01T10:00:00.000Z",
        "created_by_id": "IBMid-3100015XDS",
        "last_modified_at": "2024-03-01T10:00:00.000Z",
        "last_modified_by_id": "IBMid-3100015XDS"
    })
}

fn rule_contexts() -> Vec<RuleContext> {
    vec![RuleContext {
        attributes: vec![RuleContextAttribute {
            name: "networkZoneId".into(),
            value: "zone-1".into(),
        }],
    }]
}

fn rule_resources() -> Vec<Resource> {
    vec![Resource {
        attributes: vec![ResourceAttribute {
            name: "accountId".into(),
            value: "12ab34cd".into(),
            operator: None,
        }],
        tags: None,
    }]
}

// ── Zones ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_zone_sends_body_without_nulls() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/zones"))
        .and(header("Content-Type", "application/json"))
        .and(header("Accept", "application/json"))
        .and(header("X-Correlation-Id", "corr-42"))
        .and(body_json(json!({
            "name": "office",
            "account_id": "12ab34cd",
            "addresses": [{"type": "ipAddress", "value": "169.23.56.234"}]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(zone_json("zone-1")))
        .expect(1)
        .mount(&server)
        .await;

    let opts = CreateZoneOptions {
        name: Some("office".into()),
        account_id: Some("12ab34cd".into()),
        addresses: Some(vec![Address::IpAddress {
            value: "169.23.56.234".into(),
        }]),
        headers: CallHeaders::default().with_correlation_id("corr-42"),
        ..CreateZoneOptions::default()
    };
    let resp = client.create_zone(&opts).await.unwrap();

    assert_eq!(resp.status, 201);
    assert_eq!(resp.result.id, "zone-1");
    assert_eq!(resp.result.addresses.len(), 2);
    assert_eq!(resp.result.excluded[0].kind(), "ipAddress");
}

#[tokio::test]
async fn test_list_zones_query_params() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/zones"))
        .and(query_param("account_id", "12ab34cd"))
        .and(query_param("name", "office"))
        .and(query_param_is_missing("sort"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "zones": [{
                "id": "zone-1",
                "crn": "crn:zone-1",
                "name": "office",
                "addresses_preview": [{"type": "subnet", "value": "10.0.0.0/24"}],
                "address_count": 1,
                "excluded_count": 0,
                "href": "https://cbr.cloud.ibm.com/v1/zones/zone-1",
                "created_at": "2024-03-01T10:00:00.000Z",
                "created_by_id": "IBMid-1",
                "last_modified_at": "2024-03-01T10:00:00.000Z",
                "last_modified_by_id": "IBMid-1"
            }]
        })))
        .mount(&server)
        .await;

    let opts = ListZonesOptions {
        name: Some("office".into()),
        ..ListZonesOptions::new("12ab34cd")
    };
    let list = client.list_zones(&opts).await.unwrap().result;

    assert_eq!(list.count, 1);
    assert_eq!(list.zones[0].name, "office");
    assert!(list.zones[0].description.is_none());
}

#[tokio::test]
async fn test_get_zone_exposes_etag() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/zones/zone-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "\"abc123\"")
                .set_body_json(zone_json("zone-1")),
        )
        .mount(&server)
        .await;

    let resp = client.get_zone(&GetZoneOptions::new("zone-1")).await.unwrap();
    assert_eq!(resp.etag(), Some("\"abc123\""));
    assert_eq!(resp.result.address_count, 2);
}

#[tokio::test]
async fn test_replace_zone_sends_if_match() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/v1/zones/zone-1"))
        .and(header("If-Match", "\"abc123\""))
        .and(body_json(json!({
            "name": "office",
            "account_id": "12ab34cd",
            "description": "renamed",
            "addresses": [{"type": "vpc", "value": "crn:vpc-1"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(zone_json("zone-1")))
        .expect(1)
        .mount(&server)
        .await;

    let opts = ReplaceZoneOptions {
        name: Some("office".into()),
        account_id: Some("12ab34cd".into()),
        description: Some("renamed".into()),
        addresses: Some(vec![Address::Vpc {
            value: "crn:vpc-1".into(),
        }]),
        ..ReplaceZoneOptions::new("zone-1", "\"abc123\"")
    };
    client.replace_zone(&opts).await.unwrap();
}

#[tokio::test]
async fn test_delete_zone_no_content() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/v1/zones/zone-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client
        .delete_zone(&DeleteZoneOptions::new("zone-1"))
        .await
        .unwrap();
    assert_eq!(resp.status, 204);
}

#[tokio::test]
async fn test_serviceref_targets_type_filter() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/zones/serviceref_targets"))
        .and(query_param("type", "platform_service"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2,
            "targets": [
                {"service_name": "iam-groups", "service_type": "platform_service"},
                {"service_name": "containers-kubernetes"}
            ]
        })))
        .mount(&server)
        .await;

    let opts = ListAvailableServicerefTargetsOptions {
        target_type: Some(ServiceRefTargetType::PlatformService),
        ..ListAvailableServicerefTargetsOptions::default()
    };
    let targets = client
        .list_available_serviceref_targets(&opts)
        .await
        .unwrap()
        .result;
    assert_eq!(targets.count, 2);
    assert_eq!(targets.targets[1].service_type, None);
}

// ── Rules ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_rule() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/rules"))
        .and(body_json(json!({
            "description": "COS from office",
            "contexts": [{"attributes": [{"name": "networkZoneId", "value": "zone-1"}]}],
            "resources": [{"attributes": [{"name": "accountId", "value": "12ab34cd"}]}]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(rule_json("rule-1")))
        .mount(&server)
        .await;

    let opts = CreateRuleOptions {
        description: Some("COS from office".into()),
        contexts: Some(rule_contexts()),
        resources: Some(rule_resources()),
        ..CreateRuleOptions::default()
    };
    let rule = client.create_rule(&opts).await.unwrap().result;

    assert_eq!(rule.id, "rule-1");
    let tags = rule.resources[0].tags.as_ref().unwrap();
    assert_eq!(tags[0].operator.as_deref(), Some("stringEquals"));
}

#[tokio::test]
async fn test_list_rules_filters() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/rules"))
        .and(query_param("account_id", "12ab34cd"))
        .and(query_param("service_name", "cloud-object-storage"))
        .and(query_param("zone_id", "zone-1"))
        .and(query_param_is_missing("region"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "rules": [rule_json("rule-1")]
        })))
        .mount(&server)
        .await;

    let opts = ListRulesOptions {
        service_name: Some("cloud-object-storage".into()),
        zone_id: Some("zone-1".into()),
        ..ListRulesOptions::new("12ab34cd")
    };
    let list = client.list_rules(&opts).await.unwrap().result;
    assert_eq!(list.rules.len(), 1);
}

#[tokio::test]
async fn test_get_replace_delete_rule() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/rules/rule-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "W/\"r1\"")
                .set_body_json(rule_json("rule-1")),
        )
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/v1/rules/rule-1"))
        .and(header("If-Match", "W/\"r1\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(rule_json("rule-1")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/rules/rule-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let current = client.get_rule(&GetRuleOptions::new("rule-1")).await.unwrap();
    let etag = current.etag().unwrap().to_owned();

    let opts = ReplaceRuleOptions {
        description: Some(current.result.description.clone()),
        contexts: Some(current.result.contexts.clone()),
        resources: Some(current.result.resources.clone()),
        ..ReplaceRuleOptions::new("rule-1", etag)
    };
    client.replace_rule(&opts).await.unwrap();
    client
        .delete_rule(&DeleteRuleOptions::new("rule-1"))
        .await
        .unwrap();
}

// ── Account settings ────────────────────────────────────────────────

#[tokio::test]
async fn test_get_account_settings() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/account_settings/12ab34cd"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "12ab34cd",
            "crn": "crn:v1:bluemix:public:context-based-restrictions:global:a/12ab34cd:::",
            "rule_count_limit": 1000,
            "zone_count_limit": 500,
            "current_rule_count": 4,
            "current_zone_count": 2,
            "href": "https://cbr.cloud.ibm.com/v1/account_settings/12ab34cd",
            "created_at": "2024-01-01T00:00:00.000Z",
            "created_by_id": "IBMid-1",
            "last_modified_at": "2024-01-01T00:00:00.000Z",
            "last_modified_by_id": "IBMid-1"
        })))
        .mount(&server)
        .await;

    let settings = client
        .get_account_settings(&GetAccountSettingsOptions::new("12ab34cd"))
        .await
        .unwrap()
        .result;
    assert_eq!(settings.zone_count_limit, 500);
    assert_eq!(settings.current_rule_count, 4);
}

// ── Headers ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_caller_headers_override_defaults() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/zones/zone-1"))
        .and(header("Transaction-Id", "txn-from-caller"))
        .and(header("X-Custom", "yes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(zone_json("zone-1")))
        .expect(1)
        .mount(&server)
        .await;

    let opts = GetZoneOptions {
        headers: CallHeaders::default()
            .with_transaction_id("txn-from-options")
            .with_header("Transaction-Id", "txn-from-caller")
            .with_header("X-Custom", "yes"),
        ..GetZoneOptions::new("zone-1")
    };
    client.get_zone(&opts).await.unwrap();
}

// ── Error cases ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_missing_required_params_send_nothing() {
    let (server, client) = setup().await;

    let err = client.get_zone(&GetZoneOptions::new("")).await.unwrap_err();
    assert!(matches!(err, Error::MissingParameter { name: "zone_id" }));

    let err = client
        .list_rules(&ListRulesOptions::new(""))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MissingParameter { name: "account_id" }));

    let err = client
        .replace_zone(&ReplaceZoneOptions::new("zone-1", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MissingParameter { name: "If-Match" }));

    let err = client
        .delete_rule(&DeleteRuleOptions::new(""))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MissingParameter { name: "rule_id" }));

    let received = server.received_requests().await.unwrap();
    assert!(received.is_empty(), "no request may reach the server");
}

#[tokio::test]
async fn test_http_error_keeps_body() {
    let (server, client) = setup().await;

    let body = json!({
        "errors": [{"code": "not_found", "message": "The zone with id zone-9 was not found."}],
        "trace": "a1b2c3",
        "status_code": 404
    });

    Mock::given(method("GET"))
        .and(path("/v1/zones/zone-9"))
        .respond_with(ResponseTemplate::new(404).set_body_json(&body))
        .mount(&server)
        .await;

    let err = client
        .get_zone(&GetZoneOptions::new("zone-9"))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    match err {
        Error::Http {
            status,
            message,
            body: raw,
        } => {
            assert_eq!(status, 404);
            assert_eq!(message, "The zone with id zone-9 was not found.");
            assert_eq!(serde_json::from_str::<Value>(&raw).unwrap(), body);
        }
        other => panic!("expected Http error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_slow_response_reports_configured_timeout() {
    let server = MockServer::start().await;
    let transport = TransportConfig {
        timeout: Duration::from_secs(1),
        ..TransportConfig::default()
    };
    let service = BaseService::new(&server.uri(), Arc::new(NoAuth), &transport).unwrap();
    let client = CbrClient::from_service(service);

    Mock::given(method("GET"))
        .and(path("/v1/zones/zone-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(zone_json("zone-1"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let err = client
        .get_zone(&GetZoneOptions::new("zone-1"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Timeout { timeout_secs: 1 }), "got {err:?}");
    assert_eq!(err.to_string(), "Request timed out after 1s");
}

#[tokio::test]
async fn test_unknown_address_type_fails_decode() {
    let (server, client) = setup().await;

    let mut zone = zone_json("zone-1");
    zone["addresses"] = json!([{"type": "ipv6Range", "value": "::1-::2"}]);

    Mock::given(method("GET"))
        .and(path("/v1/zones/zone-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(zone))
        .mount(&server)
        .await;

    let err = client
        .get_zone(&GetZoneOptions::new("zone-1"))
        .await
        .unwrap_err();
    match err {
        Error::Deserialization { message, body } => {
            assert!(message.contains("ipv6Range"), "{message}");
            assert!(body.contains("zone-1"));
        }
        other => panic!("expected Deserialization error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_service_ref_address_round_trip_through_api() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/zones/zone-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(zone_json("zone-1")))
        .mount(&server)
        .await;

    let zone = client
        .get_zone(&GetZoneOptions::new("zone-1"))
        .await
        .unwrap()
        .result;
    assert_eq!(
        zone.addresses[1],
        Address::ServiceRef {
            service_ref: ServiceRefValue {
                account_id: "12ab34cd".into(),
                service_name: Some("cloud-object-storage".into()),
                ..ServiceRefValue::default()
            }
        }
    );
}
