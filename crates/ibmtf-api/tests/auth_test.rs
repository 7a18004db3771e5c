// Integration tests for IAM token exchange and executor retries.
#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ibmtf_api::cbr::GetAccountSettingsOptions;
use ibmtf_api::{
    Authenticator, BaseService, BearerToken, CbrClient, Error, IamAuthenticator, NoAuth,
    RetryPolicy,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn iam(server: &MockServer, key: &str) -> IamAuthenticator {
    let token_url = Url::parse(&format!("{}/identity/token", server.uri())).unwrap();
    IamAuthenticator::new(
        reqwest::Client::new(),
        SecretString::from(key.to_owned()),
        token_url,
    )
}

fn settings_json() -> serde_json::Value {
    json!({
        "id": "12ab34cd",
        "crn": "crn:settings",
        "rule_count_limit": 1000,
        "zone_count_limit": 500,
        "current_rule_count": 0,
        "current_zone_count": 0,
        "href": "https://cbr.cloud.ibm.com/v1/account_settings/12ab34cd",
        "created_at": "2024-01-01T00:00:00.000Z",
        "created_by_id": "IBMid-1",
        "last_modified_at": "2024-01-01T00:00:00.000Z",
        "last_modified_by_id": "IBMid-1"
    })
}

// ── IAM ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_iam_token_is_cached_across_calls() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/identity/token"))
        .and(body_string_contains("grant_type=urn%3Aibm%3Aparams%3Aoauth%3Agrant-type%3Aapikey"))
        .and(body_string_contains("apikey=secret-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-abc",
            "refresh_token": "not_supported",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/account_settings/12ab34cd"))
        .and(header("Authorization", "Bearer tok-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(settings_json()))
        .expect(2)
        .mount(&server)
        .await;

    let auth = Arc::new(iam(&server, "secret-key"));
    let service = BaseService::with_client(&server.uri(), reqwest::Client::new(), auth).unwrap();
    let client = CbrClient::from_service(service);

    let opts = GetAccountSettingsOptions::new("12ab34cd");
    client.get_account_settings(&opts).await.unwrap();
    client.get_account_settings(&opts).await.unwrap();
}

#[tokio::test]
async fn test_iam_error_surfaces_code_and_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/identity/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errorCode": "BXNIM0415E",
            "errorMessage": "Provided API key could not be found."
        })))
        .mount(&server)
        .await;

    let err = iam(&server, "bad-key").authorization().await.unwrap_err();
    match err {
        Error::Authentication { message } => {
            assert_eq!(message, "BXNIM0415E: Provided API key could not be found.");
        }
        other => panic!("expected Authentication error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_bearer_token_header_is_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/account_settings/12ab34cd"))
        .and(header("Authorization", "Bearer static-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(settings_json()))
        .expect(1)
        .mount(&server)
        .await;

    let auth = Arc::new(BearerToken::new(SecretString::from("static-token".to_owned())));
    let service = BaseService::with_client(&server.uri(), reqwest::Client::new(), auth).unwrap();
    CbrClient::from_service(service)
        .get_account_settings(&GetAccountSettingsOptions::new("12ab34cd"))
        .await
        .unwrap();
}

// ── Retries ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/account_settings/12ab34cd"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/account_settings/12ab34cd"))
        .respond_with(ResponseTemplate::new(200).set_body_json(settings_json()))
        .expect(1)
        .mount(&server)
        .await;

    let service = BaseService::with_client(&server.uri(), reqwest::Client::new(), Arc::new(NoAuth))
        .unwrap()
        .with_retry(Some(RetryPolicy::new(2, Duration::from_millis(10))));
    let resp = CbrClient::from_service(service)
        .get_account_settings(&GetAccountSettingsOptions::new("12ab34cd"))
        .await
        .unwrap();
    assert_eq!(resp.status, 200);
}

#[tokio::test]
async fn test_no_retry_without_policy() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/account_settings/12ab34cd"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let service =
        BaseService::with_client(&server.uri(), reqwest::Client::new(), Arc::new(NoAuth)).unwrap();
    let err = CbrClient::from_service(service)
        .get_account_settings(&GetAccountSettingsOptions::new("12ab34cd"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert_eq!(err.to_string(), "HTTP 503: Service Unavailable");
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/account_settings/12ab34cd"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "errors": [{"code": "forbidden", "message": "Access denied"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = BaseService::with_client(&server.uri(), reqwest::Client::new(), Arc::new(NoAuth))
        .unwrap()
        .with_retry(Some(RetryPolicy::new(3, Duration::from_millis(10))));
    let err = CbrClient::from_service(service)
        .get_account_settings(&GetAccountSettingsOptions::new("12ab34cd"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "HTTP 403: Access denied");
}
