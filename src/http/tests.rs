//! Tests for the HTTP client module

use super::*;
use crate::auth::Credentials;
use crate::config::ClientConfig;
use crate::error::{Error, RepositoryErrorKind};
use crate::types::BackoffType;
use pretty_assertions::assert_eq;
use reqwest::Method;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn quick_retry() -> RetryPolicy {
    RetryPolicy::default().backoff(BackoffType::None, Duration::ZERO, Duration::ZERO)
}

fn client_for(server: &MockServer, credentials: Credentials) -> RepositoryClient {
    let config = ClientConfig::builder()
        .base_url(server.uri())
        .retry(quick_retry())
        .build();
    RepositoryClient::new(config, credentials).unwrap()
}

#[test]
fn test_invalid_base_url() {
    let config = ClientConfig::builder().base_url("not a url").build();
    let result = RepositoryClient::new(config, Credentials::None);
    assert!(matches!(result, Err(Error::InvalidUrl(_))));
}

#[test]
fn test_url_joining() {
    let config = ClientConfig::builder()
        .base_url("https://repo.example.com/api/")
        .build();
    let client = RepositoryClient::new(config, Credentials::None).unwrap();

    assert_eq!(
        client.url("/record/filter").unwrap().as_str(),
        "https://repo.example.com/api/record/filter"
    );
    assert_eq!(
        client.url("format").unwrap().as_str(),
        "https://repo.example.com/api/format"
    );
    assert_eq!(
        client.url("https://other.example.com/x").unwrap().as_str(),
        "https://other.example.com/x"
    );
}

#[tokio::test]
async fn test_send_applies_query_body_and_auth() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/record/filter"))
        .and(query_param("page", "2"))
        .and(query_param("perPage", "50"))
        .and(header("Authorization", "Bearer key-1"))
        .and(body_json(serde_json::json!({ "formats": [1] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, Credentials::token("key-1"));
    let body = serde_json::json!({ "formats": [1] });
    let response = client
        .send(
            Method::POST,
            "/record/filter",
            &[("page", "2".to_string()), ("perPage", "50".to_string())],
            Some(&body),
        )
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn test_send_does_not_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/format"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, Credentials::None);
    let err = client
        .send(Method::GET, "/format", &[], None)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(503));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_structured_error_with_request_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/format/7"))
        .respond_with(
            ResponseTemplate::new(404)
                .insert_header(REQUEST_ID_HEADER, "req-abc")
                .set_body_json(serde_json::json!({
                    "statusCode": 404,
                    "kind": "NotFound",
                    "detail": "Couldn't find format 7."
                })),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, Credentials::None);
    let err = client
        .send(Method::GET, "/format/7", &[], None)
        .await
        .unwrap_err();

    match err {
        Error::Repository {
            status,
            request_id,
            error,
        } => {
            assert_eq!(status, 404);
            assert_eq!(request_id.as_deref(), Some("req-abc"));
            assert_eq!(error.kind, RepositoryErrorKind::NotFound);
            assert_eq!(error.detail.as_deref(), Some("Couldn't find format 7."));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_unparseable_error_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/format"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, Credentials::None);
    let err = client
        .send(Method::GET, "/format", &[], None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::ErrorResponse { status: 502, ref body, .. } if body.contains("Bad Gateway")
    ));
}

#[tokio::test]
async fn test_get_json_retries_server_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "statusCode": 500,
            "kind": "ServerError"
        })))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([1, 2, 3])))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, Credentials::None);
    let values: Vec<u32> = client.get_json("/user").await.unwrap();
    assert_eq!(values, vec![1, 2, 3]);
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_get_json_body_mismatch_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/format/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, Credentials::None);
    let result = client.get_json::<serde_json::Value>("/format/1").await;

    let err = result.unwrap_err();
    assert!(matches!(err, Error::JsonParse(_)));
    assert!(!err.is_transient());
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_get_json_client_error_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "statusCode": 403,
            "kind": "AdminOnlyResource"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, Credentials::None);
    let err = client.get_json::<Vec<u32>>("/user").await.unwrap_err();
    assert_eq!(err.status(), Some(403));
}

#[tokio::test]
async fn test_invalid_token_drops_session() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "token": "t" })))
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/format"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "statusCode": 401,
            "kind": "InvalidToken"
        })))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/format"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, Credentials::login("alice", "pw"));
    assert!(client.send(Method::GET, "/format", &[], None).await.is_err());
    assert!(client.send(Method::GET, "/format", &[], None).await.is_ok());
}

#[tokio::test]
async fn test_rate_limiter_is_used() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let config = ClientConfig::builder()
        .base_url(mock_server.uri())
        .rate_limit(RateLimiterConfig::new(100, 10))
        .build();
    let client = RepositoryClient::new(config, Credentials::None).unwrap();

    for _ in 0..3 {
        client.send(Method::GET, "/format", &[], None).await.unwrap();
    }
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);
}
