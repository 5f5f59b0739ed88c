//! HTTP-level tests for the REST table store client
//!
//! These tests validate the requests sent to a PostgREST endpoint:
//! - Authentication and representation headers
//! - Insert bodies
//! - Composite delete filters
//! - Error body handling

use livesim_cli::config::StoreCredentials;
use livesim_cli::store::{EqFilter, RestTableClient, TableStore};
use livesim_cli::CliError;
use livesim_common::types::{IdentityKey, Record};
use serde_json::json;
use std::time::Duration;
use wiremock::{
    matchers::{body_json, header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

const TABLE: &str = "SmartTransit_Integrated";

fn client(server: &MockServer) -> RestTableClient {
    let creds = StoreCredentials::resolve(Some(server.uri().as_str()), Some("test-key"))
        .expect("valid credentials");
    RestTableClient::new(&creds, Duration::from_secs(5)).expect("client builds")
}

fn trip(trip_id: &str) -> Record {
    [
        ("datetime".to_string(), json!("2024-01-01T00:00:00")),
        ("trip_id".to_string(), json!(trip_id)),
        ("occupancy".to_string(), json!(12)),
    ]
    .into_iter()
    .collect()
}

#[tokio::test]
async fn test_insert_sends_auth_headers_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/rest/v1/{}", TABLE)))
        .and(header("apikey", "test-key"))
        .and(header("authorization", "Bearer test-key"))
        .and(header("prefer", "return=representation"))
        .and(body_json(json!([
            {"datetime": "2024-01-01T00:00:00", "trip_id": "T1", "occupancy": 12},
            {"datetime": "2024-01-01T00:00:00", "trip_id": "T2", "occupancy": 12}
        ])))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            {"trip_id": "T1"},
            {"trip_id": "T2"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server)
        .insert(TABLE, &[trip("T1"), trip("T2")])
        .await
        .expect("insert succeeds");

    assert_eq!(response.submitted, 2);
    assert_eq!(response.returned, Some(2));
}

#[tokio::test]
async fn test_insert_rejection_surfaces_store_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/rest/v1/{}", TABLE)))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint",
            "details": null,
            "hint": null
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .insert(TABLE, &[trip("T1")])
        .await
        .expect_err("insert fails");

    match err {
        CliError::Store { status, message } => {
            assert_eq!(status, 409);
            assert!(message.contains("duplicate key value"));
        }
        other => panic!("expected store error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_delete_filters_on_both_key_fields() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path(format!("/rest/v1/{}", TABLE)))
        .and(query_param("datetime", "eq.2024-01-01T00:00:00"))
        .and(query_param("trip_id", "eq.T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"trip_id": "T1"}])))
        .expect(1)
        .mount(&server)
        .await;

    let key = IdentityKey::new("2024-01-01T00:00:00", "T1");
    let response = client(&server)
        .delete(TABLE, &EqFilter::for_key(&key))
        .await
        .expect("delete succeeds");

    assert_eq!(response.returned, Some(1));
}

#[tokio::test]
async fn test_delete_without_representation() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path(format!("/rest/v1/{}", TABLE)))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let key = IdentityKey::new("2024-01-01T00:00:00", "T9");
    let response = client(&server)
        .delete(TABLE, &EqFilter::for_key(&key))
        .await
        .expect("delete succeeds");

    assert_eq!(response.returned, None);
}

#[tokio::test]
async fn test_unreachable_store_is_http_error() {
    let creds = StoreCredentials::resolve(Some("http://127.0.0.1:9"), Some("k")).expect("valid");
    let client = RestTableClient::new(&creds, Duration::from_secs(2)).expect("client builds");

    let err = client.insert(TABLE, &[trip("T1")]).await.expect_err("no server");
    assert!(matches!(err, CliError::Http(_)));
}
