//! Integration tests for the HTTP API
//!
//! Drives the full router (middleware included) with `oneshot` requests.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use circulate::{
    config::Config,
    handlers::{self, AppState},
    middleware::REQUEST_ID_HEADER,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn create_test_config() -> Config {
    let toml = r#"
[server]
host = "127.0.0.1"
port = 5000

[pool]
endpoints = ["A", "B", "C", "D", "E"]
policy = "round_robin"
"#;
    toml::from_str(toml).expect("should parse test config")
}

fn create_app() -> (Router, AppState) {
    let state = AppState::new(Arc::new(create_test_config())).expect("should create AppState");
    (handlers::router(state.clone()), state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_get_ip_rotates_round_robin() {
    let (app, _) = create_app();

    let mut picks = Vec::new();
    let mut last = Value::Null;
    for _ in 0..3 {
        let (status, body) = send(&app, get("/api/get_ip")).await;
        assert_eq!(status, StatusCode::OK);
        picks.push(body["endpoint"].as_str().unwrap().to_string());
        last = body;
    }

    assert_eq!(picks, ["A", "B", "C"]);
    assert_eq!(last["ip"], "C");
    assert_eq!(last["message"], "circulate");
    assert_eq!(last["policy"], "round_robin");
    assert_eq!(last["stats"]["A"], 1);
    assert_eq!(last["stats"]["B"], 1);
    assert_eq!(last["stats"]["C"], 1);
    assert_eq!(last["stats"]["D"], 0);
    assert_eq!(last["stats"]["E"], 0);
}

#[tokio::test]
async fn test_set_algorithm_least_connections() {
    let (app, _) = create_app();

    // A, B, C each selected once under round-robin
    for _ in 0..3 {
        send(&app, get("/api/get_ip")).await;
    }

    let (status, body) = send(&app, get("/api/set_algorithm/least_connections")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["policy"], "least_connections");

    let (_, body) = send(&app, get("/api/get_ip")).await;
    assert_eq!(body["endpoint"], "D");
    assert_eq!(body["policy"], "least_connections");
}

#[tokio::test]
async fn test_set_algorithm_unknown_is_rejected() {
    let (app, state) = create_app();
    send(&app, get("/api/set_algorithm/random")).await;

    let (status, body) = send(&app, get("/api/set_algorithm/fastest")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("fastest"));

    assert_eq!(
        state.selector().policy().await,
        circulate::selector::Policy::Random
    );
}

#[tokio::test]
async fn test_add_ip_then_stats() {
    let (app, _) = create_app();

    let (status, body) = send(&app, post_json("/api/add_ip", r#"{"ip": "1.2.3.4"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Added 1.2.3.4");

    let (status, body) = send(&app, get("/api/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["policy"], "round_robin");
    assert_eq!(body["stats"]["1.2.3.4"], 0);
    assert_eq!(body["stats"].as_object().unwrap().len(), 6);
}

#[tokio::test]
async fn test_add_ip_twice_is_idempotent() {
    let (app, state) = create_app();

    send(&app, post_json("/api/add_ip", r#"{"ip": "1.2.3.4"}"#)).await;
    let (status, body) = send(&app, post_json("/api/add_ip", r#"{"ip": "1.2.3.4"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(state.selector().len().await, 6);
    assert_eq!(state.metrics().pool_size(), 6);
}

#[tokio::test]
async fn test_add_ip_empty_is_rejected() {
    let (app, state) = create_app();

    let (status, body) = send(&app, post_json("/api/add_ip", r#"{"ip": ""}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid IP");

    assert_eq!(state.selector().len().await, 5);
}

#[tokio::test]
async fn test_add_ip_missing_field_is_rejected() {
    let (app, state) = create_app();

    let (status, body) = send(&app, post_json("/api/add_ip", "{}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid IP");

    assert_eq!(state.selector().get_stats().await.len(), 5);
}

#[tokio::test]
async fn test_add_ip_without_body_is_rejected() {
    let (app, state) = create_app();

    let request = Request::builder()
        .method("POST")
        .uri("/api/add_ip")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid IP");
    assert_eq!(state.selector().len().await, 5);
}

#[tokio::test]
async fn test_add_ip_non_string_is_rejected() {
    let (app, state) = create_app();

    for payload in [r#"{"ip": 5}"#, r#"{"ip": []}"#, "not json"] {
        let (status, body) = send(&app, post_json("/api/add_ip", payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {payload}");
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Invalid IP");
    }

    assert_eq!(state.selector().len().await, 5);
}

#[tokio::test]
async fn test_unreadable_add_ip_payload_counts_as_rejection() {
    let (app, state) = create_app();

    send(&app, post_json("/api/add_ip", r#"{"ip": 5}"#)).await;

    let text = state.metrics().gather().unwrap();
    assert!(text.contains("circulate_rejected_operations_total{reason=\"invalid_endpoint\"} 1"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_adds_leave_pool_gauge_current() {
    let (app, state) = create_app();

    let requests = (0..20).map(|i| {
        let app = app.clone();
        async move {
            let body = format!(r#"{{"ip": "10.2.0.{i}"}}"#);
            send(&app, post_json("/api/add_ip", &body)).await
        }
    });
    for (status, _) in futures::future::join_all(requests).await {
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(state.selector().len().await, 25);
    assert_eq!(state.metrics().pool_size(), 25);
}

#[tokio::test]
async fn test_added_endpoint_joins_rotation_at_tail() {
    let (app, _) = create_app();

    send(&app, post_json("/api/add_ip", r#"{"ip": "F"}"#)).await;

    let mut picks = Vec::new();
    for _ in 0..7 {
        let (_, body) = send(&app, get("/api/get_ip")).await;
        picks.push(body["endpoint"].as_str().unwrap().to_string());
    }
    assert_eq!(picks, ["A", "B", "C", "D", "E", "F", "A"]);
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let (app, _) = create_app();

    let response = app.clone().oneshot(get("/api/stats")).await.unwrap();
    let header = response
        .headers()
        .get(REQUEST_ID_HEADER)
        .expect("response should carry a request id");
    assert!(uuid::Uuid::parse_str(header.to_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_metrics_reflect_api_activity() {
    let (app, _) = create_app();

    send(&app, get("/api/get_ip")).await;
    send(&app, get("/api/get_ip")).await;
    send(&app, post_json("/api/add_ip", r#"{"ip": ""}"#)).await;

    let response = app.clone().oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();

    assert!(text.contains("circulate_selections_total{policy=\"round_robin\"} 2"));
    assert!(text.contains("circulate_rejected_operations_total{reason=\"invalid_endpoint\"} 1"));
}

#[tokio::test]
async fn test_unknown_route_not_found() {
    let (app, _) = create_app();
    let response = app.oneshot(get("/api/nonexistent")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
