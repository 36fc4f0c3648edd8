use axum::extract::connect_info::MockConnectInfo;
use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::Utc;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tempfile::TempDir;

use crate::client::tests::RecordingTransport;
use crate::config::{AppConfig, AuditConfig, Config, SecurityConfig};
use crate::constants::API_BASE;
use crate::handlers::{HealthResponse, MetricsResponse};
use crate::registry::ClientRegistry;
use crate::response::ApiResponse;
use crate::server::Server;
use crate::signature::attach_signature;

const APP_ID: &str = "10001";
const SECRET: &str = "s3cret";

fn test_config() -> Config {
    Config {
        apps: vec![AppConfig {
            app_id: APP_ID.to_string(),
            app_secret: Some(SECRET.to_string()),
        }],
        ..Config::default()
    }
}

fn test_server(config: Config) -> TestServer {
    let registry = ClientRegistry::new(API_BASE, Arc::new(RecordingTransport::default()));
    let server = Server::with_registry(config, Arc::new(registry)).unwrap();

    let app = server
        .create_router()
        .layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 8080))));

    TestServer::new(app).unwrap()
}

fn signed_callback() -> Map<String, Value> {
    let mut callback = json!({
        "app_id": APP_ID,
        "biz_sn": "B20240101",
        "money": "9.90",
        "status": "paid",
    })
    .as_object()
    .unwrap()
    .clone();
    attach_signature(&mut callback, SECRET.as_bytes(), Utc::now().timestamp());
    callback
}

#[tokio::test]
async fn test_health_check() {
    let server = test_server(test_config());

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let health: HealthResponse = response.json();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    assert_eq!(health.apps, 1);
}

#[tokio::test]
async fn test_security_headers_present() {
    let server = test_server(test_config());

    let response = server.get("/health").await;
    assert_eq!(response.header("x-content-type-options"), "nosniff");
    assert_eq!(response.header("x-frame-options"), "DENY");
    assert_eq!(response.header("referrer-policy"), "no-referrer");
}

#[tokio::test]
async fn test_json_callback_accepted() {
    let server = test_server(test_config());

    let response = server
        .post(&format!("/callback/{APP_ID}"))
        .json(&Value::Object(signed_callback()))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: ApiResponse = response.json();
    assert_eq!(body.code, 0);
    assert_eq!(body.msg, "ok");
}

#[tokio::test]
async fn test_form_callback_accepted() {
    let server = test_server(test_config());

    let form: HashMap<String, String> = signed_callback()
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (key, value)
        })
        .collect();

    let response = server
        .post(&format!("/callback/{APP_ID}"))
        .form(&form)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_tampered_callback_rejected() {
    let server = test_server(test_config());

    let mut callback = signed_callback();
    callback.insert("money".to_string(), json!("0.01"));

    let response = server
        .post(&format!("/callback/{APP_ID}"))
        .json(&Value::Object(callback))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let body: ApiResponse = response.json();
    assert_eq!(body.code, -1);
    assert_eq!(body.msg, "sign error");
}

#[tokio::test]
async fn test_stale_callback_rejected() {
    let server = test_server(test_config());

    let mut callback = json!({"app_id": APP_ID, "biz_sn": "B1"})
        .as_object()
        .unwrap()
        .clone();
    attach_signature(&mut callback, SECRET.as_bytes(), Utc::now().timestamp() - 3600);

    let response = server
        .post(&format!("/callback/{APP_ID}"))
        .json(&Value::Object(callback))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_app_not_found() {
    let server = test_server(test_config());

    let response = server
        .post("/callback/99999")
        .json(&Value::Object(signed_callback()))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_disallowed_ip_forbidden() {
    let config = Config {
        security: SecurityConfig {
            allowed_ips: vec!["10.0.0.1".to_string()],
            trust_proxy_headers: false,
        },
        ..test_config()
    };
    let server = test_server(config);

    let response = server
        .post(&format!("/callback/{APP_ID}"))
        .json(&Value::Object(signed_callback()))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_metrics_count_outcomes() {
    let server = test_server(test_config());

    let _ = server.get("/health").await;
    let _ = server
        .post(&format!("/callback/{APP_ID}"))
        .json(&Value::Object(signed_callback()))
        .await;
    let mut tampered = signed_callback();
    tampered.insert("status".to_string(), json!("refunded"));
    let _ = server
        .post(&format!("/callback/{APP_ID}"))
        .json(&Value::Object(tampered))
        .await;

    let response = server.get("/metrics").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let metrics: MetricsResponse = response.json();
    assert_eq!(metrics.health_checks, 1);
    assert_eq!(metrics.callbacks_received, 2);
    assert_eq!(metrics.callbacks_accepted, 1);
    assert_eq!(metrics.callbacks_rejected, 1);
}

#[tokio::test]
async fn test_callbacks_are_audited() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("callbacks.log");
    let config = Config {
        audit: AuditConfig {
            enabled: true,
            log_path: log_path.to_str().unwrap().to_string(),
        },
        ..test_config()
    };
    let server = test_server(config);

    let _ = server
        .post(&format!("/callback/{APP_ID}"))
        .json(&Value::Object(signed_callback()))
        .await;

    let content = std::fs::read_to_string(&log_path).unwrap();
    let entry: Value = serde_json::from_str(content.lines().next().unwrap()).unwrap();
    assert_eq!(entry["app_id"], json!(APP_ID));
    assert_eq!(entry["accepted"], json!(true));
    assert_eq!(entry["source_ip"], json!("127.0.0.1"));
    assert!(entry["payload"].get("sign").is_none());
}
