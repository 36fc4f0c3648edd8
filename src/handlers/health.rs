use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use tracing::{debug, warn};

use super::types::HealthResponse;
use crate::server::state::AppState;
use crate::utils::{extract_real_ip, validate_ip_access};

/// Health check endpoint
pub async fn health_check(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<Json<HealthResponse>, StatusCode> {
    let real_ip = match validate_ip_access(&state.security, &headers, &addr) {
        Ok(ip) => ip,
        Err(status) => {
            warn!(
                "Rejected health check from unauthorized IP: {}",
                extract_real_ip(&headers, &addr, state.security.trust_proxy_headers())
            );
            return Err(status);
        }
    };

    state.metrics.health_checks.fetch_add(1, Ordering::Relaxed);
    debug!("Health check from {}", real_ip);

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        apps: state.registry.len(),
    }))
}
