use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use tracing::{info, warn};

use super::types::MetricsResponse;
use crate::server::state::AppState;
use crate::utils::{extract_real_ip, validate_ip_access};

/// Get metrics endpoint
pub async fn get_metrics(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<Json<MetricsResponse>, StatusCode> {
    let real_ip = match validate_ip_access(&state.security, &headers, &addr) {
        Ok(ip) => ip,
        Err(status) => {
            warn!(
                "Rejected metrics request from unauthorized IP: {}",
                extract_real_ip(&headers, &addr, state.security.trust_proxy_headers())
            );
            return Err(status);
        }
    };

    info!("Metrics requested from {}", real_ip);
    let metrics = &state.metrics;
    Ok(Json(MetricsResponse {
        callbacks_received: metrics.callbacks_received.load(Ordering::Relaxed),
        callbacks_accepted: metrics.callbacks_accepted.load(Ordering::Relaxed),
        callbacks_rejected: metrics.callbacks_rejected.load(Ordering::Relaxed),
        health_checks: metrics.health_checks.load(Ordering::Relaxed),
    }))
}
