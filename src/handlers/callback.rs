use axum::{
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use serde_json::Value;
use std::net::SocketAddr;
use tracing::warn;

use super::types::CallbackPayload;
use crate::errors::TecmzError;
use crate::response::ApiResponse;
use crate::server::state::AppState;
use crate::services::CallbackService;
use crate::utils::{extract_real_ip, validate_ip_access};

/// Vendor callback endpoint
pub async fn receive_callback(
    State(state): State<AppState>,
    Path(app_id): Path<String>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    CallbackPayload(callback): CallbackPayload,
) -> (StatusCode, Json<ApiResponse<Value>>) {
    let real_ip = match validate_ip_access(&state.security, &headers, &addr) {
        Ok(ip) => ip,
        Err(status) => {
            warn!(
                "Rejected callback from unauthorized IP: {}",
                extract_real_ip(&headers, &addr, state.security.trust_proxy_headers())
            );
            let err = TecmzError::Unauthorized("IP not allowed".to_string());
            return (status, Json(ApiResponse::failure(err.client_message())));
        }
    };

    match CallbackService::accept(&state, &app_id, &callback, &real_ip.to_string()).await {
        Ok(()) => (StatusCode::OK, Json(ApiResponse::success(None))),
        Err(e) => {
            let status = match e {
                TecmzError::UnknownApp(_) => StatusCode::NOT_FOUND,
                TecmzError::Unauthorized(_) => StatusCode::FORBIDDEN,
                TecmzError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            let msg = match &e {
                // The vendor expects the rejection reason back
                TecmzError::Unauthorized(reason) => reason.clone(),
                other => other.client_message(),
            };
            (status, Json(ApiResponse::failure(msg)))
        }
    }
}
