use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::config::Config;
use crate::errors::TecmzError;
use crate::handlers::{get_metrics, health_check, receive_callback};
use crate::middleware::security_headers_middleware;
use crate::registry::ClientRegistry;

pub mod state;
pub use state::{AppState, Metrics};

#[cfg(test)]
mod tests;

/// HTTP server receiving vendor callbacks
pub struct Server {
    config: Config,
    app_state: AppState,
}

impl Server {
    pub fn new(config: Config) -> Result<Self, TecmzError> {
        let app_state = AppState::new(config.clone())?;
        Ok(Self { config, app_state })
    }

    /// Server over a caller-provided registry
    pub fn with_registry(config: Config, registry: Arc<ClientRegistry>) -> Result<Self, TecmzError> {
        let app_state = AppState::with_registry(config.clone(), registry)?;
        Ok(Self { config, app_state })
    }

    pub async fn serve(self) -> Result<(), TecmzError> {
        let app = self.create_router();

        let addr = SocketAddr::new(
            self.config
                .server
                .address
                .parse()
                .map_err(|e| TecmzError::Config(format!("Invalid bind address: {e}")))?,
            self.config.server.port,
        );

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| TecmzError::Internal(format!("Failed to bind to {addr}: {e}")))?;

        info!("Callback server listening on {}", addr);

        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| TecmzError::Internal(format!("Server error: {e}")))?;

        info!("Callback server stopped");
        Ok(())
    }

    pub fn create_router(&self) -> Router {
        Router::new()
            .route("/health", get(health_check))
            .route("/metrics", get(get_metrics))
            .route("/callback/{app_id}", post(receive_callback))
            .with_state(self.app_state.clone())
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(CorsLayer::permissive())
                    .layer(axum::middleware::from_fn(security_headers_middleware)),
            )
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
