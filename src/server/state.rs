use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use tracing::info;

use crate::audit::AuditLogger;
use crate::config::Config;
use crate::errors::TecmzError;
use crate::registry::ClientRegistry;
use crate::security::SecurityValidator;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub registry: Arc<ClientRegistry>,
    pub metrics: Arc<Metrics>,
    pub security: SecurityValidator,
    pub audit_logger: Option<Arc<AuditLogger>>,
}

/// Basic metrics for monitoring
#[derive(Default)]
pub struct Metrics {
    pub callbacks_received: AtomicU64,
    pub callbacks_accepted: AtomicU64,
    pub callbacks_rejected: AtomicU64,
    pub health_checks: AtomicU64,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, TecmzError> {
        let registry = ClientRegistry::from_config(&config.api)?;
        Self::with_registry(config, Arc::new(registry))
    }

    /// State over an existing registry; every configured app is registered up front
    pub fn with_registry(config: Config, registry: Arc<ClientRegistry>) -> Result<Self, TecmzError> {
        for app in &config.apps {
            registry.instance(&app.app_id, app.app_secret.as_deref());
        }
        info!("Accepting callbacks for {} app(s)", registry.len());

        let security = SecurityValidator::from_config(&config.security)?;

        let audit_logger = if config.audit.enabled {
            Some(Arc::new(AuditLogger::new(&config.audit.log_path)?))
        } else {
            None
        };

        Ok(Self {
            config,
            registry,
            metrics: Arc::new(Metrics::default()),
            security,
            audit_logger,
        })
    }
}
