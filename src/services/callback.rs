use serde_json::{Map, Value};
use std::sync::atomic::Ordering;
use std::time::Instant;
use tracing::{info, warn};

use crate::audit::CallbackAuditEntry;
use crate::errors::TecmzError;
use crate::server::state::AppState;

pub struct CallbackService;

impl CallbackService {
    /// Verify a vendor callback for `app_id` and record the outcome.
    ///
    /// Unknown apps are `UnknownApp`; failed verification is `Unauthorized`
    /// carrying the rejection reason.
    pub async fn accept(
        state: &AppState,
        app_id: &str,
        callback: &Map<String, Value>,
        real_ip: &str,
    ) -> Result<(), TecmzError> {
        let start_time = Instant::now();
        state.metrics.callbacks_received.fetch_add(1, Ordering::Relaxed);

        let mut audit_entry = state
            .audit_logger
            .as_ref()
            .map(|_| CallbackAuditEntry::from_callback(app_id, callback, real_ip, start_time));

        let outcome = match state.registry.get(app_id) {
            Some(client) => client
                .check_signature(callback)
                .map_err(|rejection| TecmzError::Unauthorized(rejection.to_string())),
            None => Err(TecmzError::UnknownApp(app_id.to_string())),
        };

        match &outcome {
            Ok(()) => {
                state.metrics.callbacks_accepted.fetch_add(1, Ordering::Relaxed);
                info!("Accepted callback for app {} from {}", app_id, real_ip);
                if let Some(audit) = &mut audit_entry {
                    audit.set_accepted();
                }
            }
            Err(e) => {
                state.metrics.callbacks_rejected.fetch_add(1, Ordering::Relaxed);
                warn!(
                    "Rejected callback for app {} from {}: {}",
                    app_id,
                    real_ip,
                    e.operator_message()
                );
                if let Some(audit) = &mut audit_entry {
                    audit.set_rejected(e.to_string());
                }
            }
        }

        if let (Some(audit), Some(logger)) = (&mut audit_entry, &state.audit_logger) {
            audit.update_duration(start_time);
            if let Err(e) = logger.log(audit).await {
                warn!("Failed to write audit entry: {}", e);
            }
        }

        outcome
    }
}
