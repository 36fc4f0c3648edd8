use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

use crate::constants::fields;
use crate::errors::TecmzError;

/// One line of the callback audit log
#[derive(Serialize, Debug)]
pub struct CallbackAuditEntry {
    timestamp: DateTime<Utc>,

    // Request info
    source_ip: String,
    app_id: String,

    // Payload without its signature
    payload: Map<String, Value>,

    // Result
    accepted: bool,
    reason: Option<String>,
    duration_ms: u64,
}

impl CallbackAuditEntry {
    pub fn from_callback(
        app_id: &str,
        callback: &Map<String, Value>,
        source_ip: &str,
        start_time: Instant,
    ) -> Self {
        let mut payload = callback.clone();
        payload.remove(fields::SIGN);

        Self {
            timestamp: Utc::now(),
            source_ip: source_ip.to_string(),
            app_id: app_id.to_string(),
            payload,
            accepted: false,
            reason: None,
            duration_ms: start_time.elapsed().as_millis() as u64,
        }
    }

    pub fn set_accepted(&mut self) {
        self.accepted = true;
        self.reason = None;
    }

    pub fn set_rejected(&mut self, reason: String) {
        self.accepted = false;
        self.reason = Some(reason);
    }

    pub fn update_duration(&mut self, start_time: Instant) {
        self.duration_ms = start_time.elapsed().as_millis() as u64;
    }
}

/// Append-only JSON-lines writer
pub struct AuditLogger {
    file: Arc<Mutex<File>>,
}

impl AuditLogger {
    pub fn new(log_path: &str) -> Result<Self, TecmzError> {
        let path = Path::new(log_path);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                TecmzError::Internal(format!("Failed to create audit log directory: {e}"))
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| TecmzError::Internal(format!("Failed to open audit log file: {e}")))?;

        Ok(Self {
            file: Arc::new(Mutex::new(file)),
        })
    }

    pub async fn log(&self, entry: &CallbackAuditEntry) -> Result<(), TecmzError> {
        let json = serde_json::to_string(entry)
            .map_err(|e| TecmzError::Internal(format!("Failed to serialize audit entry: {e}")))?;

        let mut file = self.file.lock().await;
        writeln!(file, "{json}")
            .map_err(|e| TecmzError::Internal(format!("Failed to write audit log: {e}")))?;
        file.flush()
            .map_err(|e| TecmzError::Internal(format!("Failed to flush audit log: {e}")))?;

        Ok(())
    }
}
