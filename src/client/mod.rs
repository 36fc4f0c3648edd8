use chrono::Utc;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::constants::fields;
use crate::response::ApiResponse;
use crate::signature::{attach_signature, check_callback, CallbackRejection};

pub mod credentials;
pub mod delegated;
pub mod operations;
pub mod transport;


pub use credentials::ClientCredentials;
pub use operations::ImageQuality;
pub use transport::{ReqwestTransport, Transport};

/// Signed client for one app of the open API
pub struct TecmzClient {
    credentials: ClientCredentials,
    api_base: String,
    transport: Arc<dyn Transport>,
    debug: AtomicBool,
}

impl TecmzClient {
    pub fn new(
        credentials: ClientCredentials,
        api_base: impl Into<String>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            credentials,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            transport,
            debug: AtomicBool::new(false),
        }
    }

    pub fn app_id(&self) -> &str {
        self.credentials.app_id()
    }

    pub fn credentials(&self) -> &ClientCredentials {
        &self.credentials
    }

    /// Log every outgoing envelope at debug level
    pub fn set_debug(&self, debug: bool) {
        self.debug.store(debug, Ordering::Relaxed);
    }

    pub fn is_debug(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }

    /// Send a request envelope to `endpoint`.
    ///
    /// `app_id` is always injected; with a secret, `timestamp` and `sign` too.
    /// Never fails: transport and decoding problems come back as a
    /// failure envelope.
    pub async fn request(&self, endpoint: &str, mut params: Map<String, Value>) -> ApiResponse {
        params.insert(
            fields::APP_ID.to_string(),
            Value::String(self.credentials.app_id().to_string()),
        );
        if let Some(secret) = self.credentials.secret() {
            attach_signature(&mut params, secret.as_bytes(), Utc::now().timestamp());
        }

        let url = format!("{}{}", self.api_base, endpoint);
        let body = Value::Object(params);
        if self.is_debug() {
            debug!("TecmzApi -> {} -> {}", url, body);
        }

        self.post(&url, &body).await
    }

    /// Unsigned POST to an absolute URL, decoded as an envelope
    pub(crate) async fn post(&self, url: &str, body: &Value) -> ApiResponse {
        let raw = match self.transport.post_json(url, body).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Request to {} failed: {}", url, e);
                return e.into();
            }
        };

        match serde_json::from_value::<ApiResponse>(raw) {
            Ok(response) => {
                if response.is_error() {
                    debug!("{} answered code={} msg={}", url, response.code, response.msg);
                }
                response
            }
            Err(e) => {
                warn!("Malformed envelope from {}: {}", url, e);
                ApiResponse::failure(format!("Malformed response from {url}: {e}"))
            }
        }
    }

    /// Raw bytes at `url`
    pub(crate) async fn fetch(&self, url: &str) -> Result<Vec<u8>, crate::errors::TecmzError> {
        self.transport.get_raw(url).await
    }

    /// Validate an inbound signed callback, reporting why it was rejected
    pub fn check_signature(&self, callback: &Map<String, Value>) -> Result<(), CallbackRejection> {
        check_callback(
            callback,
            self.credentials.app_id(),
            self.credentials.secret().map(|s| s.as_bytes()),
            Utc::now().timestamp(),
        )
    }

    /// Accept or reject an inbound signed callback
    pub fn verify_signature(&self, callback: &Map<String, Value>) -> bool {
        self.check_signature(callback).is_ok()
    }
}

impl std::fmt::Debug for TecmzClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TecmzClient")
            .field("credentials", &self.credentials)
            .field("api_base", &self.api_base)
            .field("debug", &self.is_debug())
            .finish()
    }
}

/// Turn a `json!({...})` literal into request params
pub(crate) fn into_params(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
