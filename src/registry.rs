use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

use crate::client::{ClientCredentials, ReqwestTransport, TecmzClient, Transport};
use crate::config::ApiConfig;
use crate::errors::TecmzError;

/// Per-`app_id` cache of clients sharing one transport.
///
/// The first `instance` call for an `app_id` decides its secret for the
/// lifetime of the registry; later calls get the cached client even when
/// they pass a different secret.
pub struct ClientRegistry {
    api_base: String,
    debug: bool,
    transport: Arc<dyn Transport>,
    clients: Mutex<HashMap<String, Arc<TecmzClient>>>,
}

impl ClientRegistry {
    pub fn new(api_base: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            api_base: api_base.into(),
            debug: false,
            transport,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Registry over a reqwest transport, preloaded with nothing
    pub fn from_config(api: &ApiConfig) -> Result<Self, TecmzError> {
        let transport = ReqwestTransport::new(Duration::from_secs(api.timeout_secs))?;
        let mut registry = Self::new(api.base_url.clone(), Arc::new(transport));
        registry.debug = api.debug;
        Ok(registry)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<TecmzClient>>> {
        // The map is insert-only, so a poisoned lock still holds consistent data
        self.clients.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Cached client for `app_id`, created on first use
    pub fn instance(&self, app_id: &str, app_secret: Option<&str>) -> Arc<TecmzClient> {
        let mut clients = self.lock();

        if let Some(client) = clients.get(app_id) {
            if !client.credentials().secret_matches(app_secret) {
                warn!(
                    "Client for app_id {} already exists; ignoring the different secret",
                    app_id
                );
            }
            return Arc::clone(client);
        }

        let credentials = ClientCredentials::new(app_id, app_secret);
        debug!(
            "Creating client for app_id {} (signed: {})",
            app_id,
            credentials.is_signed()
        );
        let client = TecmzClient::new(
            credentials,
            self.api_base.clone(),
            Arc::clone(&self.transport),
        );
        client.set_debug(self.debug);

        let client = Arc::new(client);
        clients.insert(app_id.to_string(), Arc::clone(&client));
        client
    }

    /// Already-created client, if any
    pub fn get(&self, app_id: &str) -> Option<Arc<TecmzClient>> {
        self.lock().get(app_id).cloned()
    }

    pub fn app_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.lock().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::RecordingTransport;

    fn registry() -> ClientRegistry {
        ClientRegistry::new("https://api.example/open_api", Arc::new(RecordingTransport::default()))
    }

    #[test]
    fn test_same_app_id_returns_same_handle() {
        let registry = registry();

        let first = registry.instance("X", Some("secretA"));
        let second = registry.instance("X", Some("secretB"));

        assert!(Arc::ptr_eq(&first, &second));
        // The second secret is ignored
        assert!(second.credentials().secret_matches(Some("secretA")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_distinct_app_ids() {
        let registry = registry();

        let a = registry.instance("A", Some("s"));
        let b = registry.instance("B", None);

        assert!(!Arc::ptr_eq(&a, &b));
        assert!(a.credentials().is_signed());
        assert!(!b.credentials().is_signed());
        assert_eq!(registry.app_ids(), vec!["A".to_string(), "B".to_string()]);
        assert!(registry.get("A").is_some());
        assert!(registry.get("C").is_none());
    }

    #[test]
    fn test_registries_are_isolated() {
        let one = registry();
        let two = registry();

        let a = one.instance("X", Some("secretA"));
        let b = two.instance("X", Some("secretB"));

        assert!(!Arc::ptr_eq(&a, &b));
        assert!(b.credentials().secret_matches(Some("secretB")));
    }

    #[test]
    fn test_concurrent_first_construction_yields_one_instance() {
        let registry = Arc::new(registry());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.instance("X", Some(&format!("secret{i}"))))
            })
            .collect();

        let clients: Vec<Arc<TecmzClient>> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(clients.iter().all(|c| Arc::ptr_eq(c, &clients[0])));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_from_config_applies_debug() {
        let api = ApiConfig {
            base_url: "https://api.example/open_api".to_string(),
            timeout_secs: 5,
            debug: true,
        };
        let registry = ClientRegistry::from_config(&api).unwrap();
        assert!(registry.instance("X", None).is_debug());
    }
}
