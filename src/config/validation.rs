use std::collections::HashSet;
use std::net::IpAddr;
use tracing::warn;

use super::types::Config;
use crate::errors::TecmzError;

impl Config {
    /// Validate the configuration settings
    pub fn validate(&self) -> Result<(), TecmzError> {
        self.validate_api()?;
        self.validate_apps()?;
        self.validate_server()?;
        self.validate_security()?;
        self.validate_audit()?;

        Ok(())
    }

    fn validate_api(&self) -> Result<(), TecmzError> {
        let base_url = &self.api.base_url;
        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            return Err(TecmzError::Config(format!(
                "API base URL must be http(s): {base_url}"
            )));
        }
        if base_url.starts_with("http://") {
            warn!("⚠️  API base URL is not HTTPS: {}", base_url);
        }

        if self.api.timeout_secs == 0 {
            return Err(TecmzError::Config(
                "API timeout must be at least 1 second".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_apps(&self) -> Result<(), TecmzError> {
        let mut seen = HashSet::new();
        for app in &self.apps {
            if app.app_id.trim().is_empty() {
                return Err(TecmzError::Config("app_id cannot be empty".to_string()));
            }
            if !seen.insert(app.app_id.as_str()) {
                return Err(TecmzError::Config(format!(
                    "Duplicate app_id in configuration: {}",
                    app.app_id
                )));
            }
            if app.app_secret.as_deref().map_or(true, str::is_empty) {
                warn!(
                    "⚠️  App {} has no secret: requests go out unsigned and its callbacks are rejected",
                    app.app_id
                );
            }
        }

        Ok(())
    }

    fn validate_server(&self) -> Result<(), TecmzError> {
        if self.server.port == 0 {
            return Err(TecmzError::Config(
                "Invalid port number: must be between 1 and 65535".to_string(),
            ));
        }

        self.server
            .address
            .parse::<IpAddr>()
            .map_err(|e| TecmzError::Config(format!("Invalid bind address: {e}")))?;

        Ok(())
    }

    fn validate_security(&self) -> Result<(), TecmzError> {
        for ip in &self.security.allowed_ips {
            ip.parse::<IpAddr>()
                .map_err(|_| TecmzError::Config(format!("Invalid IP address: {ip}")))?;
        }

        if self.server.address == "0.0.0.0" && self.security.allowed_ips.is_empty() {
            warn!("⚠️  SECURITY WARNING: Callback server binding to 0.0.0.0 without an IP allow-list");
            warn!("⚠️  Signatures are still verified, but any host can reach the endpoint");
        }

        Ok(())
    }

    fn validate_audit(&self) -> Result<(), TecmzError> {
        if self.audit.enabled && self.audit.log_path.trim().is_empty() {
            return Err(TecmzError::Config(
                "Audit log path is required when audit logging is enabled".to_string(),
            ));
        }

        Ok(())
    }
}
