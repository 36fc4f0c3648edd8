use anyhow::Result;
use std::fs;

use super::types::*;
use crate::cli::{GlobalArgs, ServeArgs};
use crate::errors::TecmzError;
use crate::utils::get_secret_securely;

impl Config {
    /// Load configuration from an optional TOML file, then apply CLI overrides
    pub fn load(args: &GlobalArgs, serve: Option<&ServeArgs>) -> Result<Self> {
        let file_config = match &args.config {
            Some(path) => Self::load_from_file(path)?,
            None => Config::default(),
        };

        let app_secret = if args.prompt_secret {
            Some(get_secret_securely(args.app_secret.clone(), "Enter app secret: ")?)
        } else {
            args.app_secret.clone()
        };

        Ok(Self::merge_configurations(file_config, args, app_secret, serve))
    }

    /// Log level to start with: `--log-level`/`RUST_LOG`, then `[logging] level`
    /// from the config file, then the default. Needs no secret prompt.
    pub fn log_level(args: &GlobalArgs) -> String {
        if let Some(level) = &args.log_level {
            return level.clone();
        }
        args.config
            .as_deref()
            .and_then(|path| Self::load_from_file(path).ok())
            .map(|config| config.logging.level)
            .unwrap_or_else(|| LoggingConfig::default().level)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(config_path: &str) -> Result<Self, TecmzError> {
        let config_content = fs::read_to_string(config_path).map_err(|e| {
            TecmzError::Config(format!("Failed to read config file {config_path}: {e}"))
        })?;

        toml::from_str(&config_content)
            .map_err(|e| TecmzError::Config(format!("Failed to parse config file: {e}")))
    }

    /// Explicit CLI values win over the file, the file wins over defaults
    fn merge_configurations(
        mut config: Self,
        args: &GlobalArgs,
        app_secret: Option<String>,
        serve: Option<&ServeArgs>,
    ) -> Self {
        if let Some(base_url) = &args.api_base {
            config.api.base_url = base_url.clone();
        }
        if args.debug {
            config.api.debug = true;
        }
        if let Some(level) = &args.log_level {
            config.logging.level = level.clone();
        }

        if let Some(app_id) = &args.app_id {
            let app = AppConfig {
                app_id: app_id.clone(),
                app_secret,
            };
            match config.apps.iter_mut().find(|a| a.app_id == *app_id) {
                Some(existing) => {
                    if app.app_secret.is_some() {
                        existing.app_secret = app.app_secret;
                    }
                }
                None => config.apps.insert(0, app),
            }
        }

        if let Some(serve) = serve {
            if let Some(address) = &serve.address {
                config.server.address = address.clone();
            }
            if let Some(port) = serve.port {
                config.server.port = port;
            }
        }

        config
    }

    /// App to use for outbound calls: the named one, or the first configured
    pub fn select_app(&self, app_id: Option<&str>) -> Result<&AppConfig, TecmzError> {
        match app_id {
            Some(id) => self
                .apps
                .iter()
                .find(|a| a.app_id == id)
                .ok_or_else(|| TecmzError::Config(format!("Unknown app_id: {id}"))),
            None => self.apps.first().ok_or_else(|| {
                TecmzError::Config(
                    "No app configured (use --app-id or an [[apps]] entry)".to_string(),
                )
            }),
        }
    }
}
