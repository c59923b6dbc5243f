//! Application settings.
//!
//! Settings come from an optional TOML file (`sdg.toml` by default, or the path in
//! `SDG_CONFIG`) and can be overridden by environment variables, which is how the
//! service is usually configured in deployment. Every field has a default so a bare
//! checkout starts without any configuration at all.

use crate::config::database::DEFAULT_DATABASE_URL;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Default settings file looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "sdg.toml";

/// Top-level application settings
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// `SeaORM` connection string
    pub database_url: String,
    /// Address the HTTP server binds to
    pub bind_address: String,
    /// `tracing` filter directive used when `RUST_LOG` is not set
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            bind_address: "127.0.0.1:5000".to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Applies `DATABASE_URL` and `BIND_ADDRESS` overrides from the environment.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database_url = url;
        }
        if let Ok(addr) = std::env::var("BIND_ADDRESS") {
            self.bind_address = addr;
        }
        self
    }
}

/// Parses settings from a TOML string.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse settings: {e}"),
    })
}

/// Loads settings from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or is not valid TOML.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load settings from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read settings file {}: {e}", path_ref.display()),
    })?;
    parse_config(&contents)
}

/// Loads the application configuration used by the binary.
///
/// A missing settings file is not an error; defaults are used instead.
/// Environment overrides are applied last.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var("SDG_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = if Path::new(&path).exists() {
        info!("Loading settings from {}", path);
        load_config(&path)?
    } else {
        info!("No settings file at {}, using defaults", path);
        AppConfig::default()
    };
    Ok(config.with_env_overrides())
}
