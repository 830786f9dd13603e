//! Application settings loaded from `config.toml`.
//!
//! The file is optional. When it is missing every setting takes its default,
//! and `DATABASE_URL` from the environment (or `.env`) wins over the file.

use crate::config::database::DEFAULT_DATABASE_URL;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    /// `SeaORM` connection URL of the ledger database
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

fn default_database_url() -> String {
    DEFAULT_DATABASE_URL.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
        }
    }
}

impl AppConfig {
    /// Replaces the database URL when an override is present.
    #[must_use]
    pub fn with_database_override(mut self, database_url: Option<String>) -> Self {
        if let Some(url) = database_url.filter(|url| !url.trim().is_empty()) {
            self.database_url = url;
        }
        self
    }
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path_ref:?}: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse TOML from config file {path_ref:?}: {e}"),
    })
}

/// Loads `config.toml` if present, falls back to defaults, then applies the
/// `DATABASE_URL` environment override.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = Path::new(DEFAULT_CONFIG_PATH);
    let config = if path.exists() {
        load_config(path)?
    } else {
        tracing::info!("No {DEFAULT_CONFIG_PATH} found, using defaults.");
        AppConfig::default()
    };

    Ok(config.with_database_override(std::env::var("DATABASE_URL").ok()))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_app_config() {
        let config: AppConfig =
            toml::from_str(r#"database_url = "sqlite://ledger.sqlite?mode=rwc""#).unwrap();
        assert_eq!(config.database_url, "sqlite://ledger.sqlite?mode=rwc");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
    }

    #[test]
    fn test_database_override() {
        let config = AppConfig::default().with_database_override(Some("sqlite::memory:".into()));
        assert_eq!(config.database_url, "sqlite::memory:");

        // Blank overrides are ignored
        let config = AppConfig::default().with_database_override(Some("  ".into()));
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);

        let config = AppConfig::default().with_database_override(None);
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"database_url = "sqlite::memory:""#).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "database_url = ").unwrap();

        let result = load_config(file.path());
        assert!(matches!(result, Err(Error::Config { message: _ })));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("does/not/exist.toml");
        assert!(matches!(result, Err(Error::Config { message: _ })));
    }
}
