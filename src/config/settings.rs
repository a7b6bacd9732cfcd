//! Application settings loaded from config.toml
//!
//! Every section and field is optional; anything missing falls back to a default so
//! the bot can start without a config file. Database URLs can additionally be
//! overridden from the environment (see [`crate::config::database`]).

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    /// Where data is kept
    #[serde(default)]
    pub storage: StorageSettings,
    /// How amounts are shown
    #[serde(default)]
    pub display: DisplaySettings,
}

/// `[storage]` section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageSettings {
    /// URL of the device-local database
    pub local_database_url: Option<String>,
    /// URL of the remote document database
    pub remote_database_url: Option<String>,
}

/// `[display]` section
#[derive(Debug, Clone, Deserialize)]
pub struct DisplaySettings {
    /// Currency code printed in front of amounts
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "UAH".to_string()
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            currency: default_currency(),
        }
    }
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads settings from ./config.toml, or defaults when the file does not exist.
pub fn load_default_settings() -> Result<Settings> {
    let path = Path::new("config.toml");
    if !path.exists() {
        tracing::info!("No config.toml found, using default settings");
        return Ok(Settings::default());
    }
    load_settings(path)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_full_settings() {
        let toml_str = r#"
            [storage]
            local_database_url = "sqlite://local.sqlite?mode=rwc"
            remote_database_url = "sqlite://remote.sqlite?mode=rwc"

            [display]
            currency = "EUR"
        "#;

        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(
            settings.storage.local_database_url.as_deref(),
            Some("sqlite://local.sqlite?mode=rwc")
        );
        assert_eq!(
            settings.storage.remote_database_url.as_deref(),
            Some("sqlite://remote.sqlite?mode=rwc")
        );
        assert_eq!(settings.display.currency, "EUR");
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert!(settings.storage.local_database_url.is_none());
        assert_eq!(settings.display.currency, "UAH");

        let settings: Settings = toml::from_str("[display]\n").unwrap();
        assert_eq!(settings.display.currency, "UAH");
    }

    #[test]
    fn test_load_settings_reports_missing_file() {
        let result = load_settings("definitely/not/here.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
