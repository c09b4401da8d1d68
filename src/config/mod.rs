//! Configuration management for docfetch
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use docfetch::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Writing files to: {}", config.download.download_folder.display());
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `DOCFETCH__<section>__<key>`
//!
//! Examples:
//! - `DOCFETCH__DOWNLOAD__MAX_WORKERS=8`
//! - `DOCFETCH__API__BASE_URL=https://api.example.com/files/`
//!
//! Credentials are only read from `DOCFETCH_API_TOKEN` and
//! `DOCFETCH_API_PASSWORD`, never from the file.
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/docfetch.toml`.
//! This can be overridden using the `DOCFETCH_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use models::{ApiConfig, AuthConfig, AuthKind, Config, DownloadConfig, InputConfig};
pub use validation::ValidationError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("Failed to render configuration: {0}")]
    RenderError(#[from] toml::ser::Error),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// # Errors
    ///
    /// Returns an error if the file is malformed or validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(sources::default_path())
    }

    /// Load configuration from a specific path, still honouring
    /// environment overrides and secrets
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Re-run validation after programmatic changes (CLI overrides)
    pub fn validate(&self) -> Result<(), ConfigError> {
        validation::validate(self)?;
        Ok(())
    }

    /// Effective configuration as TOML (secrets are never serialized)
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[api]
download_endpoint = "https://api.example.com/files/{id}"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = Config::load_from_path(config_path).unwrap();
        assert_eq!(
            config.api.url_for("42").as_deref(),
            Some("https://api.example.com/files/42")
        );
    }

    #[test]
    fn test_validation_catches_missing_endpoint() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        fs::write(&config_path, "[download]\nmax_workers = 2\n").unwrap();

        let result = Config::load_from_path(config_path);
        assert!(matches!(
            result,
            Err(ConfigError::ValidationError(ValidationError::MissingEndpoint))
        ));
    }

    #[test]
    fn test_malformed_file_is_load_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        fs::write(&config_path, "[download\nmax_workers = ").unwrap();

        let result = Config::load_from_path(config_path);
        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }

    #[test]
    fn test_to_toml_round_trips() {
        let mut config = Config::default();
        config.api.base_url = Some("https://api.example.com/files/".to_string());
        config.auth.token = Some("secret".to_string());

        let rendered = config.to_toml().unwrap();
        assert!(rendered.contains("base_url = \"https://api.example.com/files/\""));
        assert!(!rendered.contains("secret"));

        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.download.batch_size, config.download.batch_size);
    }

    #[test]
    fn test_shipped_sample_config_is_valid() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("config/docfetch.toml");

        let config = Config::load_from_path(path).unwrap();
        assert_eq!(config.auth.kind, AuthKind::None);
        assert!(config.api.url_for("42").is_some());
    }
}
