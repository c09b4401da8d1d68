use super::models::Config;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "DOCFETCH_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/docfetch.toml";
const ENV_PREFIX: &str = "DOCFETCH";
const ENV_SEPARATOR: &str = "__";

const TOKEN_ENV_VAR: &str = "DOCFETCH_API_TOKEN";
const PASSWORD_ENV_VAR: &str = "DOCFETCH_API_PASSWORD";

/// Path used when no explicit config file is given
pub fn default_path() -> PathBuf {
    env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
pub fn load(config_path: PathBuf) -> Result<Config, ConfigError> {
    // Missing .env is fine
    let _ = dotenvy::dotenv();

    let mut config = load_from_sources(config_path)?;
    load_secrets(&mut config);

    Ok(config)
}

/// Secrets are never stored in TOML files, only in environment
fn load_secrets(config: &mut Config) {
    if let Ok(token) = env::var(TOKEN_ENV_VAR) {
        config.auth.token = Some(token);
    }
    if let Ok(password) = env::var(PASSWORD_ENV_VAR) {
        config.auth.password = Some(password);
    }
}

/// Load configuration from a specific path and environment
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::warn!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    // DOCFETCH__DOWNLOAD__MAX_WORKERS -> download.max_workers
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    let config = builder.build()?;
    config.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthKind;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_defaults_only() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.download.max_workers, 5);
        assert_eq!(config.input.csv_column, "ATTACHMENTID");
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[api]
base_url = "https://api.example.com/files/"
item_path = ""
content_field = "content"
filename_field = "filename"
request_timeout_secs = 10

[auth]
kind = "bearer"

[auth.headers]
x-api-key = "CODE"

[download]
download_folder = "pdfs"
max_workers = 3
batch_size = 10
delay_between_batches = 2.5
resume = false
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.api.base_url.as_deref(), Some("https://api.example.com/files/"));
        assert_eq!(config.api.item_path, "");
        assert_eq!(config.api.content_field, "content");
        assert_eq!(config.api.request_timeout_secs, 10);
        assert_eq!(config.auth.kind, AuthKind::Bearer);
        assert_eq!(config.auth.headers["x-api-key"], "CODE");
        assert!(config.auth.token.is_none());
        assert_eq!(config.download.download_folder, PathBuf::from("pdfs"));
        assert_eq!(config.download.max_workers, 3);
        assert_eq!(config.download.delay_between_batches, 2.5);
        assert!(!config.download.resume);
        // Untouched keys keep their defaults
        assert_eq!(config.download.max_retries, 3);
    }

    #[test]
    fn test_token_in_toml_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        fs::write(
            &config_path,
            "[auth]\nkind = \"bearer\"\ntoken = \"leaked\"\n",
        )
        .unwrap();

        let config = load_from_sources(config_path).unwrap();
        assert!(config.auth.token.is_none());
    }
}
