use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub download: DownloadConfig,
    #[serde(default)]
    pub input: InputConfig,
}

/// Remote API shape and endpoints
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Prefix the id is appended to (`GET {base_url}{id}`)
    pub base_url: Option<String>,
    /// Template with an `{id}` placeholder; takes precedence over `base_url`
    pub download_endpoint: Option<String>,
    /// Endpoint returning the id list when no ids are supplied
    pub list_endpoint: Option<String>,
    /// Path to the array inside the list response
    #[serde(default = "default_list_path")]
    pub list_path: String,
    #[serde(default = "default_id_field")]
    pub id_field: String,
    /// Path to the item object inside a download response ("" = root)
    #[serde(default = "default_item_path")]
    pub item_path: String,
    #[serde(default = "default_content_field")]
    pub content_field: String,
    #[serde(default = "default_filename_field")]
    pub filename_field: String,
    #[serde(default = "default_fallback_filename_field")]
    pub fallback_filename_field: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            download_endpoint: None,
            list_endpoint: None,
            list_path: default_list_path(),
            id_field: default_id_field(),
            item_path: default_item_path(),
            content_field: default_content_field(),
            filename_field: default_filename_field(),
            fallback_filename_field: default_fallback_filename_field(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Resolve the download URL for one id
    pub fn url_for(&self, id: &str) -> Option<String> {
        if let Some(template) = &self.download_endpoint {
            return Some(template.replace("{id}", id));
        }
        self.base_url.as_ref().map(|base| format!("{base}{id}"))
    }
}

fn default_list_path() -> String {
    "items".to_string()
}

fn default_id_field() -> String {
    "id".to_string()
}

fn default_item_path() -> String {
    "items[0]".to_string()
}

fn default_content_field() -> String {
    "data".to_string()
}

fn default_filename_field() -> String {
    "fullPath".to_string()
}

fn default_fallback_filename_field() -> Option<String> {
    Some("fileName".to_string())
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("docfetch/{}", env!("CARGO_PKG_VERSION"))
}

/// Authentication scheme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthKind {
    #[default]
    None,
    Bearer,
    Basic,
}

/// Request authentication and extra headers
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub kind: AuthKind,
    pub username: Option<String>,
    /// Bearer token (loaded from environment, not from config file)
    #[serde(skip)]
    pub token: Option<String>,
    /// Basic auth password (loaded from environment, not from config file)
    #[serde(skip)]
    pub password: Option<String>,
    /// Sent verbatim with every request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// Batch execution knobs
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadConfig {
    #[serde(default = "default_download_folder")]
    pub download_folder: PathBuf,
    #[serde(default = "default_log_folder")]
    pub log_folder: PathBuf,
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Seconds to pause between batches
    #[serde(default = "default_delay_between_batches")]
    pub delay_between_batches: f64,
    #[serde(default = "default_retry_on_failure")]
    pub retry_on_failure: bool,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_resume")]
    pub resume: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_folder: default_download_folder(),
            log_folder: default_log_folder(),
            max_workers: default_max_workers(),
            batch_size: default_batch_size(),
            delay_between_batches: default_delay_between_batches(),
            retry_on_failure: default_retry_on_failure(),
            max_retries: default_max_retries(),
            resume: default_resume(),
        }
    }
}

fn default_download_folder() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_log_folder() -> PathBuf {
    PathBuf::from("logs")
}

fn default_max_workers() -> usize {
    5
}

fn default_batch_size() -> usize {
    20
}

fn default_delay_between_batches() -> f64 {
    1.0
}

fn default_retry_on_failure() -> bool {
    true
}

fn default_max_retries() -> u32 {
    3
}

fn default_resume() -> bool {
    true
}

/// CSV input defaults
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputConfig {
    #[serde(default = "default_csv_column")]
    pub csv_column: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            csv_column: default_csv_column(),
        }
    }
}

fn default_csv_column() -> String {
    "ATTACHMENTID".to_string()
}
