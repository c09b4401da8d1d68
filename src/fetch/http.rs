//! reqwest-backed fetcher

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use super::{FetchError, FetchOutcome, Fetcher};
use crate::config::{ApiConfig, AuthConfig, AuthKind};

#[derive(Debug, Error)]
pub enum HttpSetupError {
    #[error("Invalid header name '{0}'")]
    InvalidHeaderName(String),

    #[error("Invalid value for header '{0}'")]
    InvalidHeaderValue(String),

    #[error("{0} authentication is configured but credentials are missing")]
    MissingCredentials(&'static str),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            user_agent: format!("docfetch/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl From<&ApiConfig> for HttpConfig {
    fn from(api: &ApiConfig) -> Self {
        let request_timeout = api.request_timeout();
        Self {
            connect_timeout: request_timeout.min(Duration::from_secs(10)),
            request_timeout,
            user_agent: api.user_agent.clone(),
        }
    }
}

/// Issues one GET per call; auth and custom headers are fixed at construction
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    request_timeout: Duration,
}

impl HttpFetcher {
    pub fn new(config: HttpConfig, auth: &AuthConfig) -> Result<Self, HttpSetupError> {
        let headers = build_headers(auth)?;

        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self {
            client,
            request_timeout: config.request_timeout,
        })
    }

    pub fn from_config(api: &ApiConfig, auth: &AuthConfig) -> Result<Self, HttpSetupError> {
        Self::new(HttpConfig::from(api), auth)
    }

    async fn fetch_once(&self, url: &str) -> Result<bytes::Bytes, FetchError> {
        debug!(url, "Starting request");

        let response = self
            .client
            .get(url)
            .timeout(self.request_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            debug!(url, status = status.as_u16(), "Request rejected");
            return Err(FetchError::from_status(status.as_u16()));
        }

        let body = response.bytes().await?;
        debug!(url, size = body.len(), "Request completed");

        Ok(body)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        self.fetch_once(url).await
    }
}

fn build_headers(auth: &AuthConfig) -> Result<HeaderMap, HttpSetupError> {
    let mut headers = HeaderMap::new();

    for (name, value) in &auth.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| HttpSetupError::InvalidHeaderName(name.clone()))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|_| HttpSetupError::InvalidHeaderValue(name.clone()))?;
        headers.insert(header_name, header_value);
    }

    let authorization = match auth.kind {
        AuthKind::None => None,
        AuthKind::Bearer => {
            let token = auth
                .token
                .as_deref()
                .ok_or(HttpSetupError::MissingCredentials("Bearer"))?;
            Some(format!("Bearer {token}"))
        }
        AuthKind::Basic => {
            let (Some(username), Some(password)) = (&auth.username, &auth.password) else {
                return Err(HttpSetupError::MissingCredentials("Basic"));
            };
            let encoded = BASE64_STANDARD.encode(format!("{username}:{password}"));
            Some(format!("Basic {encoded}"))
        }
    };

    if let Some(value) = authorization {
        let mut value = HeaderValue::from_str(&value)
            .map_err(|_| HttpSetupError::InvalidHeaderValue(AUTHORIZATION.to_string()))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn auth(kind: AuthKind) -> AuthConfig {
        AuthConfig {
            kind,
            ..AuthConfig::default()
        }
    }

    #[test]
    fn test_http_config_defaults() {
        let config = HttpConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("docfetch/"));
    }

    #[test]
    fn test_http_config_from_api() {
        let api = ApiConfig {
            request_timeout_secs: 5,
            ..ApiConfig::default()
        };
        let config = HttpConfig::from(&api);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_bearer_header() {
        let mut auth = auth(AuthKind::Bearer);
        auth.token = Some("abc".to_string());

        let headers = build_headers(&auth).unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer abc");
        assert!(headers[AUTHORIZATION].is_sensitive());
    }

    #[test]
    fn test_basic_header() {
        let mut auth = auth(AuthKind::Basic);
        auth.username = Some("user".to_string());
        auth.password = Some("pass".to_string());

        let headers = build_headers(&auth).unwrap();
        assert_eq!(headers[AUTHORIZATION], "Basic dXNlcjpwYXNz");
    }

    #[test]
    fn test_custom_headers() {
        let mut auth = auth(AuthKind::None);
        auth.headers = BTreeMap::from([
            ("ApiIntegrationcode".to_string(), "CODE".to_string()),
            ("UserName".to_string(), "someone".to_string()),
        ]);

        let headers = build_headers(&auth).unwrap();
        assert_eq!(headers["apiintegrationcode"], "CODE");
        assert_eq!(headers["username"], "someone");
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_invalid_header_name() {
        let mut auth = auth(AuthKind::None);
        auth.headers = BTreeMap::from([("bad header".to_string(), "x".to_string())]);

        assert!(matches!(
            build_headers(&auth),
            Err(HttpSetupError::InvalidHeaderName(_))
        ));
    }

    #[test]
    fn test_missing_bearer_token() {
        assert!(matches!(
            build_headers(&auth(AuthKind::Bearer)),
            Err(HttpSetupError::MissingCredentials("Bearer"))
        ));
    }
}
