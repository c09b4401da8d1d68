use super::models::{AuthKind, Config};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("No download endpoint configured (set api.base_url or api.download_endpoint)")]
    MissingEndpoint,

    #[error("api.download_endpoint '{0}' has no {{id}} placeholder")]
    MissingIdPlaceholder(String),

    #[error("{field} must be positive")]
    NotPositive { field: &'static str },

    #[error("download.delay_between_batches must be a finite, non-negative number of seconds, got {0}")]
    InvalidDelay(f64),

    #[error("Bearer authentication requires DOCFETCH_API_TOKEN")]
    MissingToken,

    #[error("Basic authentication requires auth.username and DOCFETCH_API_PASSWORD")]
    MissingBasicCredentials,

    #[error("api.{field} must not be empty")]
    EmptyField { field: &'static str },
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_endpoints(config)?;
    validate_fields(config)?;
    validate_download(config)?;
    validate_auth(config)?;
    Ok(())
}

fn validate_endpoints(config: &Config) -> Result<(), ValidationError> {
    match (&config.api.download_endpoint, &config.api.base_url) {
        (Some(template), _) if !template.contains("{id}") => {
            Err(ValidationError::MissingIdPlaceholder(template.clone()))
        }
        (None, None) => Err(ValidationError::MissingEndpoint),
        _ => Ok(()),
    }
}

fn validate_fields(config: &Config) -> Result<(), ValidationError> {
    if config.api.content_field.trim().is_empty() {
        return Err(ValidationError::EmptyField {
            field: "content_field",
        });
    }
    if config.api.id_field.trim().is_empty() {
        return Err(ValidationError::EmptyField { field: "id_field" });
    }
    if config.api.request_timeout_secs == 0 {
        return Err(ValidationError::NotPositive {
            field: "api.request_timeout_secs",
        });
    }
    Ok(())
}

fn validate_download(config: &Config) -> Result<(), ValidationError> {
    let download = &config.download;

    if download.max_workers == 0 {
        return Err(ValidationError::NotPositive {
            field: "download.max_workers",
        });
    }

    if download.batch_size == 0 {
        return Err(ValidationError::NotPositive {
            field: "download.batch_size",
        });
    }

    let delay = download.delay_between_batches;
    if !delay.is_finite() || delay < 0.0 {
        return Err(ValidationError::InvalidDelay(delay));
    }

    Ok(())
}

fn validate_auth(config: &Config) -> Result<(), ValidationError> {
    let auth = &config.auth;

    match auth.kind {
        AuthKind::None => Ok(()),
        AuthKind::Bearer if auth.token.is_none() => Err(ValidationError::MissingToken),
        AuthKind::Basic if auth.username.is_none() || auth.password.is_none() => {
            Err(ValidationError::MissingBasicCredentials)
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::super::models::*;
    use super::*;

    fn create_test_config() -> Config {
        let mut config = Config::default();
        config.api.base_url = Some("https://api.example.com/files/".to_string());
        config
    }

    #[test]
    fn test_valid_config() {
        let config = create_test_config();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_missing_endpoint() {
        let mut config = create_test_config();
        config.api.base_url = None;

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::MissingEndpoint)));
    }

    #[test]
    fn test_template_without_placeholder() {
        let mut config = create_test_config();
        config.api.download_endpoint = Some("https://api.example.com/files".to_string());

        let result = validate(&config);
        assert!(matches!(
            result,
            Err(ValidationError::MissingIdPlaceholder(_))
        ));
    }

    #[test]
    fn test_zero_workers() {
        let mut config = create_test_config();
        config.download.max_workers = 0;

        let result = validate(&config);
        assert!(matches!(
            result,
            Err(ValidationError::NotPositive {
                field: "download.max_workers"
            })
        ));
    }

    #[test]
    fn test_zero_batch_size() {
        let mut config = create_test_config();
        config.download.batch_size = 0;

        assert!(matches!(
            validate(&config),
            Err(ValidationError::NotPositive { .. })
        ));
    }

    #[test]
    fn test_negative_delay() {
        let mut config = create_test_config();
        config.download.delay_between_batches = -1.0;

        assert!(matches!(
            validate(&config),
            Err(ValidationError::InvalidDelay(_))
        ));

        config.download.delay_between_batches = f64::NAN;
        assert!(matches!(
            validate(&config),
            Err(ValidationError::InvalidDelay(_))
        ));
    }

    #[test]
    fn test_bearer_requires_token() {
        let mut config = create_test_config();
        config.auth.kind = AuthKind::Bearer;

        assert!(matches!(validate(&config), Err(ValidationError::MissingToken)));

        config.auth.token = Some("secret".to_string());
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_basic_requires_credentials() {
        let mut config = create_test_config();
        config.auth.kind = AuthKind::Basic;
        config.auth.username = Some("user".to_string());

        assert!(matches!(
            validate(&config),
            Err(ValidationError::MissingBasicCredentials)
        ));

        config.auth.password = Some("pass".to_string());
        assert!(validate(&config).is_ok());
    }
}
