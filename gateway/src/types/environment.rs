//! Environment configuration for different deployment stages

use std::env;
use std::time::Duration;

use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion};
use thiserror::Error;

use super::expiration::{parse_expiration, ExpirationError};

/// Default lifetime of a presigned URL
pub const DEFAULT_PRESIGNED_URL_EXPIRATION: Duration = Duration::from_secs(15 * 60);

const DEFAULT_PORT: u16 = 8080;

/// Invalid process configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// `APP_ENV` holds an unknown stage
    #[error("Invalid environment: {0}")]
    InvalidEnvironment(String),

    /// `PORT` is not a valid port number
    #[error("Invalid PORT {0:?}")]
    InvalidPort(String),

    /// `PRESIGNED_URL_EXPIRATION` is not a positive duration
    #[error("Invalid PRESIGNED_URL_EXPIRATION: {0}")]
    InvalidExpiration(#[from] ExpirationError),
}

/// Application environment configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (uses a local S3-compatible server)
    Development,
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvironment` if `APP_ENV` contains an invalid value
    pub fn from_env() -> Result<Self, ConfigError> {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            _ => Err(ConfigError::InvalidEnvironment(env)),
        }
    }

    /// Whether logs should be emitted as JSON
    #[must_use]
    pub const fn json_logs(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }

    /// Port the HTTP server binds to, from `PORT`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidPort` if `PORT` is not a number
    pub fn port(&self) -> Result<u16, ConfigError> {
        env::var("PORT").map_or(Ok(DEFAULT_PORT), |port| {
            port.trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port))
        })
    }

    /// Shared secret required in the `Authorization` header, from `API_KEY`
    ///
    /// An empty value disables authorization.
    #[must_use]
    pub fn api_key(&self) -> String {
        env::var("API_KEY").unwrap_or_default()
    }

    /// Default presigned URL expiration, from `PRESIGNED_URL_EXPIRATION`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidExpiration` if the value is not a positive duration
    pub fn presigned_url_expiration(&self) -> Result<Duration, ConfigError> {
        let raw = env::var("PRESIGNED_URL_EXPIRATION").ok();
        Ok(parse_expiration(
            raw.as_deref().map(str::trim),
            DEFAULT_PRESIGNED_URL_EXPIRATION,
        )?)
    }

    /// Returns the endpoint URL to use for S3
    #[must_use]
    pub fn override_s3_endpoint_url(&self) -> Option<String> {
        let configured = env::var("S3_ENDPOINT_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        match self {
            // Regular AWS endpoints unless explicitly overridden
            Self::Production | Self::Staging => configured,
            // Local S3-compatible server for development
            Self::Development => {
                configured.or_else(|| Some("http://localhost:9000".to_string()))
            }
        }
    }

    /// AWS configuration with retry and timeout settings
    pub async fn aws_config(&self) -> aws_config::SdkConfig {
        let retry_config = RetryConfig::standard()
            .with_max_attempts(3)
            .with_initial_backoff(Duration::from_millis(50));

        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(30))
            .build();

        let mut config_builder = aws_config::load_defaults(BehaviorVersion::latest())
            .await
            .to_builder()
            .retry_config(retry_config)
            .timeout_config(timeout_config);

        if let Some(endpoint_url) = self.override_s3_endpoint_url() {
            config_builder = config_builder.endpoint_url(endpoint_url);
        }

        config_builder.build()
    }

    /// AWS S3 service configuration
    pub async fn s3_client_config(&self) -> aws_sdk_s3::Config {
        let aws_config = self.aws_config().await;
        let s3_config: aws_sdk_s3::Config = (&aws_config).into();
        let mut builder = s3_config.to_builder();

        // MinIO and other S3-compatible servers need path-style addressing
        if self.override_s3_endpoint_url().is_some() {
            builder.set_force_path_style(Some(true));
        }

        builder.build()
    }
}

/// Masks a secret for logging, keeping its first third
#[must_use]
pub fn masked(secret: &str) -> String {
    if secret.is_empty() {
        return "undefined".to_string();
    }

    let visible: String = secret.chars().take(secret.chars().count() / 3).collect();
    format!("{visible}***...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_environment_from_env() {
        // Test development (default)
        env::remove_var("APP_ENV");
        assert_eq!(Environment::from_env().unwrap(), Environment::Development);

        env::set_var("APP_ENV", " Staging ");
        assert_eq!(Environment::from_env().unwrap(), Environment::Staging);

        env::set_var("APP_ENV", "production");
        assert_eq!(Environment::from_env().unwrap(), Environment::Production);

        env::set_var("APP_ENV", "invalid");
        assert!(matches!(
            Environment::from_env(),
            Err(ConfigError::InvalidEnvironment(env)) if env == "invalid"
        ));

        env::remove_var("APP_ENV");
    }

    #[test]
    #[serial]
    fn test_presigned_url_expiration() {
        let environment = Environment::Production;

        env::remove_var("PRESIGNED_URL_EXPIRATION");
        assert_eq!(
            environment.presigned_url_expiration().unwrap(),
            Duration::from_secs(900)
        );

        env::set_var("PRESIGNED_URL_EXPIRATION", "1h");
        assert_eq!(
            environment.presigned_url_expiration().unwrap(),
            Duration::from_secs(3600)
        );

        env::set_var("PRESIGNED_URL_EXPIRATION", "soon");
        assert!(matches!(
            environment.presigned_url_expiration(),
            Err(ConfigError::InvalidExpiration(_))
        ));

        env::remove_var("PRESIGNED_URL_EXPIRATION");
    }

    #[test]
    #[serial]
    fn test_port_and_api_key() {
        let environment = Environment::Development;

        env::remove_var("PORT");
        assert_eq!(environment.port().unwrap(), 8080);

        env::set_var("PORT", "9090");
        assert_eq!(environment.port().unwrap(), 9090);

        env::set_var("PORT", "http");
        assert!(matches!(environment.port(), Err(ConfigError::InvalidPort(_))));
        env::remove_var("PORT");

        env::remove_var("API_KEY");
        assert_eq!(environment.api_key(), "");
        env::set_var("API_KEY", "ABCD-123");
        assert_eq!(environment.api_key(), "ABCD-123");
        env::remove_var("API_KEY");
    }

    #[test]
    #[serial]
    fn test_s3_endpoint_override() {
        env::remove_var("S3_ENDPOINT_URL");
        assert_eq!(Environment::Production.override_s3_endpoint_url(), None);
        assert_eq!(
            Environment::Development.override_s3_endpoint_url().as_deref(),
            Some("http://localhost:9000")
        );

        env::set_var("S3_ENDPOINT_URL", "http://minio:9000");
        assert_eq!(
            Environment::Staging.override_s3_endpoint_url().as_deref(),
            Some("http://minio:9000")
        );
        env::remove_var("S3_ENDPOINT_URL");
    }

    #[test]
    fn test_masked_secret() {
        assert_eq!(masked(""), "undefined");
        assert_eq!(masked("ABCD-123"), "AB***...");
        assert_eq!(masked("ab"), "***...");
    }
}
