//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration file (config/default.toml, config/local.toml)
//! 3. Environment variables (override)

use serde::Deserialize;
use std::{net::IpAddr, path::PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub instance: InstanceConfig,
    pub cors: CorsConfig,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 8000)
    pub port: u16,
    /// Public domain (e.g., "api.summit.example")
    pub domain: String,
    /// Protocol ("http" or "https")
    pub protocol: String,
}

impl ServerConfig {
    /// Get the base URL for the instance
    ///
    /// # Returns
    /// Full URL like "https://api.summit.example"
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.protocol, self.domain)
    }
}

/// Database configuration (SQLite only)
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to SQLite database file
    pub path: PathBuf,
}

/// Media storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub media: MediaStorageConfig,
}

/// Where uploaded images and documents are served from
#[derive(Debug, Clone, Deserialize)]
pub struct MediaStorageConfig {
    /// Public URL prefix for stored files
    /// e.g., "https://media.summit.example"
    pub public_url: String,
}

/// Bearer token configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for signing tokens (32+ bytes)
    pub token_secret: String,
    /// Access token lifetime in seconds (default: 604800 = 7 days)
    pub access_token_lifetime: i64,
    /// Refresh token lifetime in seconds (default: 2592000 = 30 days)
    pub refresh_token_lifetime: i64,
    /// Issue a new refresh token on every refresh
    pub rotate_refresh_tokens: bool,
}

/// Static branding and contact details
#[derive(Debug, Clone, Deserialize)]
pub struct InstanceConfig {
    pub title: String,
    /// Address quoted in data exports for privacy questions
    pub contact_email: String,
}

/// Cross-origin policy for production deployments
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CorsConfig {
    /// Frontend origins allowed when serving over https
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Request quotas
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Requests per window for anonymous callers (default: 100)
    pub anon_requests: u32,
    /// Requests per window for authenticated callers (default: 1000)
    pub user_requests: u32,
    /// Window length in seconds (default: 3600)
    pub window_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            anon_requests: 100,
            user_requests: 1000,
            window_seconds: 3600,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (SUMMIT__*)
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("server.protocol", "http")?
            .set_default("auth.access_token_lifetime", 604_800)?
            .set_default("auth.refresh_token_lifetime", 2_592_000)?
            .set_default("auth.rotate_refresh_tokens", true)?
            .set_default("cors.allowed_origins", Vec::<String>::new())?
            .set_default("rate_limit.anon_requests", 100)?
            .set_default("rate_limit.user_requests", 1000)?
            .set_default("rate_limit.window_seconds", 3600)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("SUMMIT")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    /// Plain http on a local domain; such deployments accept any CORS origin.
    pub fn is_development(&self) -> bool {
        !self.server.protocol.eq_ignore_ascii_case("https")
            && is_local_server_domain(&self.server.domain)
    }

    fn validate(&self) -> Result<(), crate::error::AppError> {
        const MIN_TOKEN_SECRET_BYTES: usize = 32;

        if self.auth.token_secret.as_bytes().len() < MIN_TOKEN_SECRET_BYTES {
            return Err(crate::error::AppError::Config(format!(
                "auth.token_secret must be at least {} bytes",
                MIN_TOKEN_SECRET_BYTES
            )));
        }

        if self.auth.access_token_lifetime <= 0 || self.auth.refresh_token_lifetime <= 0 {
            return Err(crate::error::AppError::Config(
                "auth token lifetimes must be greater than 0".to_string(),
            ));
        }

        if self.rate_limit.window_seconds == 0 {
            return Err(crate::error::AppError::Config(
                "rate_limit.window_seconds must be greater than 0".to_string(),
            ));
        }

        if self.is_development() {
            let host = normalized_server_host(&self.server.domain);
            tracing::warn!(
                host = %host,
                protocol = %self.server.protocol,
                "Allowing all CORS origins for local development"
            );
        } else if !self.server.protocol.eq_ignore_ascii_case("https") {
            return Err(crate::error::AppError::Config(
                "server.protocol must be https for non-local server domains".to_string(),
            ));
        } else if self.cors.allowed_origins.is_empty() {
            tracing::warn!("cors.allowed_origins is empty; cross-origin requests will be denied");
        }

        Ok(())
    }
}

fn normalized_server_host(domain: &str) -> String {
    let trimmed = domain.trim();
    let parsed_host = url::Url::parse(&format!("http://{trimmed}"))
        .ok()
        .and_then(|url| url.host_str().map(|host| host.to_string()));
    let host = parsed_host.unwrap_or_else(|| trimmed.to_string());
    host.trim_start_matches('[')
        .trim_end_matches(']')
        .trim_end_matches('.')
        .to_ascii_lowercase()
}

fn is_local_server_domain(domain: &str) -> bool {
    let host = normalized_server_host(domain);
    if host == "localhost" || host.ends_with(".localhost") {
        return true;
    }

    if let Ok(ip) = host.parse::<IpAddr>() {
        return ip.is_loopback() || ip.is_unspecified();
    }

    false
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn valid_config() -> AppConfig {
        AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8000,
                domain: "localhost".to_string(),
                protocol: "http".to_string(),
            },
            database: DatabaseConfig {
                path: PathBuf::from("/tmp/summit-test.db"),
            },
            storage: StorageConfig {
                media: MediaStorageConfig {
                    public_url: "https://media.example.com".to_string(),
                },
            },
            auth: AuthConfig {
                token_secret: "x".repeat(32),
                access_token_lifetime: 604_800,
                refresh_token_lifetime: 2_592_000,
                rotate_refresh_tokens: true,
            },
            instance: InstanceConfig {
                title: "AU Chairmanship".to_string(),
                contact_email: "support@example.com".to_string(),
            },
            cors: CorsConfig::default(),
            rate_limit: RateLimitConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }

    #[test]
    fn validate_accepts_http_on_localhost() {
        let config = valid_config();
        assert!(config.validate().is_ok());
        assert!(config.is_development());
    }

    #[test]
    fn localhost_with_port_is_development() {
        let mut config = valid_config();
        config.server.domain = "127.0.0.1:8000".to_string();
        assert!(config.is_development());
    }

    #[test]
    fn https_or_public_domain_is_not_development() {
        let mut config = valid_config();
        config.server.protocol = "https".to_string();
        assert!(!config.is_development());
        assert!(config.validate().is_ok());

        config.server.domain = "api.summit.example".to_string();
        assert!(!config.is_development());
    }

    #[test]
    fn validate_rejects_short_token_secret() {
        let mut config = valid_config();
        config.auth.token_secret = "short-secret".to_string();

        let error = config
            .validate()
            .expect_err("token secret shorter than 32 bytes must fail");
        assert!(matches!(
            error,
            crate::error::AppError::Config(message)
                if message.contains("auth.token_secret")
        ));
    }

    #[test]
    fn validate_rejects_non_positive_lifetimes() {
        let mut config = valid_config();
        config.auth.refresh_token_lifetime = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_http_for_non_local_domain() {
        let mut config = valid_config();
        config.server.domain = "api.summit.example".to_string();
        config.server.protocol = "http".to_string();

        let error = config
            .validate()
            .expect_err("public domains must require https");
        assert!(matches!(
            error,
            crate::error::AppError::Config(message)
                if message.contains("server.protocol must be https")
        ));
    }

    #[test]
    fn https_public_domain_is_production() {
        let mut config = valid_config();
        config.server.domain = "api.summit.example".to_string();
        config.server.protocol = "https".to_string();
        config.cors.allowed_origins = vec!["https://app.summit.example".to_string()];

        assert!(config.validate().is_ok());
        assert!(!config.is_development());
    }
}
