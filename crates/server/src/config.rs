//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required (postgres storage)
//! - `ROOMSERVICE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `ROOMSERVICE_STORAGE` - `postgres` (default) or `memory` (seeded demo catalog, no persistence)
//! - `ROOMSERVICE_HOST` - Bind address (default: 127.0.0.1)
//! - `ROOMSERVICE_PORT` - Listen port (default: 3001)
//! - `FRONTEND_URL` - Guest app origin for CORS and payment callbacks (default: <http://localhost:5173>)
//! - `ABA_MERCHANT_ID` - Payment gateway merchant ID
//! - `ABA_API_KEY` - Payment gateway signing key (both must be set to sign real payloads)
//! - `NOTIFY_TELEGRAM_WEBHOOK_URL` - Chat relay webhook for new-order alerts
//! - `NOTIFY_WHATSAPP_WEBHOOK_URL` - WhatsApp bridge webhook for new-order alerts
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Where orders and the catalog are stored.
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// `PostgreSQL` via sqlx (connection string contains a password).
    Postgres { database_url: SecretString },
    /// Process-local store seeded with the demo catalog.
    Memory,
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Storage backend
    pub storage: StorageConfig,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Guest app origin, used for CORS and gateway callback URLs
    pub frontend_url: Url,
    /// Payment gateway configuration
    pub payway: PaywayConfig,
    /// Chat relay notification targets
    pub notifications: NotificationConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Payment gateway (ABA `PayWay`) configuration.
///
/// Implements `Debug` manually to redact the signing key.
#[derive(Clone, Default)]
pub struct PaywayConfig {
    /// Merchant identifier issued by the gateway
    pub merchant_id: Option<String>,
    /// HMAC signing key (server-side only)
    pub api_key: Option<SecretString>,
}

impl std::fmt::Debug for PaywayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaywayConfig")
            .field("merchant_id", &self.merchant_id)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Webhook targets for new-order notifications.
#[derive(Debug, Clone, Default)]
pub struct NotificationConfig {
    /// Telegram relay webhook
    pub telegram_webhook_url: Option<Url>,
    /// WhatsApp bridge webhook
    pub whatsapp_webhook_url: Option<Url>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the gateway key fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let storage = match get_env_or_default("ROOMSERVICE_STORAGE", "postgres").as_str() {
            "postgres" => StorageConfig::Postgres {
                database_url: get_database_url("ROOMSERVICE_DATABASE_URL")?,
            },
            "memory" => StorageConfig::Memory,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "ROOMSERVICE_STORAGE".to_string(),
                    format!("expected 'postgres' or 'memory', got '{other}'"),
                ));
            }
        };
        let host = get_env_or_default("ROOMSERVICE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("ROOMSERVICE_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("ROOMSERVICE_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("ROOMSERVICE_PORT".to_string(), e.to_string())
            })?;
        let frontend_url = parse_url(
            "FRONTEND_URL",
            &get_env_or_default("FRONTEND_URL", DEFAULT_FRONTEND_URL),
        )?;

        Ok(Self {
            storage,
            host,
            port,
            frontend_url,
            payway: PaywayConfig::from_env()?,
            notifications: NotificationConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Configuration for in-process use (tests, demos): memory storage,
    /// no gateway credentials, no notification targets.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            storage: StorageConfig::Memory,
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3001,
            frontend_url: default_frontend_url(),
            payway: PaywayConfig::default(),
            notifications: NotificationConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

impl PaywayConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let api_key = match get_optional_env("ABA_API_KEY") {
            Some(value) => {
                validate_secret_strength(&value, "ABA_API_KEY")?;
                Some(SecretString::from(value))
            }
            None => None,
        };

        Ok(Self {
            merchant_id: get_optional_env("ABA_MERCHANT_ID"),
            api_key,
        })
    }
}

impl NotificationConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let optional_url = |key: &str| {
            get_optional_env(key)
                .map(|value| parse_url(key, &value))
                .transpose()
        };

        Ok(Self {
            telegram_webhook_url: optional_url("NOTIFY_TELEGRAM_WEBHOOK_URL")?,
            whatsapp_webhook_url: optional_url("NOTIFY_WHATSAPP_WEBHOOK_URL")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn default_frontend_url() -> Url {
    // Constant input, parse cannot fail.
    Url::parse(DEFAULT_FRONTEND_URL).unwrap_or_else(|_| unreachable!())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the key issued by the gateway."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-aba-api-key", "ABA_API_KEY");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaa", "ABA_API_KEY");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("9f8c2a7e41b03d6f5e1a8c4b2d7f0e93", "ABA_API_KEY");
        assert!(result.is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig::in_memory();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3001);
    }

    #[test]
    fn test_default_frontend_url() {
        let config = ServerConfig::in_memory();
        assert_eq!(config.frontend_url.as_str(), "http://localhost:5173/");
    }

    #[test]
    fn test_payway_config_debug_redacts_key() {
        let config = PaywayConfig {
            merchant_id: Some("ec000123".to_string()),
            api_key: Some(SecretString::from("super_secret_signing_key")),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("ec000123"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_signing_key"));
    }
}
