//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `SHOPIFY_STORE` - Shopify store domain (e.g., your-store.myshopify.com)
//! - `SHOPIFY_STOREFRONT_PUBLIC_TOKEN` - Storefront API public access token
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `SHOPIFY_API_VERSION` - API version (default: 2026-01)
//! - `SHOPIFY_STOREFRONT_PRIVATE_TOKEN` - Storefront API private access token
//!   (used instead of the public token when set)
//! - `SHOPIFY_STOREFRONT_ENDPOINT` - Full GraphQL endpoint override
//! - `SHOPIFY_REQUEST_TIMEOUT_SECS` - Storefront API request timeout (default: 10)
//! - `CATALOG_CACHE_TTL_SECS` - Product cache lifetime (default: 300)
//! - `CART_SYNC_TIMEOUT_SECS` - Deadline for a remote cart change (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
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

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Shopify Storefront API configuration
    pub shopify: ShopifyStorefrontConfig,
    /// Cart store configuration
    pub cart: CartConfig,
    /// Sentry error tracking configuration
    pub sentry: SentryConfig,
}

/// Shopify Storefront API configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct ShopifyStorefrontConfig {
    /// Shopify store domain (e.g., your-store.myshopify.com)
    pub store: String,
    /// Shopify API version (e.g., 2026-01)
    pub api_version: String,
    /// Storefront API public access token (safe to expose in browser)
    pub storefront_public_token: String,
    /// Storefront API private access token (server-side only)
    pub storefront_private_token: Option<SecretString>,
    /// Overrides the endpoint derived from `store` and `api_version`
    pub endpoint_override: Option<String>,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// How long catalog responses stay cached
    pub cache_ttl: Duration,
}

impl std::fmt::Debug for ShopifyStorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyStorefrontConfig")
            .field("store", &self.store)
            .field("api_version", &self.api_version)
            .field("storefront_public_token", &self.storefront_public_token)
            .field(
                "storefront_private_token",
                &self.storefront_private_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("endpoint_override", &self.endpoint_override)
            .field("request_timeout", &self.request_timeout)
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}

/// Cart store configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Deadline for a single remote cart change before it is rolled back
    pub sync_timeout: Duration,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            sync_timeout: Duration::from_secs(10),
        }
    }
}

/// Sentry error tracking configuration.
#[derive(Debug, Clone)]
pub struct SentryConfig {
    /// Sentry DSN; Sentry is disabled when unset
    pub dsn: Option<String>,
    /// Environment name reported with events
    pub environment: Option<String>,
    /// Fraction of errors to send
    pub sample_rate: f32,
    /// Fraction of transactions to send
    pub traces_sample_rate: f32,
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            dsn: None,
            environment: None,
            sample_rate: 1.0,
            traces_sample_rate: 0.0,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_parsed_or_default::<IpAddr>("STOREFRONT_HOST", "127.0.0.1")?;
        let port = get_parsed_or_default::<u16>("STOREFRONT_PORT", "3000")?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;
        url::Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("STOREFRONT_BASE_URL".to_string(), e.to_string())
        })?;

        Ok(Self {
            host,
            port,
            base_url,
            shopify: ShopifyStorefrontConfig::from_env()?,
            cart: CartConfig::from_env()?,
            sentry: SentryConfig::from_env()?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl ShopifyStorefrontConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let storefront_private_token = get_optional_env("SHOPIFY_STOREFRONT_PRIVATE_TOKEN")
            .map(|token| {
                validate_secret_strength(&token, "SHOPIFY_STOREFRONT_PRIVATE_TOKEN")?;
                Ok::<_, ConfigError>(SecretString::from(token))
            })
            .transpose()?;

        Ok(Self {
            store: get_required_env("SHOPIFY_STORE")?,
            api_version: get_env_or_default("SHOPIFY_API_VERSION", "2026-01"),
            storefront_public_token: get_required_env("SHOPIFY_STOREFRONT_PUBLIC_TOKEN")?,
            storefront_private_token,
            endpoint_override: get_optional_env("SHOPIFY_STOREFRONT_ENDPOINT"),
            request_timeout: Duration::from_secs(get_parsed_or_default(
                "SHOPIFY_REQUEST_TIMEOUT_SECS",
                "10",
            )?),
            cache_ttl: Duration::from_secs(get_parsed_or_default("CATALOG_CACHE_TTL_SECS", "300")?),
        })
    }

    /// The Storefront API GraphQL endpoint.
    #[must_use]
    pub fn endpoint(&self) -> String {
        self.endpoint_override.clone().unwrap_or_else(|| {
            format!(
                "https://{}/api/{}/graphql.json",
                self.store, self.api_version
            )
        })
    }

    /// The access header name and token to send with each request.
    ///
    /// Private tokens use a different header than public tokens.
    #[must_use]
    pub fn access_header(&self) -> (&'static str, String) {
        self.storefront_private_token.as_ref().map_or_else(
            || {
                (
                    "X-Shopify-Storefront-Access-Token",
                    self.storefront_public_token.clone(),
                )
            },
            |token| {
                (
                    "Shopify-Storefront-Private-Token",
                    token.expose_secret().to_string(),
                )
            },
        )
    }
}

impl CartConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            sync_timeout: Duration::from_secs(get_parsed_or_default(
                "CART_SYNC_TIMEOUT_SECS",
                "10",
            )?),
        })
    }
}

impl SentryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            dsn: get_optional_env("SENTRY_DSN"),
            environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sample_rate: get_parsed_or_default("SENTRY_SAMPLE_RATE", "1.0")?,
            traces_sample_rate: get_parsed_or_default("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get an environment variable (or its default) parsed into `T`.
fn get_parsed_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
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

    // Real API tokens are random hex/base62 and have high entropy
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the token issued by Shopify."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    /// A config pointing at a local GraphQL endpoint, for tests.
    pub(crate) fn test_config(endpoint: &str) -> StorefrontConfig {
        StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            shopify: ShopifyStorefrontConfig {
                store: "test.myshopify.com".to_string(),
                api_version: "2026-01".to_string(),
                storefront_public_token: "public_token_value".to_string(),
                storefront_private_token: None,
                endpoint_override: Some(endpoint.to_string()),
                request_timeout: Duration::from_secs(2),
                cache_ttl: Duration::from_secs(60),
            },
            cart: CartConfig {
                sync_timeout: Duration::from_secs(2),
            },
            sentry: SentryConfig::default(),
        }
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        // "ab" has entropy of 1 bit per char (50% a, 50% b)
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("shpat_9f8K2mQx7LzR4vN1bT6cW3yH0dJ5gA", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = test_config("http://127.0.0.1:1/graphql.json");
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
        assert!(!config.is_secure());
    }

    #[test]
    fn test_endpoint_derived_from_store() {
        let mut config = test_config("unused").shopify;
        config.endpoint_override = None;
        assert_eq!(
            config.endpoint(),
            "https://test.myshopify.com/api/2026-01/graphql.json"
        );
    }

    #[test]
    fn test_access_header_prefers_private_token() {
        let mut config = test_config("unused").shopify;
        assert_eq!(
            config.access_header(),
            (
                "X-Shopify-Storefront-Access-Token",
                "public_token_value".to_string()
            )
        );

        config.storefront_private_token = Some(SecretString::from("private_value"));
        assert_eq!(
            config.access_header(),
            ("Shopify-Storefront-Private-Token", "private_value".to_string())
        );
    }

    #[test]
    fn test_shopify_config_debug_redacts_secrets() {
        let mut config = test_config("unused").shopify;
        config.storefront_private_token = Some(SecretString::from("super_secret_private_token"));

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("test.myshopify.com"));
        assert!(debug_output.contains("public_token_value"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_private_token"));
    }
}
