//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `MSA_BACKEND_URL` - Backend REST API base (default: `http://localhost:5000/api`)
//! - `ADMIN_URL` - Admin panel URL for the login link (default: `http://localhost:3001`)
//! - `WHATSAPP_PHONE` - Phone number used by the "Order Now" links (default: 17867637398)
//! - `EMAILJS_SERVICE_ID`, `EMAILJS_TEMPLATE_ID`, `EMAILJS_PUBLIC_KEY` - Contact
//!   form delivery; all three or none
//! - `EMAILJS_PRIVATE_KEY` - EmailJS access token for strict mode
//! - `EMAILJS_API_URL` - EmailJS API base (default: `https://api.emailjs.com/api/v1.0`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 0.1)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_BACKEND_URL: &str = "http://localhost:5000/api";
const DEFAULT_ADMIN_URL: &str = "http://localhost:3001";
const DEFAULT_EMAILJS_URL: &str = "https://api.emailjs.com/api/v1.0";
const DEFAULT_WHATSAPP_PHONE: &str = "17867637398";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "your_",
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
    /// Backend REST API base URL, without trailing slash
    pub backend_url: String,
    /// Admin panel base URL
    pub admin_url: String,
    /// Phone number for WhatsApp order links, digits only
    pub whatsapp_phone: String,
    /// Contact form delivery; `None` disables sending
    pub emailjs: Option<EmailJsConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate
    pub sentry_traces_sample_rate: f32,
}

/// EmailJS configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct EmailJsConfig {
    /// API base URL
    pub api_url: String,
    pub service_id: String,
    pub template_id: String,
    /// Public key (sent as `user_id`)
    pub public_key: String,
    /// Access token for accounts that require it
    pub private_key: Option<SecretString>,
}

impl std::fmt::Debug for EmailJsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailJsConfig")
            .field("api_url", &self.api_url)
            .field("service_id", &self.service_id)
            .field("template_id", &self.template_id)
            .field("public_key", &self.public_key)
            .field("private_key", &self.private_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl EmailJsConfig {
    /// Load EmailJS settings. Returns `None` when none of the ids are set.
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let service_id = get_optional_env("EMAILJS_SERVICE_ID");
        let template_id = get_optional_env("EMAILJS_TEMPLATE_ID");
        let public_key = get_optional_env("EMAILJS_PUBLIC_KEY");

        match (service_id, template_id, public_key) {
            (None, None, None) => Ok(None),
            (Some(service_id), Some(template_id), Some(public_key)) => {
                let private_key = get_optional_env("EMAILJS_PRIVATE_KEY")
                    .map(|value| {
                        validate_secret_strength(&value, "EMAILJS_PRIVATE_KEY")?;
                        Ok(SecretString::from(value))
                    })
                    .transpose()?;

                Ok(Some(Self {
                    api_url: parse_base_url("EMAILJS_API_URL", DEFAULT_EMAILJS_URL)?,
                    service_id,
                    template_id,
                    public_key,
                    private_key,
                }))
            }
            _ => Err(ConfigError::InvalidEnvVar(
                "EMAILJS_*".to_string(),
                "EMAILJS_SERVICE_ID, EMAILJS_TEMPLATE_ID and EMAILJS_PUBLIC_KEY must be set together"
                    .to_string(),
            )),
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

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;
        let backend_url = parse_base_url("MSA_BACKEND_URL", DEFAULT_BACKEND_URL)?;
        let admin_url = parse_base_url("ADMIN_URL", DEFAULT_ADMIN_URL)?;
        let whatsapp_phone =
            parse_phone(&get_env_or_default("WHATSAPP_PHONE", DEFAULT_WHATSAPP_PHONE))?;
        let emailjs = EmailJsConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.1);

        Ok(Self {
            host,
            port,
            base_url,
            backend_url,
            admin_url,
            whatsapp_phone,
            emailjs,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read a base URL, check that it parses, and strip any trailing slash.
fn parse_base_url(key: &str, default: &str) -> Result<String, ConfigError> {
    let mut value = get_env_or_default(key, default);
    url::Url::parse(&value)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    while value.ends_with('/') {
        value.pop();
    }
    Ok(value)
}

/// Keep only the digits of a phone number; at least seven are required.
fn parse_phone(value: &str) -> Result<String, ConfigError> {
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < 7 {
        return Err(ConfigError::InvalidEnvVar(
            "WHATSAPP_PHONE".to_string(),
            format!("expected a phone number, got {value:?}"),
        ));
    }
    Ok(digits)
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

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}
