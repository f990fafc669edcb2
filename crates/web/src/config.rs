//! Web configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SUPABASE_URL` - Identity provider base URL
//! - `SUPABASE_ANON_KEY` - Identity provider public API key
//!
//! ## Optional
//! - `APP_HOST` - Bind address (default: 127.0.0.1)
//! - `APP_PORT` - Listen port (default: 3000)
//! - `PUBLIC_SITE_URL` - Public URL of the site, used for OAuth redirects
//! - `STATIC_DIR` - Static asset root; uploads land in `<root>/uploads`
//!   (default: crates/web/static)
//! - `ARK_API_KEY` - Image generation credential
//! - `ARK_API_BASE` - Image generation base URL
//!   (default: <https://ark.cn-beijing.volces.com/api/v3>)
//! - `CREEM_API_KEY` - Payments API key
//! - `CREEM_API_BASE` - Payments base URL (default: <https://api.creem.io>)
//! - `CREEM_PRODUCT_BASIC`, `CREEM_PRODUCT_PRO`, `CREEM_PRODUCT_TEAM` -
//!   Product ids for the pricing tiers
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_TRACES_SAMPLE_RATE` - Fraction of requests traced (default: 0.0)
//!
//! Provider credentials are optional at startup: the relay that needs a
//! missing credential answers with a 500 naming it. A credential that *is*
//! set must not look like a placeholder.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use righthair_core::{PlanTier, ProductId};
use secrecy::SecretString;
use thiserror::Error;

/// Site URL assumed when `PUBLIC_SITE_URL` is not configured.
pub const DEFAULT_SITE_URL: &str = "http://localhost:3000";

/// Default image generation API base.
pub const DEFAULT_ARK_API_BASE: &str = "https://ark.cn-beijing.volces.com/api/v3";

/// Default payments API base.
pub const DEFAULT_CREEM_API_BASE: &str = "https://api.creem.io";

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
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

/// Web application configuration.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public site URL without a trailing slash, if configured
    pub public_site_url: Option<String>,
    /// Root directory served under `/static`
    pub static_dir: PathBuf,
    /// Image generation provider
    pub image_gen: ImageGenConfig,
    /// Payments provider
    pub payments: PaymentsConfig,
    /// Identity provider
    pub identity: IdentityConfig,
    /// Product ids for the pricing tiers
    pub pricing: PricingConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Fraction of transactions sent to Sentry
    pub sentry_traces_sample_rate: f32,
}

/// Image generation provider configuration.
#[derive(Debug, Clone)]
pub struct ImageGenConfig {
    /// Bearer credential; `None` makes the age filter answer 500.
    pub api_key: Option<SecretString>,
    /// API base URL without a trailing slash
    pub api_base: String,
}

/// Payments provider configuration.
#[derive(Debug, Clone)]
pub struct PaymentsConfig {
    /// `x-api-key` credential; `None` makes checkout answer 500.
    pub api_key: Option<SecretString>,
    /// API base URL without a trailing slash
    pub api_base: String,
}

/// Identity provider configuration.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Provider base URL without a trailing slash
    pub url: String,
    /// Public (anon) API key sent as the `apikey` header
    pub anon_key: SecretString,
}

/// Payments product ids for each pricing tier.
#[derive(Debug, Clone, Default)]
pub struct PricingConfig {
    pub basic: Option<ProductId>,
    pub pro: Option<ProductId>,
    pub team: Option<ProductId>,
}

impl WebConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if a configured credential fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("APP_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("APP_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("APP_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("APP_PORT".to_string(), e.to_string()))?;
        let sentry_traces_sample_rate = get_env_or_default("SENTRY_TRACES_SAMPLE_RATE", "0.0")
            .parse::<f32>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SENTRY_TRACES_SAMPLE_RATE".to_string(), e.to_string())
            })?;

        Ok(Self {
            host,
            port,
            public_site_url: get_optional_env("PUBLIC_SITE_URL")
                .map(|url| parse_base_url("PUBLIC_SITE_URL", &url))
                .transpose()?,
            static_dir: PathBuf::from(get_env_or_default("STATIC_DIR", "crates/web/static")),
            image_gen: ImageGenConfig::from_env()?,
            payments: PaymentsConfig::from_env()?,
            identity: IdentityConfig::from_env()?,
            pricing: PricingConfig::from_env(),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// The configured public site URL, or the local default.
    #[must_use]
    pub fn site_url(&self) -> &str {
        self.public_site_url.as_deref().unwrap_or(DEFAULT_SITE_URL)
    }

    /// Directory uploaded images are written to.
    #[must_use]
    pub fn uploads_dir(&self) -> PathBuf {
        self.static_dir.join("uploads")
    }
}

impl ImageGenConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: get_optional_secret("ARK_API_KEY")?,
            api_base: parse_base_url(
                "ARK_API_BASE",
                &get_env_or_default("ARK_API_BASE", DEFAULT_ARK_API_BASE),
            )?,
        })
    }
}

impl PaymentsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: get_optional_secret("CREEM_API_KEY")?,
            api_base: parse_base_url(
                "CREEM_API_BASE",
                &get_env_or_default("CREEM_API_BASE", DEFAULT_CREEM_API_BASE),
            )?,
        })
    }
}

impl IdentityConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: parse_base_url("SUPABASE_URL", &get_required_env("SUPABASE_URL")?)?,
            anon_key: get_required_secret("SUPABASE_ANON_KEY")?,
        })
    }
}

impl PricingConfig {
    fn from_env() -> Self {
        let product = |tier: PlanTier| get_optional_env(tier.product_env_var()).map(ProductId::new);
        Self {
            basic: product(PlanTier::Basic),
            pro: product(PlanTier::Pro),
            team: product(PlanTier::Team),
        }
    }

    /// Product id configured for a tier.
    #[must_use]
    pub const fn product_for(&self, tier: PlanTier) -> Option<&ProductId> {
        match tier {
            PlanTier::Basic => self.basic.as_ref(),
            PlanTier::Pro => self.pro.as_ref(),
            PlanTier::Team => self.team.as_ref(),
        }
    }

    /// Reverse lookup: which tier a product id belongs to.
    #[must_use]
    pub fn tier_for(&self, product_id: &str) -> Option<PlanTier> {
        PlanTier::ALL
            .into_iter()
            .find(|tier| self.product_for(*tier).is_some_and(|id| id.as_str() == product_id))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Strip trailing slashes from a base URL.
fn trim_base(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// Validate an http(s) base URL and strip its trailing slashes.
fn parse_base_url(key: &str, value: &str) -> Result<String, ConfigError> {
    let parsed = url::Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme {}", parsed.scheme()),
        ));
    }
    Ok(trim_base(value))
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    get_optional_env(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
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
    let len = s.chars().count() as f64;
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
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the key issued by the provider."
            ),
        ));
    }

    Ok(())
}

/// Load an optional credential, validating it when present.
fn get_optional_secret(key: &str) -> Result<Option<SecretString>, ConfigError> {
    get_optional_env(key)
        .map(|value| {
            validate_secret_strength(&value, key)?;
            Ok(SecretString::from(value))
        })
        .transpose()
}
