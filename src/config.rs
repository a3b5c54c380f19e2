//! Configuration types.

use std::time::Duration;

use reqwest::Url;
use secrecy::SecretString;

use crate::error::ConfigError;

/// Default Stripe REST endpoint.
pub const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";

const DEFAULT_PORT: u16 = 8787;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Service configuration. Everything the onboarding flow needs at call time.
#[derive(Debug, Clone)]
pub struct ConnectConfig {
    /// Base URL of the Supabase project (PostgREST lives under `/rest/v1`).
    pub supabase_url: String,
    /// Service-role key, sent both as `apikey` and as a bearer token.
    pub supabase_service_key: SecretString,
    /// Stripe secret API key.
    pub stripe_secret_key: SecretString,
    /// Stripe API base, overridable for local stubs.
    pub stripe_api_base: String,
    /// Public base URL of the web app; onboarding callbacks hang off it.
    pub app_base_url: String,
    /// Port the HTTP server binds to.
    pub port: u16,
    /// Timeout applied to every outbound request.
    pub http_timeout: Duration,
}

impl ConnectConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
        };

        let supabase_url = parse_base_url("SUPABASE_URL", &required("SUPABASE_URL")?)?;
        let supabase_service_key = SecretString::from(required("SUPABASE_SERVICE_ROLE_KEY")?);
        let stripe_secret_key = SecretString::from(required("STRIPE_SECRET_KEY")?);
        let app_base_url = parse_base_url("APP_BASE_URL", &required("APP_BASE_URL")?)?;

        let stripe_api_base = match lookup("STRIPE_API_BASE").filter(|v| !v.trim().is_empty()) {
            Some(raw) => parse_base_url("STRIPE_API_BASE", raw.trim())?,
            None => DEFAULT_STRIPE_API_BASE.to_string(),
        };

        let port = match lookup("FOUNDER_CONNECT_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                key: "FOUNDER_CONNECT_PORT".into(),
                message: format!("{e}"),
            })?,
            None => DEFAULT_PORT,
        };

        let timeout_secs = match lookup("FOUNDER_CONNECT_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| ConfigError::InvalidValue {
                key: "FOUNDER_CONNECT_HTTP_TIMEOUT_SECS".into(),
                message: format!("{e}"),
            })?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        Ok(Self {
            supabase_url,
            supabase_service_key,
            stripe_secret_key,
            stripe_api_base,
            app_base_url,
            port,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Origin of the web app (`scheme://host[:port]`), used for CORS.
    pub fn app_origin(&self) -> String {
        // app_base_url was validated in from_lookup
        Url::parse(&self.app_base_url)
            .map(|u| u.origin().ascii_serialization())
            .unwrap_or_else(|_| self.app_base_url.clone())
    }

    /// Build the shared outbound HTTP client.
    pub fn http_client(&self) -> Result<reqwest::Client, ConfigError> {
        reqwest::Client::builder()
            .timeout(self.http_timeout)
            .user_agent(concat!("founder-connect/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))
    }
}

/// Validate an absolute http(s) URL and strip any trailing slash.
fn parse_base_url(key: &str, raw: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("{e}"),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("unsupported scheme '{}'", url.scheme()),
        });
    }

    Ok(raw.trim_end_matches('/').to_string())
}
