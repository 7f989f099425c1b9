//! Gumwarden configuration.

use crate::GumwardenError;
use std::time::Duration;

/// Production license verification endpoint.
pub const DEFAULT_API_URL: &str = "https://api.gumroad.com/v2/licenses/verify";

/// Which request body and response checks the endpoint speaks.
///
/// Older deployments key the request on `product_permalink` and do not echo
/// the product id or license key back, so the echo checks would misfire
/// against them. Pick the schema explicitly; it is never guessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestSchema {
    /// Posts `product_id` and requires the purchase to echo product and key.
    #[default]
    Extended,
    /// Posts `product_permalink` and skips the echo checks.
    Legacy,
}

impl RequestSchema {
    /// Form field name carrying the product identifier.
    pub fn product_field(self) -> &'static str {
        match self {
            Self::Extended => "product_id",
            Self::Legacy => "product_permalink",
        }
    }

    /// Whether the purchase must echo the configured product id and key.
    pub fn checks_echo(self) -> bool {
        matches!(self, Self::Extended)
    }
}

/// Configuration for a [`Verifier`](crate::Verifier).
///
/// Only `product_id` has no sensible default; build with
/// [`VerifierConfig::new`] and override fields as needed.
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    /// Product identifier (or permalink for [`RequestSchema::Legacy`]).
    pub product_id: String,

    /// Verification endpoint.
    pub api_url: String,

    /// Request body and echo-check variant.
    pub schema: RequestSchema,

    /// Upper bound on a single request, connect through body read.
    pub request_timeout: Duration,

    /// Upper bound on TCP connect plus TLS handshake.
    pub connect_timeout: Duration,

    /// How long an idle pooled connection is kept.
    pub pool_idle_timeout: Duration,

    /// Maximum idle pooled connections per host.
    pub pool_max_idle_per_host: usize,

    /// Total attempts when the provider keeps answering 5xx.
    pub max_attempts: u32,

    /// Linear backoff step; attempt `n` is followed by a sleep of `n * step`.
    pub retry_backoff: Duration,

    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl VerifierConfig {
    /// Defaults for the production endpoint.
    pub fn new(product_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            api_url: DEFAULT_API_URL.to_string(),
            schema: RequestSchema::default(),
            request_timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 100,
            max_attempts: 5,
            retry_backoff: Duration::from_millis(500),
            user_agent: build_user_agent(),
        }
    }

    /// Validate configuration for obvious errors.
    pub fn validate(&self) -> Result<(), GumwardenError> {
        if self.product_id.is_empty() {
            return Err(GumwardenError::InvalidArgument(
                "product ID cannot be empty".to_string(),
            ));
        }
        if let Err(e) = reqwest::Url::parse(&self.api_url) {
            return Err(GumwardenError::InvalidArgument(format!(
                "api_url {:?} is not a valid URL: {}",
                self.api_url, e
            )));
        }
        if self.max_attempts == 0 {
            return Err(GumwardenError::InvalidArgument(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Format: `gumwarden/<version>`
pub fn build_user_agent() -> String {
    format!("gumwarden/{}", env!("CARGO_PKG_VERSION"))
}
