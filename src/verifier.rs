//! Verifier - the main public API for Gumwarden.
//!
//! A `Verifier` is bound to one product and owns its pinned HTTP client.
//! It holds no per-call state, so one instance can serve any number of
//! concurrent `verify` calls.

use crate::client::http::VerifyRequest;
use crate::client::retry::{send_with_retry, RetryPolicy};
use crate::client::transport::{build_client, TrustRoots};
use crate::config::{RequestSchema, VerifierConfig};
use crate::errors::BoxError;
use crate::policy::classify::{classify, Expected, Validator};
use crate::protocol::models::{parse_verification_response, VerificationResponse};
use crate::GumwardenError;
use reqwest::Client;
use std::future::Future;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info, instrument};

/// License verifier for a single product.
#[derive(Clone)]
pub struct Verifier {
    /// Verification endpoint. Settable so tests can point at a fixture.
    pub api_url: String,

    /// HTTP client. Replacing it replaces the pinned trust roots too.
    pub client: Client,

    product_id: String,
    schema: RequestSchema,
    retry: RetryPolicy,
    validator: Option<Validator>,
}

impl std::fmt::Debug for Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Verifier")
            .field("api_url", &self.api_url)
            .field("product_id", &self.product_id)
            .field("schema", &self.schema)
            .field("retry", &self.retry)
            .field("validator", &self.validator.is_some())
            .finish_non_exhaustive()
    }
}

impl Verifier {
    /// Create a verifier for `product_id` against the production endpoint.
    ///
    /// The system trust store is captured here and never re-read.
    ///
    /// # Errors
    /// - `InvalidArgument` - `product_id` is empty
    /// - `TransportFailure` - HTTP client construction failed
    pub fn new(product_id: impl Into<String>) -> Result<Self, GumwardenError> {
        Self::with_config(VerifierConfig::new(product_id))
    }

    /// Create a verifier from a full configuration, trusting the system store.
    pub fn with_config(config: VerifierConfig) -> Result<Self, GumwardenError> {
        config.validate()?;
        Self::build(config, &TrustRoots::system())
    }

    /// Create a verifier that trusts only `roots`.
    pub fn with_trust_roots(
        config: VerifierConfig,
        roots: &TrustRoots,
    ) -> Result<Self, GumwardenError> {
        config.validate()?;
        Self::build(config, roots)
    }

    fn build(config: VerifierConfig, roots: &TrustRoots) -> Result<Self, GumwardenError> {
        let client = build_client(&config, roots)?;
        debug!(
            product_id = %config.product_id,
            api_url = %config.api_url,
            trusted_roots = roots.len(),
            "verifier created"
        );

        Ok(Self {
            api_url: config.api_url,
            client,
            product_id: config.product_id,
            schema: config.schema,
            retry: RetryPolicy {
                max_attempts: config.max_attempts,
                step: config.retry_backoff,
            },
            validator: None,
        })
    }

    /// Install a check that runs after every built-in check passes.
    ///
    /// Any error it returns becomes the verification result unchanged.
    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&VerificationResponse) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Configured product identifier.
    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    /// Configured request schema.
    pub fn schema(&self) -> RequestSchema {
        self.schema
    }

    /// Verify a license key.
    ///
    /// Performs the request (retrying 5xx responses with linear backoff),
    /// decodes the body, and runs the classification checks. The decoded
    /// response is returned on success so callers can read purchase details.
    ///
    /// Dropping the returned future aborts the call.
    ///
    /// # Errors
    /// - `InvalidArgument` - Empty key, no request is made
    /// - `TransportFailure` - Network or TLS failure
    /// - `ProviderUnavailable` - Every attempt returned 5xx
    /// - `MalformedResponse` - Body is not a verification response
    /// - `InvalidLicense`, `Refunded`, `SubscriptionCancelled`,
    ///   `SubscriptionRenewalFailed`, `ProductMismatch`, `LicenseMismatch`
    /// - `Rejected` - Custom validator failed
    #[instrument(skip(self, license_key), fields(product_id = %self.product_id))]
    pub async fn verify(&self, license_key: &str) -> Result<VerificationResponse, GumwardenError> {
        check_key(license_key)?;

        let request = VerifyRequest {
            url: &self.api_url,
            product_id: &self.product_id,
            license_key,
            schema: self.schema,
        };
        let raw = send_with_retry(&self.client, &request, self.retry).await?;
        debug!(status = raw.status, bytes = raw.body.len(), "license response received");

        let response = parse_verification_response(&raw.body)?;

        let expected = Expected {
            product_id: &self.product_id,
            license_key,
            schema: self.schema,
        };
        match classify(&response, &expected, self.validator.as_ref()) {
            Ok(()) => {
                info!(uses = response.uses, "license verified");
                Ok(response)
            }
            Err(e) => {
                info!(reason = %e, "license rejected");
                Err(e)
            }
        }
    }

    /// Verify a license key, aborting with `Cancelled` once `signal` completes.
    ///
    /// Cancellation is observed during requests and during retry backoff.
    pub async fn verify_until<S>(
        &self,
        license_key: &str,
        signal: S,
    ) -> Result<VerificationResponse, GumwardenError>
    where
        S: Future<Output = ()>,
    {
        check_key(license_key)?;

        tokio::select! {
            biased;
            _ = signal => {
                debug!("license check cancelled by caller");
                Err(GumwardenError::Cancelled)
            }
            result = self.verify(license_key) => result,
        }
    }

    /// Verify a license key, aborting with `DeadlineExceeded` at `deadline`.
    pub async fn verify_with_deadline(
        &self,
        license_key: &str,
        deadline: Instant,
    ) -> Result<VerificationResponse, GumwardenError> {
        check_key(license_key)?;

        match tokio::time::timeout_at(deadline, self.verify(license_key)).await {
            Ok(result) => result,
            Err(_) => {
                debug!("license check deadline exceeded");
                Err(GumwardenError::DeadlineExceeded)
            }
        }
    }
}

fn check_key(license_key: &str) -> Result<(), GumwardenError> {
    if license_key.is_empty() {
        return Err(GumwardenError::InvalidArgument(
            "license key cannot be empty".to_string(),
        ));
    }
    Ok(())
}
