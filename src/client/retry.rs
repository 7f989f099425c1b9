//! Retry of provider side (5xx) failures with linear backoff.

use crate::client::http::{send_verify, RawResponse, VerifyRequest};
use crate::GumwardenError;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry budget for one verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Backoff step; the sleep after attempt `n` is `n * step`.
    pub step: Duration,
}

impl RetryPolicy {
    /// Sleep between attempt `attempt` (1-based) and the next one.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.step.saturating_mul(attempt)
    }
}

/// Send `request`, retrying while the provider answers 5xx.
///
/// Transport failures are returned at once. The loop itself never gives up
/// early; callers that need cancellation wrap the returned future.
pub async fn send_with_retry(
    client: &Client,
    request: &VerifyRequest<'_>,
    policy: RetryPolicy,
) -> Result<RawResponse, GumwardenError> {
    let mut attempt = 1;
    loop {
        debug!(attempt, url = %request.url, "sending license request");
        let response = send_verify(client, request).await?;

        if !response.is_server_error() {
            return Ok(response);
        }

        if attempt >= policy.max_attempts {
            warn!(attempt, status = response.status, "license provider unavailable, giving up");
            return Err(GumwardenError::ProviderUnavailable {
                attempts: attempt,
                status: response.status,
                body: response.body_lossy(),
            });
        }

        let delay = policy.delay_after(attempt);
        warn!(
            attempt,
            status = response.status,
            ?delay,
            "license provider error, retrying"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
