//! Gumwarden error types.

use thiserror::Error;

/// Boxed error returned by custom validation hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur during license verification.
#[derive(Debug, Error)]
pub enum GumwardenError {
    /// Caller supplied an empty product id, empty key, or unusable config.
    #[error("{0}")]
    InvalidArgument(String),

    /// Connect, TLS, timeout, or body read failure. Never retried internally.
    #[error("failed check license: {0}")]
    TransportFailure(#[source] reqwest::Error),

    /// Every attempt came back with a 5xx status.
    #[error("license provider unavailable after {attempts} attempts (HTTP {status}): {body}")]
    ProviderUnavailable {
        /// Number of requests made.
        attempts: u32,
        /// Status code of the last response.
        status: u16,
        /// Raw body of the last response.
        body: String,
    },

    /// Body did not decode as a verification response.
    #[error("failed check license: {0}")]
    MalformedResponse(#[source] serde_json::Error),

    /// The provider reported the key as invalid.
    #[error("invalid license: {message}")]
    InvalidLicense {
        /// Provider supplied reason.
        message: String,
    },

    /// The purchase was refunded.
    #[error("license was refunded and is now invalid")]
    Refunded,

    /// The subscription was cancelled.
    #[error("subscription was canceled, license is now invalid")]
    SubscriptionCancelled,

    /// The last subscription charge failed.
    #[error("failed to renew subscription, please check at {manage_url}")]
    SubscriptionRenewalFailed {
        /// Subscription identifier reported by the provider.
        subscription_id: String,
        /// Page where the buyer can fix their payment method.
        manage_url: String,
    },

    /// The purchase belongs to a different product than the one configured.
    #[error("license belongs to product {actual:?}, expected {expected:?}")]
    ProductMismatch {
        /// Configured product id.
        expected: String,
        /// Product id echoed by the provider.
        actual: String,
    },

    /// The provider echoed back a different license key than was submitted.
    #[error("license key echoed by provider does not match the submitted key")]
    LicenseMismatch,

    /// Custom validation hook rejected the response.
    #[error(transparent)]
    Rejected(BoxError),

    /// Caller cancelled the verification.
    #[error("license check cancelled")]
    Cancelled,

    /// Caller deadline elapsed before verification finished.
    #[error("license check deadline exceeded")]
    DeadlineExceeded,
}

impl GumwardenError {
    /// True when the caller aborted the check rather than the check failing.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }

    /// True for failures where repeating the whole call later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::TransportFailure(_) | Self::ProviderUnavailable { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_license_message() {
        let err = GumwardenError::InvalidLicense {
            message: "m".to_string(),
        };
        assert_eq!(err.to_string(), "invalid license: m");
    }

    #[test]
    fn renewal_failure_mentions_manage_url() {
        let err = GumwardenError::SubscriptionRenewalFailed {
            subscription_id: "xyz".to_string(),
            manage_url: "https://gumroad.com/subscriptions/xyz/manage".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to renew subscription, please check at https://gumroad.com/subscriptions/xyz/manage"
        );
    }

    #[test]
    fn rejected_is_verbatim() {
        let err = GumwardenError::Rejected("invalid seller id".into());
        assert_eq!(err.to_string(), "invalid seller id");
    }

    #[test]
    fn cancellation_kinds() {
        assert!(GumwardenError::Cancelled.is_cancellation());
        assert!(GumwardenError::DeadlineExceeded.is_cancellation());
        assert!(!GumwardenError::Refunded.is_cancellation());
    }

    #[test]
    fn retryable_kinds() {
        let unavailable = GumwardenError::ProviderUnavailable {
            attempts: 5,
            status: 503,
            body: "down".to_string(),
        };
        assert!(unavailable.is_retryable());
        assert!(!GumwardenError::LicenseMismatch.is_retryable());
        assert!(!GumwardenError::InvalidArgument("x".into()).is_retryable());
    }
}
