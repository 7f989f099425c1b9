//! Ordered classification of a decoded verification response.
//!
//! Checks run top to bottom and the first failure wins:
//! 1. `success == false`
//! 2. purchase refunded
//! 3. subscription cancelled
//! 4. subscription renewal failed
//! 5. product id echo mismatch (extended schema only)
//! 6. license key echo mismatch (extended schema only)
//! 7. custom validator

use crate::config::RequestSchema;
use crate::errors::BoxError;
use crate::protocol::models::VerificationResponse;
use crate::GumwardenError;
use std::sync::Arc;

/// Host supplied check run after every built-in check has passed.
pub type Validator = Arc<dyn Fn(&VerificationResponse) -> Result<(), BoxError> + Send + Sync>;

/// What the caller asked the provider about.
#[derive(Debug, Clone, Copy)]
pub struct Expected<'a> {
    /// Configured product identifier.
    pub product_id: &'a str,
    /// Key that was submitted.
    pub license_key: &'a str,
    /// Whether echo checks apply.
    pub schema: RequestSchema,
}

/// Page where a buyer can manage a subscription.
pub fn subscription_manage_url(subscription_id: &str) -> String {
    format!("https://gumroad.com/subscriptions/{}/manage", subscription_id)
}

/// Classify a decoded response.
///
/// # Returns
/// * `Ok(())` - License is valid
/// * `Err(InvalidLicense)` - Provider rejected the key
/// * `Err(Refunded)` / `Err(SubscriptionCancelled)` / `Err(SubscriptionRenewalFailed)`
/// * `Err(ProductMismatch)` / `Err(LicenseMismatch)` - Echoed identifiers differ
/// * `Err(Rejected)` - Custom validator error, unchanged
pub fn classify(
    response: &VerificationResponse,
    expected: &Expected<'_>,
    validator: Option<&Validator>,
) -> Result<(), GumwardenError> {
    if !response.success {
        return Err(GumwardenError::InvalidLicense {
            message: response.message.clone(),
        });
    }

    let purchase = &response.purchase;

    if purchase.refunded {
        return Err(GumwardenError::Refunded);
    }

    if purchase.subscription_cancelled_at.is_some() {
        return Err(GumwardenError::SubscriptionCancelled);
    }

    if purchase.subscription_failed_at.is_some() {
        return Err(GumwardenError::SubscriptionRenewalFailed {
            subscription_id: purchase.subscription_id.clone(),
            manage_url: subscription_manage_url(&purchase.subscription_id),
        });
    }

    if expected.schema.checks_echo() {
        if purchase.product_id != expected.product_id {
            return Err(GumwardenError::ProductMismatch {
                expected: expected.product_id.to_string(),
                actual: purchase.product_id.clone(),
            });
        }
        if purchase.license_key != expected.license_key {
            return Err(GumwardenError::LicenseMismatch);
        }
    }

    if let Some(validator) = validator {
        validator(response).map_err(GumwardenError::Rejected)?;
    }

    Ok(())
}
