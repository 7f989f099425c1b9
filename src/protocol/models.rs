//! Gumroad verify response structs and body decoding.

use crate::GumwardenError;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Decoded license verification response.
///
/// Missing or `null` fields decode to their zero value; unknown fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerificationResponse {
    /// Whether the provider recognised the key for the product.
    #[serde(default, deserialize_with = "null_default")]
    pub success: bool,

    /// Number of times the key has been verified with usage counting.
    #[serde(default, deserialize_with = "null_default")]
    pub uses: u64,

    /// Failure reason; only populated when `success` is false.
    #[serde(default, deserialize_with = "null_default")]
    pub message: String,

    /// Purchase facts tied to the key.
    #[serde(default, deserialize_with = "null_default")]
    pub purchase: Purchase,
}

/// Purchase record attached to a license key.
///
/// Event timestamps are `None` when the event did not happen. The provider
/// signals that with `null`, an empty string, or the zero time
/// `0001-01-01T00:00:00Z`; all three decode to `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Purchase {
    /// Seller account identifier.
    #[serde(default, deserialize_with = "null_default")]
    pub seller_id: String,

    /// Product identifier the key was issued for.
    #[serde(default, deserialize_with = "null_default")]
    pub product_id: String,

    /// Human readable product name.
    #[serde(default, deserialize_with = "null_default")]
    pub product_name: String,

    /// Product permalink.
    #[serde(default, deserialize_with = "null_default")]
    pub permalink: String,

    /// Buyer email.
    #[serde(default, deserialize_with = "null_default")]
    pub email: String,

    /// License key as echoed by the provider.
    #[serde(default, deserialize_with = "null_default")]
    pub license_key: String,

    /// Units purchased.
    #[serde(default, deserialize_with = "null_default")]
    pub quantity: u64,

    /// Purchase was refunded.
    #[serde(default, deserialize_with = "null_default")]
    pub refunded: bool,

    /// Purchase is under dispute.
    #[serde(default, deserialize_with = "null_default")]
    pub disputed: bool,

    /// Purchase was charged back.
    #[serde(default, deserialize_with = "null_default")]
    pub chargebacked: bool,

    /// When the sale happened.
    #[serde(default, deserialize_with = "event_time")]
    pub sale_timestamp: Option<DateTime<Utc>>,

    /// Subscription identifier, empty for one-off purchases.
    #[serde(default, deserialize_with = "null_default")]
    pub subscription_id: String,

    /// When the subscription was cancelled.
    #[serde(default, deserialize_with = "event_time")]
    pub subscription_cancelled_at: Option<DateTime<Utc>>,

    /// When the subscription ended.
    #[serde(default, deserialize_with = "event_time")]
    pub subscription_ended_at: Option<DateTime<Utc>>,

    /// When the last renewal charge failed.
    #[serde(default, deserialize_with = "event_time")]
    pub subscription_failed_at: Option<DateTime<Utc>>,
}

/// Missing and `null` both decode to the zero value.
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn event_time<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    let raw = match raw.as_deref().map(str::trim) {
        None | Some("") => return Ok(None),
        Some(s) => s,
    };

    let parsed = DateTime::parse_from_rfc3339(raw)
        .map_err(serde::de::Error::custom)?
        .with_timezone(&Utc);

    // Year 1 is the zero time.
    if parsed.year() <= 1 {
        return Ok(None);
    }
    Ok(Some(parsed))
}

/// Parse a raw response body.
pub fn parse_verification_response(body: &[u8]) -> Result<VerificationResponse, GumwardenError> {
    serde_json::from_slice(body).map_err(GumwardenError::MalformedResponse)
}
