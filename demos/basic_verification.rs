//! Basic license verification example.
//!
//! This example demonstrates the core workflow for verifying a license key
//! and handling common error cases.
//!
//! # Running
//!
//! ```bash
//! export LICENSE_KEY="your-license-key"
//! cargo run --example basic_verification
//! ```
//!
//! # Note
//!
//! In production the product id should be a compile-time constant in your
//! binary, not something read from the environment.

use gumwarden::{GumwardenError, Verifier};
use std::time::Duration;

const PRODUCT_ID: &str = "your-gumroad-product-id";

#[tokio::main]
async fn main() {
    // License key from user (this CAN come from environment/config)
    let Ok(license_key) = std::env::var("LICENSE_KEY") else {
        eprintln!("Set LICENSE_KEY environment variable");
        std::process::exit(2);
    };

    let verifier = match Verifier::new(PRODUCT_ID) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Give up after 30 seconds no matter how many retries are left.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(30);

    match verifier.verify_with_deadline(&license_key, deadline).await {
        Ok(response) => {
            println!("✓ License valid!");
            println!("  Email: {}", response.purchase.email);
            println!("  Uses: {}", response.uses);
            if let Some(sold) = response.purchase.sale_timestamp {
                println!("  Purchased: {}", sold);
            }
        }
        Err(e) => {
            match &e {
                GumwardenError::InvalidLicense { message } => {
                    eprintln!("License is invalid: {}", message);
                }
                GumwardenError::SubscriptionRenewalFailed { manage_url, .. } => {
                    eprintln!("Subscription payment failed, update it at {}", manage_url);
                }
                GumwardenError::ProductMismatch { .. } | GumwardenError::LicenseMismatch => {
                    // Security: the endpoint answered for something we did not ask about
                    eprintln!("SECURITY: license server response does not match the request!");
                }
                e if e.is_retryable() => {
                    eprintln!("License server unreachable, try again later: {}", e);
                }
                _ => {
                    eprintln!("Verification error: {}", e);
                }
            }
            std::process::exit(1);
        }
    }
}
