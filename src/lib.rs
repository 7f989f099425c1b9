//! # Gumwarden
//!
//! **Hardened [Gumroad](https://gumroad.com) license key verification for Rust.**
//!
//! Gumwarden checks license keys against Gumroad's `licenses/verify` API
//! and classifies the purchase behind the key: valid, invalid, refunded,
//! cancelled, or behind on its subscription payments.
//!
//! ## Features
//!
//! - **Pinned trust store** — the OS certificate store is captured once at
//!   construction; certificates added later cannot intercept checks
//! - **Echo checks** — the purchase must name the configured product and the
//!   submitted key, so a substituted endpoint cannot vouch for another product
//! - **Retry on provider errors** — 5xx responses are retried with linear backoff
//! - **Cancellation** — checks can be bounded by a deadline or a caller signal
//! - **No local state** — every check is a fresh round trip
//!
//! ## Quickstart
//!
//! ```no_run
//! use gumwarden::{GumwardenError, Verifier};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), GumwardenError> {
//!     let verifier = Verifier::new("your-product-id")?;
//!     let response = verifier.verify("LICENSE-KEY-HERE").await?;
//!     println!("licensed to {}", response.purchase.email);
//!     Ok(())
//! }
//! ```
//!
//! ## Threat Model
//!
//! Gumwarden protects against:
//! - **Runtime trust store tampering** — the client only trusts roots captured
//!   when it was built
//! - **Endpoint substitution** — a response for another product or key is rejected
//!
//! Gumwarden does **not** prevent binary patching or code modification.
//! Client-side licensing can always be bypassed by a determined attacker
//! with access to the binary.
//!
//! ## Configuration
//!
//! - `product_id` — the Gumroad product the keys belong to
//! - `schema` — [`RequestSchema::Extended`] (default) or
//!   [`RequestSchema::Legacy`] for permalink-keyed deployments
//! - `max_attempts` / `retry_backoff` — 5xx retry budget
//!
//! See [`VerifierConfig`] for full documentation.

#![deny(warnings)]
#![deny(missing_docs)]
#![doc(html_root_url = "https://docs.rs/gumwarden/0.1.0")]

// Core modules
pub mod config;
pub mod errors;

// Protocol layer
pub mod protocol;

// Client layer
pub mod client;

// Policy layer
pub mod policy;

// Verifier (main public API)
pub mod verifier;

// Re-exports for public API
pub use client::transport::TrustRoots;
pub use config::{RequestSchema, VerifierConfig, DEFAULT_API_URL};
pub use errors::{BoxError, GumwardenError};
pub use protocol::models::{Purchase, VerificationResponse};
pub use verifier::Verifier;
