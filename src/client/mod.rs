//! HTTP layer: pinned transport, single requests, and retries.

pub mod http;
pub mod retry;
pub mod transport;
