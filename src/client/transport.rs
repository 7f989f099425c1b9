//! Pinned HTTPS transport.
//!
//! The trust roots are captured once, when a [`TrustRoots`] value is built,
//! and copied into the client. Changes to the OS certificate store after
//! that point do not reach an existing verifier, so a certificate planted
//! at runtime cannot be used to intercept license checks.

use crate::config::VerifierConfig;
use crate::GumwardenError;
use reqwest::{Certificate, Client};
use tracing::{debug, warn};

/// Snapshot of the certificates a verifier trusts.
#[derive(Clone, Default)]
pub struct TrustRoots {
    certs: Vec<Certificate>,
}

impl std::fmt::Debug for TrustRoots {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrustRoots")
            .field("certs", &self.certs.len())
            .finish()
    }
}

impl TrustRoots {
    /// Read the operating system trust store once.
    ///
    /// Never fails: unreadable entries are skipped and a store that cannot be
    /// read at all yields an empty set, which makes every TLS handshake fail
    /// rather than trusting something unexpected.
    pub fn system() -> Self {
        let loaded = rustls_native_certs::load_native_certs();
        for err in &loaded.errors {
            warn!(error = %err, "could not read part of the system trust store");
        }

        let mut certs = Vec::with_capacity(loaded.certs.len());
        for der in &loaded.certs {
            match Certificate::from_der(der.as_ref()) {
                Ok(cert) => certs.push(cert),
                Err(e) => warn!(error = %e, "skipping unparsable system certificate"),
            }
        }

        if certs.is_empty() {
            warn!("system trust store is empty, TLS connections will be rejected");
        } else {
            debug!(count = certs.len(), "captured system trust store");
        }

        Self { certs }
    }

    /// Trust exactly the certificates in a PEM bundle.
    pub fn from_pem(pem: &[u8]) -> Result<Self, GumwardenError> {
        let certs = Certificate::from_pem_bundle(pem).map_err(|e| {
            GumwardenError::InvalidArgument(format!("invalid PEM certificate bundle: {}", e))
        })?;
        if certs.is_empty() {
            return Err(GumwardenError::InvalidArgument(
                "PEM certificate bundle contains no certificates".to_string(),
            ));
        }
        Ok(Self { certs })
    }

    /// Number of trusted certificates.
    pub fn len(&self) -> usize {
        self.certs.len()
    }

    /// Whether no certificate is trusted.
    pub fn is_empty(&self) -> bool {
        self.certs.is_empty()
    }
}

/// Build an HTTP client that trusts only `roots`.
///
/// HTTP/2 is offered through ALPN; plain `http://` endpoints (test
/// fixtures) still work over HTTP/1.1. Proxy settings come from the
/// standard proxy environment variables.
pub fn build_client(config: &VerifierConfig, roots: &TrustRoots) -> Result<Client, GumwardenError> {
    let mut builder = Client::builder()
        .use_rustls_tls()
        .tls_built_in_root_certs(false)
        .timeout(config.request_timeout)
        .connect_timeout(config.connect_timeout)
        .pool_idle_timeout(config.pool_idle_timeout)
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .user_agent(config.user_agent.as_str());

    for cert in &roots.certs {
        builder = builder.add_root_certificate(cert.clone());
    }

    builder.build().map_err(GumwardenError::TransportFailure)
}
