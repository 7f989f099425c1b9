//! Man-in-the-middle resistance of the pinned transport.
//!
//! The fixture server presents a certificate issued by a private CA
//! (`tests/fixtures/ca.pem`). A verifier that pins that CA reaches it; a
//! verifier built on the system store must refuse the connection before
//! any response is classified, even though the body claims success.

use gumwarden::{GumwardenError, TrustRoots, Verifier, VerifierConfig};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_rustls::rustls::pki_types::pem::PemObject;
use tokio_rustls::rustls::pki_types::{CertificateDer, PrivateKeyDer};
use tokio_rustls::rustls::{self, ServerConfig};
use tokio_rustls::TlsAcceptor;

const CA_PEM: &[u8] = include_bytes!("fixtures/ca.pem");
const SERVER_CERT_PEM: &[u8] = include_bytes!("fixtures/server.pem");
const SERVER_KEY_PEM: &[u8] = include_bytes!("fixtures/server.key");

const PRODUCT: &str = "product-id-1234";
const LICENSE: &str = "DEADBEEF-CAFE1234-5678DEAD-BEEFCAFE";

/// TLS server that answers every request with a valid-looking purchase.
struct FakeLicenseServer {
    addr: SocketAddr,
    served: Arc<AtomicUsize>,
}

impl FakeLicenseServer {
    async fn start() -> Self {
        let certs: Vec<CertificateDer<'static>> = CertificateDer::pem_slice_iter(SERVER_CERT_PEM)
            .collect::<Result<_, _>>()
            .unwrap();
        let key = PrivateKeyDer::from_pem_slice(SERVER_KEY_PEM).unwrap();

        let config = ServerConfig::builder_with_provider(Arc::new(
            rustls::crypto::ring::default_provider(),
        ))
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .unwrap();
        let acceptor = TlsAcceptor::from(Arc::new(config));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let served = Arc::new(AtomicUsize::new(0));

        let counter = served.clone();
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                let acceptor = acceptor.clone();
                let counter = counter.clone();
                tokio::spawn(async move {
                    // Handshake fails for clients that do not trust the CA.
                    let Ok(mut tls) = acceptor.accept(stream).await else {
                        return;
                    };
                    if read_request(&mut tls).await.is_none() {
                        return;
                    }
                    counter.fetch_add(1, Ordering::SeqCst);

                    let body = json!({
                        "success": true,
                        "purchase": {
                            "product_id": PRODUCT,
                            "license_key": LICENSE,
                            "sale_timestamp": "2024-03-01T10:00:00Z"
                        }
                    })
                    .to_string();
                    let response = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    let _ = tls.write_all(response.as_bytes()).await;
                    let _ = tls.shutdown().await;
                });
            }
        });

        Self { addr, served }
    }

    fn url(&self) -> String {
        format!("https://127.0.0.1:{}/v2/licenses/verify", self.addr.port())
    }

    fn served(&self) -> usize {
        self.served.load(Ordering::SeqCst)
    }
}

/// Read one HTTP/1.1 request: headers plus a Content-Length body.
async fn read_request<S: AsyncReadExt + Unpin>(stream: &mut S) -> Option<Vec<u8>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);

        let Some(header_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
        let content_length = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if buf.len() >= header_end + 4 + content_length {
            return Some(buf);
        }
    }
}

fn config_for(server: &FakeLicenseServer) -> VerifierConfig {
    let mut config = VerifierConfig::new(PRODUCT);
    config.api_url = server.url();
    config
}

#[tokio::test]
async fn pinned_ca_is_trusted() {
    let server = FakeLicenseServer::start().await;
    let roots = TrustRoots::from_pem(CA_PEM).unwrap();
    let verifier = Verifier::with_trust_roots(config_for(&server), &roots).unwrap();

    let response = verifier.verify(LICENSE).await.unwrap();
    assert!(response.success);
    assert_eq!(server.served(), 1);
}

#[tokio::test]
async fn untrusted_certificate_is_rejected_before_classification() {
    let server = FakeLicenseServer::start().await;
    let verifier = Verifier::with_config(config_for(&server)).unwrap();

    let err = verifier.verify(LICENSE).await.unwrap_err();
    assert!(
        matches!(err, GumwardenError::TransportFailure(_)),
        "MITM was successful: {err}"
    );
    assert_eq!(server.served(), 0);
}

#[tokio::test]
async fn swapping_back_to_pinned_client_blocks_interception() {
    let server = FakeLicenseServer::start().await;
    let pinned = Verifier::with_config(config_for(&server)).unwrap();

    // A client that trusts the interceptor works...
    let roots = TrustRoots::from_pem(CA_PEM).unwrap();
    let trusting = Verifier::with_trust_roots(config_for(&server), &roots).unwrap();
    let mut verifier = pinned.clone();
    verifier.client = trusting.client.clone();
    assert!(verifier.verify(LICENSE).await.is_ok());

    // ...and restoring the original client shuts it out again.
    verifier.client = pinned.client.clone();
    let err = verifier.verify(LICENSE).await.unwrap_err();
    assert!(matches!(err, GumwardenError::TransportFailure(_)));
    assert_eq!(server.served(), 1);
}

#[tokio::test]
async fn empty_trust_store_rejects_everything() {
    let server = FakeLicenseServer::start().await;
    let verifier = Verifier::with_trust_roots(config_for(&server), &TrustRoots::default()).unwrap();

    let err = verifier.verify(LICENSE).await.unwrap_err();
    assert!(matches!(err, GumwardenError::TransportFailure(_)));
    assert_eq!(server.served(), 0);
}
