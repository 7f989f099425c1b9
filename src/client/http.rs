//! Single verify request against the license endpoint.

use crate::config::RequestSchema;
use crate::GumwardenError;
use reqwest::header::ACCEPT;
use reqwest::Client;
use tracing::warn;

/// Raw HTTP reply: status plus undecoded body.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,

    /// Raw response body.
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Provider side fault worth retrying.
    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }

    /// Body as text for diagnostics, lossy on invalid UTF-8.
    pub fn body_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// One form-encoded verify request.
#[derive(Debug, Clone, Copy)]
pub struct VerifyRequest<'a> {
    /// Endpoint URL.
    pub url: &'a str,
    /// Product identifier or permalink.
    pub product_id: &'a str,
    /// License key to check.
    pub license_key: &'a str,
    /// Decides the product field name.
    pub schema: RequestSchema,
}

impl VerifyRequest<'_> {
    /// Form fields in submission order.
    pub fn form(&self) -> [(&'static str, &str); 2] {
        [
            (self.schema.product_field(), self.product_id),
            ("license_key", self.license_key),
        ]
    }
}

/// Send one request and read the full body.
///
/// Any failure to connect, complete the handshake, or read the body is a
/// [`GumwardenError::TransportFailure`]. Status codes are not interpreted.
pub async fn send_verify(
    client: &Client,
    request: &VerifyRequest<'_>,
) -> Result<RawResponse, GumwardenError> {
    let response = client
        .post(request.url)
        .header(ACCEPT, "application/json")
        .form(&request.form())
        .send()
        .await
        .map_err(|e| {
            warn!(url = %request.url, error = %e, "license request failed");
            GumwardenError::TransportFailure(e)
        })?;

    let status = response.status().as_u16();
    let body = response
        .bytes()
        .await
        .map_err(|e| {
            warn!(url = %request.url, status, error = %e, "failed to read license response body");
            GumwardenError::TransportFailure(e)
        })?
        .to_vec();

    Ok(RawResponse { status, body })
}
