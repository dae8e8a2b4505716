//! Webhook signature verification
//!
//! HMAC-SHA256 over the raw body, compared in constant time with the
//! signature the provider sent in a header.

use super::types::{VerificationParams, WebhookRequest};
use crate::error::{Error, Result};
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

/// How the signature header value is encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureEncoding {
    #[default]
    Hex,
    Base64,
}

/// Verifies signed webhook deliveries
#[derive(Debug, Clone)]
pub struct HmacVerifier {
    header: String,
    encoding: SignatureEncoding,
    /// Scheme prefix before the digest, e.g. `sha256=`
    prefix: Option<String>,
}

impl HmacVerifier {
    /// Hex-encoded signature in the given header
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            encoding: SignatureEncoding::Hex,
            prefix: None,
        }
    }

    #[must_use]
    pub fn encoding(mut self, encoding: SignatureEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    /// `Ok(true)` when the signature matches
    ///
    /// A missing header is `MissingSignature`. An undecodable or wrong
    /// signature is `InvalidSignature`, and so is any signature checked
    /// against an empty secret.
    pub fn verify(&self, request: &WebhookRequest, params: &VerificationParams) -> Result<bool> {
        let value = request
            .headers
            .get(self.header.as_str())
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(Error::MissingSignature)?;

        let value = match &self.prefix {
            Some(prefix) => value.strip_prefix(prefix.as_str()).unwrap_or(value),
            None => value,
        };

        let signature = match self.encoding {
            SignatureEncoding::Hex => hex::decode(value).map_err(|_| Error::InvalidSignature)?,
            SignatureEncoding::Base64 => base64::engine::general_purpose::STANDARD
                .decode(value)
                .map_err(|_| Error::InvalidSignature)?,
        };

        if params.secret.is_empty() {
            debug!("No webhook secret to verify against");
            return Err(Error::InvalidSignature);
        }
        verify_hmac_sha256(params.secret.as_bytes(), &request.body, &signature)?;
        Ok(true)
    }
}

/// Constant-time check of an HMAC-SHA256 signature
pub fn verify_hmac_sha256(secret: &[u8], body: &[u8], signature: &[u8]) -> Result<()> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| Error::InvalidSignature)?;
    mac.update(body);
    mac.verify_slice(signature).map_err(|_| {
        debug!("Webhook signature mismatch");
        Error::InvalidSignature
    })
}

/// Hex-encoded HMAC-SHA256 of a body
pub fn sign_hex(secret: &[u8], body: &[u8]) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|e| Error::Other(e.to_string()))?;
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}
