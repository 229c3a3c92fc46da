//! HMAC-SHA256 request signing for the LN Markets API.
//!
//! The signature payload is `timestamp + UPPERCASE(method) + path + params`,
//! where `params` is the URL-encoded query string for GET/DELETE or the raw
//! JSON body for POST/PUT, never both. The digest is Base64-encoded.

use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// Refusing to produce a MAC over an empty key.
    #[error("signing secret is empty")]
    EmptySecret,
}

/// Sign one request. Deterministic: same inputs always yield the same
/// signature. The `path` must be the full request path including the API
/// version prefix (e.g. `/v2/user`).
pub fn sign(
    secret: &str,
    timestamp: &str,
    method: &str,
    path: &str,
    params: &str,
) -> Result<String, SignatureError> {
    if secret.is_empty() {
        return Err(SignatureError::EmptySecret);
    }

    let payload = format!("{}{}{}{}", timestamp, method.to_uppercase(), path, params);
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(payload.as_bytes());
    Ok(base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
}
