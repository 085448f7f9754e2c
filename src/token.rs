// ABOUTME: Verification-free extraction of the expiry claim from a JWT
// The token is opaque to the client except for its expiry timestamp;
// signature verification is the server's job.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use thiserror::Error;

/// Errors from decoding a token's payload segment.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token is not a three-segment JWT")]
    MalformedStructure,

    #[error("Token payload is not valid base64url: {0}")]
    PayloadEncoding(#[from] base64::DecodeError),

    #[error("Token payload is not valid JSON: {0}")]
    PayloadJson(#[from] serde_json::Error),

    #[error("Token payload has no expiry claim")]
    MissingExpiry,

    #[error("Token expiry claim is out of range: {0}")]
    InvalidExpiry(i64),
}

/// Claims the client actually reads from an access token.
#[derive(Debug, Clone, Deserialize)]
struct RawClaims {
    /// Expiry, unix seconds (standard JWT `exp` claim).
    exp: Option<i64>,
}

/// Decode the expiry instant from a JWT without verifying its signature.
///
/// Splits the token into exactly three dot-separated segments, base64url
/// decodes the payload (no padding), and reads the `exp` claim.
pub fn decode_expiry(token: &str) -> Result<DateTime<Utc>, TokenError> {
    let mut segments = token.split('.');
    let payload = match (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) {
        (Some(_header), Some(payload), Some(_signature), None) => payload,
        _ => return Err(TokenError::MalformedStructure),
    };

    let bytes = URL_SAFE_NO_PAD.decode(payload)?;
    let claims: RawClaims = serde_json::from_slice(&bytes)?;
    let exp = claims.exp.ok_or(TokenError::MissingExpiry)?;

    Utc.timestamp_opt(exp, 0)
        .single()
        .ok_or(TokenError::InvalidExpiry(exp))
}
