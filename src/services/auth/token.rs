//! Bearer token decoding (no signature verification).
//!
//! `decode` only answers "is this a well-formed JWS compact token, and what
//! does it claim?". Whether those claims can be trusted is decided by the
//! verifier.
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(&'static str),
}

/// Claims as read from the token, unverified.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodedTokenClaims {
    pub signing_key_id: Option<String>,
    pub algorithm: Option<String>,
    pub subject: Option<String>,
    pub client_id: Option<String>,
    pub roles: Vec<String>,
    pub username: Option<String>,
    pub issued_at: Option<DateTime<Utc>>,
    pub not_valid_before: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct RawHeader {
    #[serde(default)]
    alg: Option<String>,
    #[serde(default)]
    kid: Option<String>,
}

// `role` is a plain string when the token carries a single role.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RoleClaim {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct RawClaims {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    cid: Option<String>,
    #[serde(default)]
    role: Option<RoleClaim>,
    #[serde(default)]
    usr: Option<String>,
    #[serde(default)]
    iat: Option<i64>,
    #[serde(default)]
    nbf: Option<i64>,
    #[serde(default)]
    exp: Option<i64>,
}

pub fn decode(raw_token: &str) -> Result<DecodedTokenClaims, TokenError> {
    let mut segments = raw_token.split('.');
    let (Some(header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(TokenError::Malformed("expected three segments"));
    };

    if header.is_empty() || payload.is_empty() {
        return Err(TokenError::Malformed("empty segment"));
    }

    let header: RawHeader = decode_segment(header, "header")?;
    let claims: RawClaims = decode_segment(payload, "payload")?;

    let roles = match claims.role {
        Some(RoleClaim::One(role)) => vec![role],
        Some(RoleClaim::Many(roles)) => roles,
        None => Vec::new(),
    };

    Ok(DecodedTokenClaims {
        signing_key_id: header.kid.filter(|kid| !kid.is_empty()),
        algorithm: header.alg,
        subject: claims.sub,
        client_id: claims.cid.filter(|cid| !cid.is_empty()),
        roles,
        username: claims.usr,
        issued_at: timestamp(claims.iat)?,
        not_valid_before: timestamp(claims.nbf)?,
        expires_at: timestamp(claims.exp)?,
    })
}

fn decode_segment<T: serde::de::DeserializeOwned>(
    segment: &str,
    name: &'static str,
) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::Malformed(name))?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed(name))
}

fn timestamp(seconds: Option<i64>) -> Result<Option<DateTime<Utc>>, TokenError> {
    seconds
        .map(|s| DateTime::from_timestamp(s, 0).ok_or(TokenError::Malformed("timestamp out of range")))
        .transpose()
}
