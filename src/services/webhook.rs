/*
 * Responsibility
 * - HMAC-SHA256 check of inbound webhook payloads against a shared secret
 * - Signature arrives base64-encoded in the `X-oc-hash` header
 */
use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::AuthError;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-oc-hash";

/// Verify `provided_signature` (base64) is the HMAC-SHA256 of `payload` under `shared_secret`.
pub fn verify_signature(
    payload: &[u8],
    provided_signature: Option<&str>,
    shared_secret: &[u8],
) -> Result<(), AuthError> {
    let provided = provided_signature
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(AuthError::WebhookUnauthorized)?;

    let provided = STANDARD.decode(provided).map_err(|_| {
        tracing::debug!("webhook signature is not valid base64");
        AuthError::WebhookUnauthorized
    })?;

    let mut mac =
        HmacSha256::new_from_slice(shared_secret).map_err(|_| AuthError::WebhookUnauthorized)?;
    mac.update(payload);
    mac.verify_slice(&provided)
        .map_err(|_| AuthError::WebhookUnauthorized)
}

#[derive(Clone)]
pub struct WebhookVerifier {
    secret: Vec<u8>,
}

impl fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookVerifier").finish_non_exhaustive()
    }
}

impl WebhookVerifier {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn verify(&self, payload: &[u8], provided_signature: Option<&str>) -> Result<(), AuthError> {
        verify_signature(payload, provided_signature, &self.secret)
    }
}
