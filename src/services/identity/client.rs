//! Identity source interface used by the user-context verifier.
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// An error reported by (or on the way to) the identity source.
///
/// The verifier forwards these unchanged, so `code`/`status`/`message` are
/// exactly what the caller will see.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{message}")]
pub struct IdentityError {
    pub code: String,
    pub status: u16,
    pub message: String,
    pub data: Option<Value>,
}

impl IdentityError {
    pub fn new(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            status,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// RSA signing key as published by the identity source (JWK members).
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PublicKey {
    pub kty: String,
    #[serde(default)]
    pub kid: Option<String>,
    pub n: String,
    pub e: String,
}

/// Who-am-I response for a bearer token.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct CallerProfile {
    pub active: bool,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, rename = "ClientID")]
    pub client_id: Option<String>,
    #[serde(default)]
    pub available_roles: Vec<String>,
}

/// The two identity-source calls the verifier depends on.
///
/// Implementations own their transport concerns (timeouts, TLS, retries);
/// the verifier only sees the final result.
#[async_trait]
pub trait IdentityClient: Send + Sync + 'static {
    // Fetch the public key published under `key_id`.
    async fn public_key(&self, key_id: &str) -> Result<PublicKey, IdentityError>;

    // Present the raw bearer token to the identity source and return who it belongs to.
    async fn caller_profile(&self, raw_token: &str) -> Result<CallerProfile, IdentityError>;
}
