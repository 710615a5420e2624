//! Bearer token → `VerifiedUserContext`.
//!
//! Trust is established one of two ways, chosen up front from the decoded
//! token (`VerificationStrategy`):
//!
//! - **Offline**: the token names a signing key (`kid`). The key is fetched
//!   from the identity source (memoized per kid) and the RSA signature is
//!   checked locally.
//! - **Online**: no `kid`. The token is presented to the identity source's
//!   who-am-I call (memoized per raw token) and the answer is authoritative
//!   for roles, username and client id.
//!
//! After either path the `nbf`/`exp` window and the client id are checked on
//! every call, cache hit or not, so a cached lookup never extends the life of
//! a token.
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use tracing::{debug, warn};

use crate::error::{AuthError, InvalidTokenReason};
use crate::services::auth::context::VerifiedUserContext;
use crate::services::auth::token::{self, DecodedTokenClaims};
use crate::services::cache::VerificationCache;
use crate::services::identity::{CallerProfile, IdentityClient, PublicKey};

pub type PublicKeyCache = VerificationCache<String, PublicKey, AuthError>;
pub type ProfileCache = VerificationCache<String, CallerProfile, AuthError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationStrategy {
    Offline { key_id: String, algorithm: Algorithm },
    Online,
}

impl VerificationStrategy {
    pub fn select(claims: &DecodedTokenClaims) -> Result<Self, InvalidTokenReason> {
        let Some(key_id) = claims.signing_key_id.clone() else {
            return Ok(Self::Online);
        };

        // Only asymmetric RSA keys are published by the identity source.
        let algorithm = claims
            .algorithm
            .as_deref()
            .and_then(|alg| Algorithm::from_str(alg).ok())
            .filter(|alg| {
                matches!(
                    alg,
                    Algorithm::RS256
                        | Algorithm::RS384
                        | Algorithm::RS512
                        | Algorithm::PS256
                        | Algorithm::PS384
                        | Algorithm::PS512
                )
            })
            .ok_or(InvalidTokenReason::UnsupportedAlgorithm)?;

        Ok(Self::Offline { key_id, algorithm })
    }
}

// Caller identity once trust is established, before window / client checks.
struct TrustedIdentity {
    client_id: Option<String>,
    roles: Vec<String>,
    username: Option<String>,
}

pub struct UserContextVerifier {
    identity: Arc<dyn IdentityClient>,
    public_keys: PublicKeyCache,
    profiles: ProfileCache,
}

impl std::fmt::Debug for UserContextVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserContextVerifier")
            .field("public_keys", &self.public_keys)
            .field("profiles", &self.profiles)
            .finish_non_exhaustive()
    }
}

impl UserContextVerifier {
    pub fn new(
        identity: Arc<dyn IdentityClient>,
        public_key_ttl: Duration,
        token_ttl: Duration,
    ) -> Self {
        Self {
            identity,
            public_keys: VerificationCache::new("public_keys", public_key_ttl),
            profiles: VerificationCache::new("caller_profiles", token_ttl),
        }
    }

    pub async fn verify(
        &self,
        raw_token: &str,
        accepted_client_ids: &[String],
    ) -> Result<VerifiedUserContext, AuthError> {
        if raw_token.is_empty() {
            return Err(AuthError::invalid_token(InvalidTokenReason::MissingToken));
        }

        let claims = token::decode(raw_token).map_err(|e| {
            debug!(error = %e, "bearer token could not be decoded");
            AuthError::invalid_token(InvalidTokenReason::Malformed)
        })?;

        let strategy =
            VerificationStrategy::select(&claims).map_err(AuthError::invalid_token)?;

        let trusted = match strategy {
            VerificationStrategy::Offline { key_id, algorithm } => {
                self.verify_offline(raw_token, &claims, key_id, algorithm)
                    .await?
            }
            VerificationStrategy::Online => self.verify_online(raw_token, &claims).await?,
        };

        check_time_window(&claims, Utc::now()).map_err(AuthError::invalid_token)?;

        let client_id = accept_client_id(trusted.client_id, accepted_client_ids)
            .map_err(AuthError::invalid_token)?;

        Ok(VerifiedUserContext::new(
            client_id,
            trusted.roles,
            trusted.username,
            raw_token.to_owned(),
        ))
    }

    async fn verify_offline(
        &self,
        raw_token: &str,
        claims: &DecodedTokenClaims,
        key_id: String,
        algorithm: Algorithm,
    ) -> Result<TrustedIdentity, AuthError> {
        let identity = Arc::clone(&self.identity);
        let kid = key_id.clone();
        let public_key = self
            .public_keys
            .get_or_try_insert_with(key_id.clone(), move || async move {
                identity.public_key(&kid).await.map_err(AuthError::from)
            })
            .await?;

        let decoding_key = decoding_key(&public_key).ok_or_else(|| {
            warn!(key_id = %key_id, kty = %public_key.kty, "identity source returned an unusable public key");
            AuthError::invalid_token(InvalidTokenReason::InvalidPublicKey)
        })?;

        // The time window is checked separately so it applies to both paths alike.
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        jsonwebtoken::decode::<serde_json::Value>(raw_token, &decoding_key, &validation).map_err(
            |e| {
                debug!(key_id = %key_id, error = %e, "token signature rejected");
                AuthError::invalid_token(InvalidTokenReason::BadSignature)
            },
        )?;

        Ok(TrustedIdentity {
            client_id: claims.client_id.clone(),
            roles: claims.roles.clone(),
            username: claims.username.clone(),
        })
    }

    async fn verify_online(
        &self,
        raw_token: &str,
        claims: &DecodedTokenClaims,
    ) -> Result<TrustedIdentity, AuthError> {
        let identity = Arc::clone(&self.identity);
        let token = raw_token.to_owned();
        let profile = self
            .profiles
            .get_or_try_insert_with(raw_token.to_owned(), move || async move {
                let profile = identity
                    .caller_profile(&token)
                    .await
                    .map_err(AuthError::from)?;
                // An inactive answer is a failed verification and must not be cached.
                if !profile.active {
                    return Err(AuthError::invalid_token(InvalidTokenReason::Inactive));
                }
                Ok(profile)
            })
            .await?;

        Ok(TrustedIdentity {
            client_id: profile.client_id.or_else(|| claims.client_id.clone()),
            roles: profile.available_roles,
            username: profile.username.or_else(|| claims.username.clone()),
        })
    }
}

fn decoding_key(public_key: &PublicKey) -> Option<DecodingKey> {
    if !public_key.kty.eq_ignore_ascii_case("RSA") {
        return None;
    }
    DecodingKey::from_rsa_components(&public_key.n, &public_key.e).ok()
}

fn check_time_window(
    claims: &DecodedTokenClaims,
    now: DateTime<Utc>,
) -> Result<(), InvalidTokenReason> {
    if claims.not_valid_before.is_some_and(|nbf| now < nbf) {
        return Err(InvalidTokenReason::NotYetValid);
    }
    if claims.expires_at.is_some_and(|exp| now >= exp) {
        return Err(InvalidTokenReason::Expired);
    }
    Ok(())
}

fn accept_client_id(
    client_id: Option<String>,
    accepted_client_ids: &[String],
) -> Result<String, InvalidTokenReason> {
    let client_id = client_id
        .filter(|cid| !cid.is_empty())
        .ok_or(InvalidTokenReason::MissingClientId)?;

    if accepted_client_ids
        .iter()
        .any(|accepted| accepted.eq_ignore_ascii_case(&client_id))
    {
        Ok(client_id)
    } else {
        Err(InvalidTokenReason::ClientIdNotAccepted)
    }
}
