//! Factory: build `UserContextVerifier` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::UserContextVerifier;
use crate::services::identity::{HttpIdentityClient, IdentityClient};

pub fn build_user_context_verifier(
    config: &Config,
) -> Result<Arc<UserContextVerifier>, reqwest::Error> {
    let identity: Arc<dyn IdentityClient> = Arc::new(HttpIdentityClient::new(
        config.identity_api_url.clone(),
        config.identity_auth_url.clone(),
        config.identity_timeout,
    )?);

    Ok(Arc::new(UserContextVerifier::new(
        identity,
        config.public_key_cache_ttl,
        config.token_cache_ttl,
    )))
}
