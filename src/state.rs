/*
 * Responsibility
 * - Shared context attached to the Router (AppState)
 *   - verifier (with its caches), webhook secret, accepted client ids
 * - Cloned per request, so everything inside is Arc / cheap to clone
 */
use std::sync::Arc;

use crate::services::auth::UserContextVerifier;
use crate::services::webhook::WebhookVerifier;

#[derive(Clone, Debug)]
pub struct AppState {
    pub verifier: Arc<UserContextVerifier>,
    pub webhook: Arc<WebhookVerifier>,
    pub accepted_client_ids: Arc<[String]>,
    pub body_limit_bytes: usize,
}

impl AppState {
    pub fn new(
        verifier: Arc<UserContextVerifier>,
        webhook: WebhookVerifier,
        accepted_client_ids: Vec<String>,
        body_limit_bytes: usize,
    ) -> Self {
        Self {
            verifier,
            webhook: Arc::new(webhook),
            accepted_client_ids: accepted_client_ids.into(),
            body_limit_bytes,
        }
    }
}
