/*
 * Responsibility
 * - v1 URL structure
 * - Each group declares its own guard: anonymous, role-gated, or webhook-signed
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::v1::handlers::{health::health, me::me, webhooks::receive_webhook};
use crate::middleware::auth::{access, webhook};
use crate::services::auth::RoleRequirement;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let public = Router::new().route("/health", get(health));

    let account = access::apply(
        Router::new().route("/me", get(me)),
        state.clone(),
        RoleRequirement::any_of(["Shopper", "FullAccess"]),
    );

    let webhooks = webhook::apply(
        Router::new().route("/webhooks", post(receive_webhook)),
        state,
    );

    // `public` first: merge keeps the first router's (unguarded) fallback.
    public.merge(account).merge(webhooks)
}
