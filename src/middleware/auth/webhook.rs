//! Webhook signature guard.
//!
//! Buffers the request body (bounded by the configured limit), checks the
//! `X-oc-hash` HMAC against those exact bytes, and hands the same bytes to the handler.

use std::error::Error as _;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};
use http_body_util::LengthLimitError;

use crate::error::AuthError;
use crate::services::webhook::SIGNATURE_HEADER;
use crate::state::AppState;

pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, webhook_middleware))
}

async fn webhook_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let (parts, body) = req.into_parts();

    let payload = axum::body::to_bytes(body, state.body_limit_bytes)
        .await
        .map_err(|err| {
            if exceeds_limit(&err) {
                tracing::warn!(limit = state.body_limit_bytes, "webhook body too large");
                AuthError::PayloadTooLarge(state.body_limit_bytes)
            } else {
                tracing::warn!(error = %err, "webhook body could not be read");
                AuthError::InvalidRequest("Request body could not be read.".to_string())
            }
        })?;

    let signature = parts
        .headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    if let Err(err) = state.webhook.verify(&payload, signature) {
        tracing::warn!(
            path = %parts.uri.path(),
            has_signature = signature.is_some(),
            "webhook signature rejected"
        );
        return Err(err);
    }

    Ok(next.run(Request::from_parts(parts, Body::from(payload))).await)
}

// Bodies without a Content-Length only hit the limit while streaming.
fn exceeds_limit(err: &axum::Error) -> bool {
    let mut cause = err.source();
    while let Some(e) = cause {
        if e.is::<LengthLimitError>() {
            return true;
        }
        cause = e.source();
    }
    false
}
