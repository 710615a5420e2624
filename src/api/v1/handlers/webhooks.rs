/*
 * Responsibility
 * - POST /webhooks: accept a signed platform webhook
 * - Signature is already checked by middleware; here only payload validation
 */
use axum::{Json, body::Bytes};

use crate::{
    api::v1::dto::webhooks::{WebhookAck, WebhookPayload},
    error::AuthError,
};

pub async fn receive_webhook(body: Bytes) -> Result<Json<WebhookAck>, AuthError> {
    let payload: WebhookPayload = serde_json::from_slice(&body).map_err(|err| {
        tracing::debug!(error = %err, "webhook payload is not valid JSON");
        AuthError::InvalidRequest("Webhook payload must be a JSON object.".to_string())
    })?;

    let verb = payload.validate()?;
    let route = payload.route.unwrap_or_default();

    tracing::info!(route = %route, verb = %verb, log_id = ?payload.log_id, "webhook received");

    Ok(Json(WebhookAck {
        received: true,
        route,
        verb,
        log_id: payload.log_id,
    }))
}
