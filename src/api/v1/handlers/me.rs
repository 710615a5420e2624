/*
 * Responsibility
 * - GET /me: echo the verified caller (client id, username, roles)
 * - Guarded by the access middleware; the handler itself only reads UserCtx
 */
use axum::Json;

use crate::api::v1::{dto::me::MeResponse, extractors::UserCtx};

pub async fn me(UserCtx(user): UserCtx) -> Json<MeResponse> {
    Json(MeResponse::from(&user))
}
