/*
 * Responsibility
 * - GET /me response: the verified caller without the bearer token
 */
use serde::Serialize;

use crate::services::auth::VerifiedUserContext;

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MeResponse {
    #[serde(rename = "ClientID")]
    pub client_id: String,
    pub username: Option<String>,
    pub available_roles: Vec<String>,
}

impl From<&VerifiedUserContext> for MeResponse {
    fn from(ctx: &VerifiedUserContext) -> Self {
        Self {
            client_id: ctx.client_id().to_string(),
            username: ctx.username().map(str::to_string),
            available_roles: ctx.available_roles().to_vec(),
        }
    }
}
