use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AuthError;
use crate::services::auth::VerifiedUserContext;
use crate::state::AppState;

/// Extractor for the caller verified by `middleware::auth::access`.
///
/// Only valid on guarded routes. Without a context (route not guarded, or
/// guarded as anonymous) the request fails with `UserContextError`.
pub struct UserCtx(pub VerifiedUserContext);

impl FromRequestParts<AppState> for UserCtx {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<VerifiedUserContext>()
            .cloned()
            .map(UserCtx)
            .ok_or_else(|| {
                AuthError::UserContext(
                    "No verified user context is available for this request.".to_string(),
                )
            })
    }
}
