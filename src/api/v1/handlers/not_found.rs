/*
 * Responsibility
 * - Router fallback: any unmatched path is a NotFound for object type "Route"
 */
use axum::extract::OriginalUri;

use crate::error::AuthError;

pub async fn not_found(OriginalUri(uri): OriginalUri) -> AuthError {
    AuthError::not_found("Route", uri.path())
}
