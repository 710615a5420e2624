//! Bearer token → `VerifiedUserContext` in request extensions, gated by a role requirement.
//!
//! The guard runs before the handler: it verifies the token (offline or online,
//! see `UserContextVerifier`), checks the route's `RoleRequirement`, and only
//! then lets the request through. Handlers read the context with `UserCtx`.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::error::{AuthError, InvalidTokenReason};
use crate::services::auth::{RoleRequirement, authorize};
use crate::state::AppState;

#[derive(Clone)]
struct AccessGuard {
    state: AppState,
    requirement: Arc<RoleRequirement>,
}

/// Guard every route currently in `router` with `requirement`.
///
/// ```ignore
/// let me = Router::new().route("/me", get(me));
/// let me = middleware::auth::access::apply(me, state.clone(), RoleRequirement::any_of(["Shopper"]));
/// ```
pub fn apply(
    router: Router<AppState>,
    state: AppState,
    requirement: RoleRequirement,
) -> Router<AppState> {
    let guard = AccessGuard {
        state,
        requirement: Arc::new(requirement),
    };
    router.layer(middleware::from_fn_with_state(guard, access_middleware))
}

async fn access_middleware(
    State(guard): State<AccessGuard>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    if guard.requirement.allows_anonymous() {
        return Ok(next.run(req).await);
    }

    let Some(token) = bearer_token(req.headers()) else {
        let err = AuthError::invalid_token(InvalidTokenReason::MissingToken);
        log_rejection(&err);
        return Err(err);
    };

    let user = guard
        .state
        .verifier
        .verify(token, &guard.state.accepted_client_ids)
        .await
        .inspect_err(log_rejection)?;

    authorize(Some(&user), &guard.requirement).inspect_err(log_rejection)?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

// `Authorization: Bearer <token>`, scheme matched case-insensitively.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("Bearer") && !token.is_empty()).then_some(token)
}

fn log_rejection(err: &AuthError) {
    match err {
        AuthError::InvalidToken(reason) => {
            tracing::warn!(reason = %reason, "access token rejected");
        }
        AuthError::InsufficientRoles { .. } => {
            tracing::warn!(error = ?err, "caller lacks required roles");
        }
        _ => {
            tracing::warn!(code = err.code(), error = %err, "access check failed");
        }
    }
}
