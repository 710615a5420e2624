/*
 * Responsibility
 * - The single typed error used by every verification / authorization path
 * - IntoResponse: HTTP status + `{ Message, ErrorCode, Data }` body
 * - Identity source errors are carried through untouched (Upstream)
 */
use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::services::identity::IdentityError;

/// Why a bearer token was rejected.
///
/// Only used for logs; callers always see the same `InvalidToken` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidTokenReason {
    MissingToken,
    Malformed,
    UnsupportedAlgorithm,
    InvalidPublicKey,
    BadSignature,
    Expired,
    NotYetValid,
    MissingClientId,
    ClientIdNotAccepted,
    Inactive,
}

impl fmt::Display for InvalidTokenReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MissingToken => "missing bearer token",
            Self::Malformed => "malformed token",
            Self::UnsupportedAlgorithm => "unsupported signing algorithm",
            Self::InvalidPublicKey => "unusable public key",
            Self::BadSignature => "signature verification failed",
            Self::Expired => "token expired",
            Self::NotYetValid => "token not yet valid",
            Self::MissingClientId => "token has no client id",
            Self::ClientIdNotAccepted => "client id not accepted",
            Self::Inactive => "identity source reports token inactive",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Access token is invalid or expired.")]
    InvalidToken(InvalidTokenReason),

    #[error("Unauthorized")]
    WebhookUnauthorized,

    #[error("User does not have role(s) required to perform this action.")]
    InsufficientRoles {
        sufficient_roles: Vec<String>,
        assigned_roles: Vec<String>,
    },

    #[error("Field {0} is required")]
    RequiredField(String),

    #[error("{type_name}.{property}")]
    InvalidProperty { type_name: String, property: String },

    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    UserContext(String),

    #[error("Request body exceeds {0} bytes.")]
    PayloadTooLarge(usize),

    #[error("{object_type} with ID {object_id} not found")]
    NotFound {
        object_type: String,
        object_id: String,
    },

    #[error(transparent)]
    Upstream(#[from] IdentityError),
}

impl AuthError {
    pub fn invalid_token(reason: InvalidTokenReason) -> Self {
        Self::InvalidToken(reason)
    }

    pub fn not_found(object_type: impl Into<String>, object_id: impl Into<String>) -> Self {
        Self::NotFound {
            object_type: object_type.into(),
            object_id: object_id.into(),
        }
    }

    pub fn invalid_property(type_name: impl Into<String>, property: impl Into<String>) -> Self {
        Self::InvalidProperty {
            type_name: type_name.into(),
            property: property.into(),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::InvalidToken(_) => "InvalidToken",
            Self::WebhookUnauthorized => "Unauthorized",
            Self::InsufficientRoles { .. } => "InsufficientRoles",
            Self::RequiredField(_) => "RequiredField",
            Self::InvalidProperty { .. } => "InvalidProperty",
            Self::InvalidRequest(_) => "InvalidRequest",
            Self::UserContext(_) => "UserContextError",
            Self::PayloadTooLarge(_) => "PayloadTooLarge",
            Self::NotFound { .. } => "NotFound",
            Self::Upstream(e) => e.code.as_str(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidToken(_) | Self::WebhookUnauthorized => StatusCode::UNAUTHORIZED,
            Self::InsufficientRoles { .. } => StatusCode::FORBIDDEN,
            Self::RequiredField(_)
            | Self::InvalidProperty { .. }
            | Self::InvalidRequest(_)
            | Self::UserContext(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            // An upstream status we cannot represent is still an upstream failure.
            Self::Upstream(e) => StatusCode::from_u16(e.status).unwrap_or(StatusCode::BAD_GATEWAY),
        }
    }

    pub fn data(&self) -> Option<Value> {
        match self {
            Self::InsufficientRoles {
                sufficient_roles,
                assigned_roles,
            } => Some(json!({
                "SufficientRoles": sufficient_roles,
                "AssignedRoles": assigned_roles,
            })),
            Self::NotFound {
                object_type,
                object_id,
            } => Some(json!({
                "ObjectType": object_type,
                "ObjectID": object_id,
            })),
            Self::Upstream(e) => e.data.clone(),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorResponse {
    pub message: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl From<&AuthError> for ErrorResponse {
    fn from(err: &AuthError) -> Self {
        Self {
            message: err.to_string(),
            error_code: err.code().to_string(),
            data: err.data(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse::from(&self);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(err: AuthError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[test]
    fn taxonomy_codes_and_statuses() {
        let cases = [
            (
                AuthError::invalid_token(InvalidTokenReason::Expired),
                "InvalidToken",
                401,
            ),
            (AuthError::WebhookUnauthorized, "Unauthorized", 401),
            (
                AuthError::InsufficientRoles {
                    sufficient_roles: vec![],
                    assigned_roles: vec![],
                },
                "InsufficientRoles",
                403,
            ),
            (AuthError::RequiredField("Route".into()), "RequiredField", 400),
            (
                AuthError::invalid_property("WebhookPayload", "Verb"),
                "InvalidProperty",
                400,
            ),
            (AuthError::InvalidRequest("bad".into()), "InvalidRequest", 400),
            (AuthError::UserContext("none".into()), "UserContextError", 400),
            (AuthError::PayloadTooLarge(64), "PayloadTooLarge", 413),
            (AuthError::not_found("Route", "/x"), "NotFound", 404),
        ];

        for (err, code, status) in cases {
            assert_eq!(err.code(), code);
            assert_eq!(err.status().as_u16(), status, "{code}");
        }
    }

    #[test]
    fn invalid_token_message_hides_reason() {
        let err = AuthError::invalid_token(InvalidTokenReason::BadSignature);
        assert_eq!(err.to_string(), "Access token is invalid or expired.");
    }

    #[test]
    fn upstream_error_is_forwarded_verbatim() {
        let err = AuthError::from(IdentityError::new(500, "InternalServerError", "boom"));
        assert_eq!(err.code(), "InternalServerError");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn upstream_error_with_unrepresentable_status_becomes_bad_gateway() {
        let err = AuthError::from(IdentityError::new(42, "Weird", "odd status"));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.code(), "Weird");
    }

    #[tokio::test]
    async fn insufficient_roles_body_carries_role_data() {
        let (status, body) = body_json(AuthError::InsufficientRoles {
            sufficient_roles: vec!["Shopper".into()],
            assigned_roles: vec!["CustomRole".into()],
        })
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["ErrorCode"], "InsufficientRoles");
        assert_eq!(
            body["Message"],
            "User does not have role(s) required to perform this action."
        );
        assert_eq!(body["Data"]["SufficientRoles"], json!(["Shopper"]));
        assert_eq!(body["Data"]["AssignedRoles"], json!(["CustomRole"]));
    }

    #[tokio::test]
    async fn body_omits_data_when_absent() {
        let (status, body) = body_json(AuthError::RequiredField("Route".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["Message"], "Field Route is required");
        assert!(body.get("Data").is_none());
    }

    #[tokio::test]
    async fn not_found_body_names_object() {
        let (_, body) = body_json(AuthError::not_found("Route", "/api/v1/nope")).await;
        assert_eq!(body["Message"], "Route with ID /api/v1/nope not found");
        assert_eq!(body["Data"]["ObjectID"], "/api/v1/nope");
    }
}
