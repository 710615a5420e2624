/*
 * Responsibility
 * - Per-route role requirement (RoleRequirement)
 * - Decide whether a (possibly absent) caller satisfies it
 */
use crate::error::{AuthError, InvalidTokenReason};
use crate::services::auth::context::VerifiedUserContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleRequirement {
    /// No token needed.
    Anonymous,
    /// Caller must hold at least one of these roles. Empty means any verified caller.
    AnyOf(Vec<String>),
}

impl RoleRequirement {
    pub fn any_of<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::AnyOf(roles.into_iter().map(Into::into).collect())
    }

    pub fn authenticated() -> Self {
        Self::AnyOf(Vec::new())
    }

    pub fn allows_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }
}

pub fn authorize(
    user: Option<&VerifiedUserContext>,
    requirement: &RoleRequirement,
) -> Result<(), AuthError> {
    let required = match requirement {
        RoleRequirement::Anonymous => return Ok(()),
        RoleRequirement::AnyOf(required) => required,
    };

    let Some(user) = user else {
        return Err(AuthError::invalid_token(InvalidTokenReason::MissingToken));
    };

    if required.is_empty() || required.iter().any(|role| user.has_role(role)) {
        return Ok(());
    }

    Err(AuthError::InsufficientRoles {
        sufficient_roles: required.clone(),
        assigned_roles: user.available_roles().to_vec(),
    })
}
