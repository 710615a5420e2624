/*
 * Responsibility
 * - The authenticated caller as seen by handlers (VerifiedUserContext)
 * - Only the verifier can build one; fields are read-only afterwards
 */
use std::fmt;

/// A caller whose bearer token has been verified for this request.
///
/// - `available_roles` keeps the order the trust source presented them in
/// - `raw_token` is kept so downstream calls can act on behalf of the user
#[derive(Clone, PartialEq, Eq)]
pub struct VerifiedUserContext {
    client_id: String,
    available_roles: Vec<String>,
    username: Option<String>,
    raw_token: String,
}

impl VerifiedUserContext {
    pub(crate) fn new(
        client_id: String,
        available_roles: Vec<String>,
        username: Option<String>,
        raw_token: String,
    ) -> Self {
        Self {
            client_id,
            available_roles,
            username,
            raw_token,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn available_roles(&self) -> &[String] {
        &self.available_roles
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn raw_token(&self) -> &str {
        &self.raw_token
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.available_roles.iter().any(|r| r == role)
    }
}

impl fmt::Debug for VerifiedUserContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print the bearer token
        f.debug_struct("VerifiedUserContext")
            .field("client_id", &self.client_id)
            .field("available_roles", &self.available_roles)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}
