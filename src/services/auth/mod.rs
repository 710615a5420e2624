pub mod context;
pub mod factory;
pub mod roles;
pub mod token;
pub mod verifier;

pub use context::VerifiedUserContext;
pub use factory::build_user_context_verifier;
pub use roles::{RoleRequirement, authorize};
pub use verifier::UserContextVerifier;
