/*!
 * Verified user context extractor
 *
 * Responsibility:
 * - Hand the `VerifiedUserContext` placed in request extensions by the access guard to handlers
 * - The context type itself lives in services::auth; this module only holds the axum glue
 */

mod core;

pub use self::core::UserCtx;
