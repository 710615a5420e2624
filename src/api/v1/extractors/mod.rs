/**
 * Responsibility
 *  - Extractors handlers use to read what middleware established
 */
mod auth_ctx;

pub use auth_ctx::UserCtx;
