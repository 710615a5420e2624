pub mod health;
pub mod me;
pub mod not_found;
pub mod webhooks;
