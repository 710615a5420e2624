pub mod me;
pub mod webhooks;
