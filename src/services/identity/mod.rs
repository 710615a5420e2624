pub mod client;
pub mod http;

pub use client::{CallerProfile, IdentityClient, IdentityError, PublicKey};
pub use http::HttpIdentityClient;
