/*
 * Responsibility
 * - Read settings from the environment (identity source URLs, accepted clients, cache TTLs, webhook secret)
 * - Validate them up front: a bad value fails startup
 */
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const MAX_TOKEN_CACHE_TTL_SECONDS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<String>) -> Self {
        match value
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub identity_api_url: Url,
    pub identity_auth_url: Url,
    pub identity_timeout: Duration,

    pub accepted_client_ids: Vec<String>,
    pub public_key_cache_ttl: Duration,
    pub token_cache_ttl: Duration,

    pub webhook_hash_key: String,

    pub request_timeout: Duration,
    pub body_limit_bytes: usize,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // webhook_hash_key is a secret
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("identity_api_url", &self.identity_api_url.as_str())
            .field("identity_auth_url", &self.identity_auth_url.as_str())
            .field("accepted_client_ids", &self.accepted_client_ids)
            .field("token_cache_ttl", &self.token_cache_ttl)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes `std::env::var`.
    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = parse_or(&lookup, "PORT", 3000)?;
        let addr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV"));

        let identity_api_url = required_url(&lookup, "IDENTITY_API_URL")?;
        let identity_auth_url = required_url(&lookup, "IDENTITY_AUTH_URL")?;
        let identity_timeout =
            Duration::from_secs(parse_or(&lookup, "IDENTITY_TIMEOUT_SECONDS", 10)?);

        let accepted_client_ids = lookup("ACCEPTED_CLIENT_IDS")
            .ok_or(ConfigError::Missing("ACCEPTED_CLIENT_IDS"))?
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();
        if accepted_client_ids.is_empty() {
            return Err(ConfigError::Invalid("ACCEPTED_CLIENT_IDS"));
        }

        let public_key_cache_ttl =
            Duration::from_secs(parse_or(&lookup, "PUBLIC_KEY_CACHE_TTL_SECONDS", 3600)?);

        let token_cache_ttl_seconds: u64 = parse_or(&lookup, "TOKEN_CACHE_TTL_SECONDS", 60)?;
        if !(1..=MAX_TOKEN_CACHE_TTL_SECONDS).contains(&token_cache_ttl_seconds) {
            return Err(ConfigError::Invalid("TOKEN_CACHE_TTL_SECONDS"));
        }
        let token_cache_ttl = Duration::from_secs(token_cache_ttl_seconds);

        let webhook_hash_key = lookup("WEBHOOK_HASH_KEY")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("WEBHOOK_HASH_KEY"))?;

        let request_timeout =
            Duration::from_secs(parse_or(&lookup, "REQUEST_TIMEOUT_SECONDS", 30)?);
        let body_limit_bytes = parse_or(&lookup, "BODY_LIMIT_BYTES", 1024 * 1024)?;

        Ok(Self {
            addr,
            app_env,
            identity_api_url,
            identity_auth_url,
            identity_timeout,
            accepted_client_ids,
            public_key_cache_ttl,
            token_cache_ttl,
            webhook_hash_key,
            request_timeout,
            body_limit_bytes,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

fn required_url<F>(lookup: &F, key: &'static str) -> Result<Url, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key).ok_or(ConfigError::Missing(key))?;
    Url::parse(raw.trim()).map_err(|_| ConfigError::Invalid(key))
}
