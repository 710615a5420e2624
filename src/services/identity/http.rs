use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::services::identity::client::{CallerProfile, IdentityClient, IdentityError, PublicKey};

/// `reqwest`-backed identity source client.
///
/// - public keys: `GET {auth_url}/oauth/certs/{kid}`
/// - who-am-I:    `GET {api_url}/v1/me` with the caller's bearer token
///
/// Non-2xx answers are turned into `IdentityError` carrying the upstream
/// status and the first entry of the `Errors` array, so they can be forwarded as-is.
#[derive(Clone, Debug)]
pub struct HttpIdentityClient {
    http: reqwest::Client,
    api_url: Url,
    auth_url: Url,
}

impl HttpIdentityClient {
    pub fn new(api_url: Url, auth_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            api_url,
            auth_url,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        bearer: Option<&str>,
    ) -> Result<T, IdentityError> {
        let mut request = self.http.get(url.clone());
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| transport_error(&url, &e))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(&url, &e))?;

        if !status.is_success() {
            let err = upstream_error(status, &body);
            debug!(%url, status = status.as_u16(), code = %err.code, "identity source rejected request");
            return Err(err);
        }

        serde_json::from_slice(&body).map_err(|e| {
            warn!(%url, error = %e, "identity source returned an undecodable body");
            IdentityError::new(
                StatusCode::BAD_GATEWAY.as_u16(),
                "IdentityServiceError",
                "identity source returned an unreadable response",
            )
        })
    }
}

#[async_trait]
impl IdentityClient for HttpIdentityClient {
    async fn public_key(&self, key_id: &str) -> Result<PublicKey, IdentityError> {
        let url = endpoint(&self.auth_url, &["oauth", "certs", key_id])?;
        self.get_json(url, None).await
    }

    async fn caller_profile(&self, raw_token: &str) -> Result<CallerProfile, IdentityError> {
        let url = endpoint(&self.api_url, &["v1", "me"])?;
        self.get_json(url, Some(raw_token)).await
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiErrorBody {
    #[serde(default)]
    errors: Vec<ApiErrorEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiErrorEntry {
    error_code: String,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

// Append path segments to `base`; segments are percent-encoded by `url`.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, IdentityError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| {
            IdentityError::new(
                StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                "IdentityMisconfigured",
                format!("identity url {base} cannot carry a path"),
            )
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn upstream_error(status: StatusCode, body: &[u8]) -> IdentityError {
    let first = serde_json::from_slice::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.errors.into_iter().next());

    match first {
        Some(entry) => IdentityError {
            code: entry.error_code,
            status: status.as_u16(),
            message: entry.message,
            data: entry.data,
        },
        None => IdentityError::new(
            status.as_u16(),
            "IdentityServiceError",
            status.canonical_reason().unwrap_or("identity source error"),
        ),
    }
}

fn transport_error(url: &Url, err: &reqwest::Error) -> IdentityError {
    warn!(%url, error = %err, "identity source call failed");
    if err.is_timeout() {
        IdentityError::new(
            StatusCode::GATEWAY_TIMEOUT.as_u16(),
            "IdentityTimeout",
            "identity source did not respond in time",
        )
    } else {
        IdentityError::new(
            StatusCode::BAD_GATEWAY.as_u16(),
            "IdentityUnavailable",
            "identity source is unreachable",
        )
    }
}
