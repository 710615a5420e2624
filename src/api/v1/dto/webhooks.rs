/*
 * Responsibility
 * - Inbound webhook payload (as posted by the commerce platform) and its acknowledgement
 * - validate(): Route is required, Verb must be a known HTTP method
 */
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AuthError;

const KNOWN_VERBS: [&str; 5] = ["GET", "POST", "PUT", "PATCH", "DELETE"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WebhookPayload {
    #[serde(default)]
    pub route: Option<String>,
    #[serde(default)]
    pub verb: Option<String>,
    #[serde(default)]
    pub route_params: Option<Value>,
    #[serde(default)]
    pub query_params: Option<Value>,
    #[serde(default, rename = "LogID")]
    pub log_id: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub request: Option<Value>,
    #[serde(default)]
    pub response: Option<Value>,
    #[serde(default)]
    pub config_data: Option<Value>,
}

impl WebhookPayload {
    /// Returns the normalized (upper-case) verb on success.
    pub fn validate(&self) -> Result<String, AuthError> {
        if self.route.as_deref().is_none_or(|r| r.trim().is_empty()) {
            return Err(AuthError::RequiredField("Route".to_string()));
        }

        let verb = self
            .verb
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AuthError::RequiredField("Verb".to_string()))?
            .to_ascii_uppercase();

        if !KNOWN_VERBS.contains(&verb.as_str()) {
            return Err(AuthError::invalid_property("WebhookPayload", "Verb"));
        }

        Ok(verb)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct WebhookAck {
    pub received: bool,
    pub route: String,
    pub verb: String,
    #[serde(rename = "LogID", skip_serializing_if = "Option::is_none")]
    pub log_id: Option<String>,
}
