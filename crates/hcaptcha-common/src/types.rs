//! siteverify wire types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Outbound form payload for the siteverify endpoint.
///
/// Sent as `application/x-www-form-urlencoded`. Optional fields that are
/// `None` are left out of the body entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteVerifyRequest {
    /// Account secret
    pub secret: String,

    /// Proof token posted by the browser widget
    pub response: String,

    /// Caller IP, only when IP validation is enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remoteip: Option<String>,

    /// Expected site key, only when configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sitekey: Option<String>,
}

impl SiteVerifyRequest {
    pub fn new(secret: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            response: response.into(),
            remoteip: None,
            sitekey: None,
        }
    }
}

/// JSON reply of the siteverify endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteVerifyResponse {
    /// Whether the proof token is valid for this secret
    pub success: bool,

    /// When the challenge was solved (ISO8601)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge_ts: Option<DateTime<Utc>>,

    /// Hostname of the site where the challenge was solved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    /// Whether the response will be credited
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit: Option<bool>,

    /// Reasons for failure; `null` and a missing key both read as empty
    #[serde(
        rename = "error-codes",
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub error_codes: Vec<String>,

    /// Enterprise only: risk score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,

    /// Enterprise only: reasons for the score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_reason: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of the default rejection response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub message: String,
}
