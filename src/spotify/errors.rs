use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Result type used across the Spotify client.
pub type Result<T> = std::result::Result<T, SpotifyError>;

/// Failures of the auth flow and the Web API layer.
///
/// A failed token refresh is not part of this enum: refresh returns `None`
/// and callers treat that as "authorize again".
#[derive(Debug, Error)]
pub enum SpotifyError {
    #[error("Missing Spotify client configuration: {0}. Set it in the trackcards .env file.")]
    Configuration(&'static str),

    #[error("Missing PKCE verifier. Restart the Spotify login.")]
    MissingVerifier,

    #[error("Spotify token exchange failed ({status}). Restart the Spotify login.")]
    TokenExchange { status: u16 },

    #[error(transparent)]
    Http(#[from] SpotifyHttpError),

    #[error(
        "Unable to reach Spotify while trying to {action}. Check internet connectivity and try again."
    )]
    Network { action: String },

    #[error("Unexpected Spotify response while trying to {action}: {source}")]
    Decode {
        action: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to persist Spotify auth state: {0}")]
    Storage(String),

    #[error("Invalid Spotify URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl SpotifyError {
    /// Advisory rate-limit delay carried by a 429 response.
    pub fn retry_after_seconds(&self) -> Option<u64> {
        match self {
            SpotifyError::Http(e) => e.retry_after_seconds,
            _ => None,
        }
    }
}

/// Non-2xx response from the Web API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotifyHttpError {
    pub action: String,
    pub status: u16,
    pub status_text: String,
    /// Path and query only.
    pub endpoint: String,
    pub reason: Option<String>,
    pub retry_after_seconds: Option<u64>,
}

impl fmt::Display for SpotifyHttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&build_error_message(
            &self.action,
            self.status,
            &self.status_text,
            &self.endpoint,
            self.reason.as_deref(),
            self.retry_after_seconds,
        ))
    }
}

impl std::error::Error for SpotifyHttpError {}

/// Hint shown when Spotify gave no reason of its own.
pub fn status_hint(status: u16, retry_after_seconds: Option<u64>) -> Option<String> {
    match status {
        401 => Some(
            "Spotify access token expired or is invalid. Reconnect Spotify and try again."
                .to_string(),
        ),
        403 => Some(
            "Spotify denied this request. Your account may be missing required permissions/scopes."
                .to_string(),
        ),
        429 => Some(match retry_after_seconds {
            Some(seconds) => format!("Rate limited by Spotify. Retry in about {seconds}s."),
            None => "Rate limited by Spotify. Retry in a few seconds.".to_string(),
        }),
        s if s >= 500 => {
            Some("Spotify service is currently unavailable. Try again shortly.".to_string())
        }
        _ => None,
    }
}

/// `Failed to {action} ({status} {statusText}) on {endpoint}: {reason or hint}`,
/// ending with a period instead when neither a reason nor a hint exists.
pub fn build_error_message(
    action: &str,
    status: u16,
    status_text: &str,
    endpoint: &str,
    reason: Option<&str>,
    retry_after_seconds: Option<u64>,
) -> String {
    let status_label = if status_text.trim().is_empty() {
        "Unknown Status"
    } else {
        status_text
    };

    let reason_or_hint = reason
        .map(str::to_string)
        .or_else(|| status_hint(status, retry_after_seconds));

    match reason_or_hint {
        Some(detail) => {
            format!("Failed to {action} ({status} {status_label}) on {endpoint}: {detail}")
        }
        None => format!("Failed to {action} ({status} {status_label}) on {endpoint}."),
    }
}

/// Pulls a human readable reason out of an error payload.
///
/// A non-blank string payload is its own reason. For objects the top-level
/// `message` wins over `error.message`. Everything else yields `None`.
pub fn extract_error_reason(payload: &Value) -> Option<String> {
    match payload {
        Value::String(text) => non_blank(text),
        Value::Object(map) => {
            if let Some(message) = map.get("message").and_then(Value::as_str).and_then(non_blank) {
                return Some(message);
            }
            map.get("error")
                .and_then(Value::as_object)
                .and_then(|nested| nested.get("message"))
                .and_then(Value::as_str)
                .and_then(non_blank)
        }
        _ => None,
    }
}

fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
