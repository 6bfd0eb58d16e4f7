use reqwest::{
    Client, Method, Response,
    header::{AUTHORIZATION, HeaderMap, RETRY_AFTER},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::spotify::errors::{Result, SpotifyError, SpotifyHttpError, extract_error_reason};

/// Optional request customisation, the counterpart of a fetch `init`.
#[derive(Debug, Clone)]
pub struct RequestInit {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

impl Default for RequestInit {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

/// Sends an authenticated request and decodes the JSON body as `T`.
///
/// The bearer header always wins over a caller supplied `Authorization`.
/// Connection failures become [`SpotifyError::Network`], non-2xx statuses a
/// [`SpotifyHttpError`] naming `action` and the endpoint.
pub async fn request_json<T: DeserializeOwned>(
    client: &Client,
    access_token: &str,
    url: &str,
    action: &str,
    init: Option<RequestInit>,
) -> Result<T> {
    let RequestInit {
        method,
        mut headers,
        body,
    } = init.unwrap_or_default();
    headers.remove(AUTHORIZATION);

    debug!(%method, endpoint = %parse_endpoint(url), action, "spotify request");

    let mut request = client
        .request(method, url)
        .headers(headers)
        .bearer_auth(access_token);
    if let Some(body) = body {
        request = request.body(body);
    }

    let response = match request.send().await {
        Ok(response) => response,
        Err(e) => {
            debug!(error = %e, action, "spotify request failed before a response");
            return Err(SpotifyError::Network {
                action: action.to_string(),
            });
        }
    };

    if !response.status().is_success() {
        return Err(http_error(response, url, action).await.into());
    }

    let text = response.text().await.map_err(|_| SpotifyError::Network {
        action: action.to_string(),
    })?;

    serde_json::from_str(&text).map_err(|source| SpotifyError::Decode {
        action: action.to_string(),
        source,
    })
}

async fn http_error(response: Response, url: &str, action: &str) -> SpotifyHttpError {
    let status = response.status();
    let retry_after_seconds = parse_retry_after(response.headers());
    let payload = read_payload(response).await;

    let error = SpotifyHttpError {
        action: action.to_string(),
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or_default().to_string(),
        endpoint: parse_endpoint(url),
        reason: extract_error_reason(&payload),
        retry_after_seconds,
    };
    warn!(status = error.status, endpoint = %error.endpoint, "{}", error);
    error
}

/// Body as JSON when it parses, as a raw string otherwise, `Null` when empty.
async fn read_payload(response: Response) -> Value {
    let raw = response.text().await.unwrap_or_default();
    if raw.trim().is_empty() {
        return Value::Null;
    }

    serde_json::from_str(&raw).unwrap_or(Value::String(raw))
}

fn parse_retry_after(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Path plus query of `url`; the input unchanged when it is not a valid URL.
pub fn parse_endpoint(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => match parsed.query() {
            Some(query) => format!("{}?{}", parsed.path(), query),
            None => parsed.path().to_string(),
        },
        Err(_) => url.to_string(),
    }
}
