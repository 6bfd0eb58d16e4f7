//! Fixtures and request readers shared by the wiremock-backed tests.

#![allow(dead_code)]

use std::collections::HashMap;

use serde_json::Value;
use wiremock::{MockServer, Request};

/// Requests the mock server received on `path`, in arrival order.
pub async fn requests_to(server: &MockServer, path: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|request| request.url.path() == path)
        .collect()
}

pub fn query_param(request: &Request, key: &str) -> Option<String> {
    request
        .url
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// Decoded `application/x-www-form-urlencoded` body.
pub fn form(request: &Request) -> HashMap<String, String> {
    url::form_urlencoded::parse(&request.body)
        .into_owned()
        .collect()
}

pub fn authorization(request: &Request) -> Option<String> {
    request
        .headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// Track object as the Web API returns it in playlists and search results.
pub fn track_json(id: &str, name: &str, artist: &str, album_type: &str, release_date: &str) -> Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "artists": [{ "name": artist }],
        "album": {
            "name": format!("{name} album"),
            "release_date": release_date,
            "album_type": album_type
        }
    })
}

/// Paging object; `next` is set when `has_next`.
pub fn page_json(items: Vec<Value>, has_next: bool) -> Value {
    serde_json::json!({
        "items": items,
        "next": if has_next { Value::String("next-page".to_string()) } else { Value::Null },
        "total": null
    })
}
