mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{Extension, extract::OriginalUri};
use chrono::Utc;
use serde_json::{Value, json};
use url::Url;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

use common::{form, requests_to};
use trackcards::{
    api,
    config::{Endpoints, SpotifyConfig},
    management::{MemoryStorage, Storage, TokenStore},
    server::CallbackState,
    spotify::{
        SpotifyAuth, SpotifyError,
        auth::{clear_callback_params, parse_callback_code},
    },
    types::StoredAuthState,
    utils::generate_code_challenge,
};

const REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";

fn config() -> SpotifyConfig {
    SpotifyConfig {
        client_id: Some("client-123".to_string()),
        redirect_uri: Some(REDIRECT_URI.to_string()),
    }
}

fn auth_against(base_url: &str, store: TokenStore) -> SpotifyAuth {
    SpotifyAuth::new(config(), Endpoints::single(base_url), store)
}

fn state_expiring_in(ms: i64, refresh_token: Option<&str>) -> StoredAuthState {
    StoredAuthState {
        access_token: "old-access".to_string(),
        refresh_token: refresh_token.map(str::to_string),
        expires_at: Utc::now().timestamp_millis() + ms,
    }
}

async fn token_server(status: u16, body: Value) -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(&mock_server)
        .await;
    mock_server
}

async fn token_hits(mock_server: &MockServer) -> usize {
    requests_to(mock_server, "/api/token").await.len()
}

/// Durable storage that reads fine but refuses every write.
#[derive(Default)]
struct ReadOnlyStorage {
    inner: MemoryStorage,
}

#[async_trait]
impl Storage for ReadOnlyStorage {
    async fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).await
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), String> {
        Err("disk full".to_string())
    }

    async fn remove(&self, key: &str) -> Result<(), String> {
        self.inner.remove(key).await
    }
}

#[tokio::test]
async fn test_start_auth_requires_client_configuration() {
    let auth = SpotifyAuth::new(
        SpotifyConfig::default(),
        Endpoints::single("http://127.0.0.1:1"),
        TokenStore::in_memory(),
    );

    let result = auth.start_auth(&["user-library-read"]).await;

    assert!(matches!(result, Err(SpotifyError::Configuration(_))));
    assert_eq!(auth.store().load_verifier().await, None);
}

#[tokio::test]
async fn test_start_auth_builds_authorize_url() {
    let store = TokenStore::in_memory();
    let auth = auth_against("https://accounts.example.com", store.clone());

    let url = auth
        .start_auth(&["playlist-read-private", "user-library-read"])
        .await
        .unwrap();
    let url = Url::parse(&url).unwrap();
    let param = |key: &str| {
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    };

    assert_eq!(url.host_str(), Some("accounts.example.com"));
    assert_eq!(url.path(), "/authorize");
    assert_eq!(param("response_type").as_deref(), Some("code"));
    assert_eq!(param("client_id").as_deref(), Some("client-123"));
    assert_eq!(param("redirect_uri").as_deref(), Some(REDIRECT_URI));
    assert_eq!(param("code_challenge_method").as_deref(), Some("S256"));
    assert_eq!(
        param("scope").as_deref(),
        Some("playlist-read-private user-library-read")
    );

    let verifier = store.load_verifier().await.unwrap();
    assert_eq!(verifier.len(), 96);
    assert_eq!(param("code_challenge"), Some(generate_code_challenge(&verifier)));
}

#[tokio::test]
async fn test_start_auth_clears_previous_state() {
    let store = TokenStore::in_memory();
    store
        .write(&state_expiring_in(3_600_000, Some("refresh")))
        .await
        .unwrap();
    store.store_verifier("stale").await.unwrap();
    let auth = auth_against("https://accounts.example.com", store.clone());

    auth.start_auth(&["user-library-read"]).await.unwrap();

    assert_eq!(store.read().await, None);
    assert_ne!(store.load_verifier().await.as_deref(), Some("stale"));
}

#[tokio::test]
async fn test_exchange_without_verifier_fails() {
    let mock_server = token_server(200, json!({ "access_token": "new" })).await;
    let auth = auth_against(&mock_server.uri(), TokenStore::in_memory());

    let result = auth.exchange_code_for_token("code-1").await;

    assert!(matches!(result, Err(SpotifyError::MissingVerifier)));
    assert_eq!(token_hits(&mock_server).await, 0);
}

#[tokio::test]
async fn test_exchange_code_for_token_persists_state() {
    let mock_server = token_server(200, json!({
        "access_token": "new-access",
        "refresh_token": "new-refresh",
        "expires_in": 3600,
        "scope": "user-library-read"
    }))
    .await;
    let store = TokenStore::in_memory();
    store.store_verifier("my-verifier").await.unwrap();
    let auth = auth_against(&mock_server.uri(), store.clone());

    let before = Utc::now().timestamp_millis();
    let token = auth.exchange_code_for_token("code-1").await.unwrap();
    let after = Utc::now().timestamp_millis();

    assert_eq!(token, "new-access");

    let requests = requests_to(&mock_server, "/api/token").await;
    assert_eq!(requests.len(), 1);
    let body = form(&requests[0]);
    assert_eq!(body["grant_type"], "authorization_code");
    assert_eq!(body["code"], "code-1");
    assert_eq!(body["redirect_uri"], REDIRECT_URI);
    assert_eq!(body["client_id"], "client-123");
    assert_eq!(body["code_verifier"], "my-verifier");

    let state = store.read().await.unwrap();
    assert_eq!(state.access_token, "new-access");
    assert_eq!(state.refresh_token.as_deref(), Some("new-refresh"));
    assert!(state.expires_at >= before + 3_600_000);
    assert!(state.expires_at <= after + 3_600_000);

    // The verifier is single use
    assert_eq!(store.load_verifier().await, None);
}

#[tokio::test]
async fn test_exchange_rejected_by_spotify() {
    let mock_server = token_server(400, json!({ "error": "invalid_grant" })).await;
    let store = TokenStore::in_memory();
    store.store_verifier("my-verifier").await.unwrap();
    let auth = auth_against(&mock_server.uri(), store.clone());

    let result = auth.exchange_code_for_token("bad-code").await;

    assert!(matches!(
        result,
        Err(SpotifyError::TokenExchange { status: 400 })
    ));
    assert_eq!(store.read().await, None);
    // A failed exchange keeps the verifier for another attempt
    assert_eq!(store.load_verifier().await.as_deref(), Some("my-verifier"));
}

#[tokio::test]
async fn test_fresh_token_is_returned_without_refresh() {
    let mock_server = token_server(200, json!({ "access_token": "new" })).await;
    let store = TokenStore::in_memory();
    store
        .write(&state_expiring_in(3_600_000, Some("refresh")))
        .await
        .unwrap();
    let auth = auth_against(&mock_server.uri(), store);

    assert_eq!(
        auth.get_valid_access_token().await.as_deref(),
        Some("old-access")
    );
    assert_eq!(token_hits(&mock_server).await, 0);
}

#[tokio::test]
async fn test_expired_token_is_refreshed_once() {
    let mock_server = token_server(200, json!({
        "access_token": "refreshed-access",
        "expires_in": 3600
    }))
    .await;
    let store = TokenStore::in_memory();
    store
        .write(&state_expiring_in(-1_000, Some("old-refresh")))
        .await
        .unwrap();
    let auth = auth_against(&mock_server.uri(), store.clone());

    let token = auth.get_valid_access_token().await;

    assert_eq!(token.as_deref(), Some("refreshed-access"));
    let requests = requests_to(&mock_server, "/api/token").await;
    assert_eq!(requests.len(), 1);
    let body = form(&requests[0]);
    assert_eq!(body["grant_type"], "refresh_token");
    assert_eq!(body["refresh_token"], "old-refresh");
    assert_eq!(body["client_id"], "client-123");

    // No rotated refresh token in the response, the old one is kept
    let state = store.read().await.unwrap();
    assert_eq!(state.access_token, "refreshed-access");
    assert_eq!(state.refresh_token.as_deref(), Some("old-refresh"));
    assert!(state.expires_at > Utc::now().timestamp_millis() + 3_000_000);

    // The refreshed token is fresh now
    assert_eq!(
        auth.get_valid_access_token().await.as_deref(),
        Some("refreshed-access")
    );
    assert_eq!(token_hits(&mock_server).await, 1);
}

#[tokio::test]
async fn test_token_inside_expiry_buffer_is_refreshed() {
    let mock_server = token_server(200, json!({
        "access_token": "refreshed-access",
        "refresh_token": "rotated-refresh",
        "expires_in": 3600
    }))
    .await;
    let store = TokenStore::in_memory();
    store
        .write(&state_expiring_in(10_000, Some("old-refresh")))
        .await
        .unwrap();
    let auth = auth_against(&mock_server.uri(), store.clone());

    assert_eq!(
        auth.get_valid_access_token().await.as_deref(),
        Some("refreshed-access")
    );
    assert_eq!(token_hits(&mock_server).await, 1);
    assert_eq!(
        store.read().await.unwrap().refresh_token.as_deref(),
        Some("rotated-refresh")
    );
}

#[tokio::test]
async fn test_concurrent_callers_share_one_refresh() {
    let mock_server = token_server(200, json!({
        "access_token": "refreshed-access",
        "expires_in": 3600
    }))
    .await;
    let store = TokenStore::in_memory();
    store
        .write(&state_expiring_in(-1_000, Some("old-refresh")))
        .await
        .unwrap();
    let auth = Arc::new(auth_against(&mock_server.uri(), store));

    let (first, second, third) = tokio::join!(
        auth.get_valid_access_token(),
        auth.get_valid_access_token(),
        auth.get_valid_access_token()
    );

    assert_eq!(first.as_deref(), Some("refreshed-access"));
    assert_eq!(second.as_deref(), Some("refreshed-access"));
    assert_eq!(third.as_deref(), Some("refreshed-access"));
    assert_eq!(token_hits(&mock_server).await, 1);
}

#[tokio::test]
async fn test_expired_token_without_refresh_token() {
    let mock_server = token_server(200, json!({ "access_token": "new" })).await;
    let store = TokenStore::in_memory();
    store.write(&state_expiring_in(-1_000, None)).await.unwrap();
    let auth = auth_against(&mock_server.uri(), store);

    assert_eq!(auth.get_valid_access_token().await, None);
    assert_eq!(token_hits(&mock_server).await, 0);
}

#[tokio::test]
async fn test_nothing_stored_means_no_token() {
    let auth = auth_against("http://127.0.0.1:1", TokenStore::in_memory());
    assert_eq!(auth.get_valid_access_token().await, None);
}

#[tokio::test]
async fn test_rejected_refresh_yields_none() {
    let mock_server = token_server(400, json!({ "error": "invalid_grant" })).await;
    let store = TokenStore::in_memory();
    store
        .write(&state_expiring_in(-1_000, Some("revoked")))
        .await
        .unwrap();
    let auth = auth_against(&mock_server.uri(), store);

    assert_eq!(auth.get_valid_access_token().await, None);
    assert_eq!(token_hits(&mock_server).await, 1);
}

#[tokio::test]
async fn test_refreshed_token_that_cannot_be_stored_is_discarded() {
    let mock_server = token_server(
        200,
        json!({
            "access_token": "refreshed-access",
            "expires_in": 3600
        }),
    )
    .await;
    let durable = Arc::new(ReadOnlyStorage::default());
    let expired = state_expiring_in(-1_000, Some("old-refresh"));
    durable
        .inner
        .set(
            trackcards::management::AUTH_STORAGE_KEY,
            &serde_json::to_string(&expired).unwrap(),
        )
        .await
        .unwrap();
    let store = TokenStore::new(durable, Arc::new(MemoryStorage::new()));
    let auth = auth_against(&mock_server.uri(), store.clone());

    assert_eq!(auth.refresh_access_token("old-refresh").await, None);
    assert_eq!(auth.get_valid_access_token().await, None);
    assert_eq!(token_hits(&mock_server).await, 2);
    assert_eq!(store.read().await, Some(expired));
}

#[tokio::test]
async fn test_unreachable_token_endpoint_yields_none() {
    let store = TokenStore::in_memory();
    store
        .write(&state_expiring_in(-1_000, Some("refresh")))
        .await
        .unwrap();
    let auth = auth_against("http://127.0.0.1:1", store);

    assert_eq!(auth.refresh_access_token("refresh").await, None);
}

#[tokio::test]
async fn test_logout_clears_everything() {
    let store = TokenStore::in_memory();
    store
        .write(&state_expiring_in(3_600_000, Some("refresh")))
        .await
        .unwrap();
    store.store_verifier("verifier").await.unwrap();
    let auth = auth_against("http://127.0.0.1:1", store.clone());

    auth.logout().await.unwrap();

    assert_eq!(store.read().await, None);
    assert_eq!(store.load_verifier().await, None);
}

#[test]
fn test_parse_callback_code() {
    let url = Url::parse("http://127.0.0.1:8888/callback?code=abc&state=xyz").unwrap();
    assert_eq!(parse_callback_code(&url), Some("abc".to_string()));

    let url = Url::parse("http://127.0.0.1:8888/callback?error=access_denied").unwrap();
    assert_eq!(parse_callback_code(&url), None);
}

#[test]
fn test_clear_callback_params() {
    let mut url = Url::parse("http://127.0.0.1:8888/callback?code=abc&state=xyz&foo=1").unwrap();
    clear_callback_params(&mut url);
    assert_eq!(url.as_str(), "http://127.0.0.1:8888/callback?foo=1");

    clear_callback_params(&mut url);
    assert_eq!(url.as_str(), "http://127.0.0.1:8888/callback?foo=1");

    let mut url = Url::parse("http://127.0.0.1:8888/callback?code=abc&state=xyz").unwrap();
    clear_callback_params(&mut url);
    assert_eq!(url.as_str(), "http://127.0.0.1:8888/callback");
}

#[tokio::test]
async fn test_callback_handler_exchanges_code() {
    let mock_server = token_server(200, json!({
        "access_token": "callback-access",
        "refresh_token": "callback-refresh",
        "expires_in": 3600
    }))
    .await;
    let store = TokenStore::in_memory();
    let auth = Arc::new(auth_against(&mock_server.uri(), store.clone()));
    auth.start_auth(&["user-library-read"]).await.unwrap();
    let state = CallbackState::new(Arc::clone(&auth));

    let uri = "/callback?code=the-code&state=s".parse().unwrap();
    api::callback(OriginalUri(uri), Extension(state.clone())).await;

    assert_eq!(*state.outcome.lock().await, Some(Ok(())));
    let requests = requests_to(&mock_server, "/api/token").await;
    assert_eq!(form(&requests[0])["code"], "the-code");
    assert_eq!(
        store.read().await.unwrap().access_token,
        "callback-access"
    );
}

#[tokio::test]
async fn test_callback_handler_reports_denied_authorization() {
    let auth = Arc::new(auth_against("http://127.0.0.1:1", TokenStore::in_memory()));
    let state = CallbackState::new(auth);

    let uri = "/callback?error=access_denied".parse().unwrap();
    api::callback(OriginalUri(uri), Extension(state.clone())).await;

    let outcome = state.outcome.lock().await.clone();
    let message = outcome.unwrap().unwrap_err();
    assert!(message.contains("access_denied"));
}

#[tokio::test]
async fn test_health_reports_service() {
    let body = api::health().await.0;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "trackcards");
}
