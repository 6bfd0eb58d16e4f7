use chrono::Utc;
use reqwest::Client;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use url::Url;

use crate::{
    config::{Endpoints, SpotifyConfig},
    management::TokenStore,
    spotify::errors::{Result, SpotifyError},
    types::{StoredAuthState, TokenResponse},
    utils,
};

/// Tokens this close to expiry are refreshed instead of reused.
pub const EXPIRY_BUFFER_MS: i64 = 30_000;

/// OAuth 2.0 authorization code flow with PKCE against the Spotify accounts
/// service.
///
/// Authorization starts with [`SpotifyAuth::start_auth`], which persists a
/// fresh verifier and returns the URL the user has to visit. Spotify redirects
/// back with a `code` that [`SpotifyAuth::exchange_code_for_token`] trades for
/// tokens. From then on [`SpotifyAuth::get_valid_access_token`] hands out the
/// cached access token and refreshes it shortly before it expires.
///
/// All writes to the [`TokenStore`] go through this type.
pub struct SpotifyAuth {
    client: Client,
    config: SpotifyConfig,
    endpoints: Endpoints,
    store: TokenStore,
    refresh_lock: Mutex<()>,
}

impl SpotifyAuth {
    /// Creates the auth flow for one client registration.
    ///
    /// # Arguments
    ///
    /// * `config` - Client id and redirect URI registered with Spotify
    /// * `endpoints` - Accounts service URLs used for authorize and token calls
    /// * `store` - Where auth state and PKCE verifiers are persisted
    ///
    /// # Example
    ///
    /// ```
    /// let auth = SpotifyAuth::new(
    ///     config::get_config(),
    ///     Endpoints::from_env(),
    ///     TokenStore::local(),
    /// );
    /// ```
    pub fn new(config: SpotifyConfig, endpoints: Endpoints, store: TokenStore) -> Self {
        Self {
            client: Client::new(),
            config,
            endpoints,
            store,
            refresh_lock: Mutex::new(()),
        }
    }

    /// The token store this flow reads and writes.
    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    /// Prepares a new authorization and returns the Spotify authorize URL.
    ///
    /// Previous auth state and verifiers are cleared first, then the new
    /// verifier is stored in both storage scopes. Navigating to the URL is up to
    /// the caller.
    ///
    /// # Arguments
    ///
    /// * `scopes` - Permission scopes to request, sent space separated
    ///
    /// # Returns
    ///
    /// The authorize URL carrying `response_type=code`, the client id, the
    /// redirect URI, the S256 code challenge and the scopes.
    ///
    /// # Errors
    ///
    /// - `SpotifyError::Configuration` when the client id or redirect URI is
    ///   missing. Nothing is stored in that case.
    /// - `SpotifyError::Storage` when clearing or storing the verifier fails
    ///
    /// # Example
    ///
    /// ```
    /// let url = auth.start_auth(&["playlist-read-private", "user-library-read"]).await?;
    /// webbrowser::open(&url)?;
    /// ```
    pub async fn start_auth<S: AsRef<str>>(&self, scopes: &[S]) -> Result<String> {
        let (client_id, redirect_uri) = self.client_registration()?;

        let verifier = utils::generate_code_verifier(utils::DEFAULT_VERIFIER_LENGTH);
        let challenge = utils::generate_code_challenge(&verifier);

        self.store.clear().await.map_err(SpotifyError::Storage)?;
        self.store
            .store_verifier(&verifier)
            .await
            .map_err(SpotifyError::Storage)?;

        let scope = scopes
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(" ");
        let url = Url::parse_with_params(
            &self.endpoints.authorize_url(),
            &[
                ("response_type", "code"),
                ("client_id", client_id),
                ("redirect_uri", redirect_uri),
                ("code_challenge_method", "S256"),
                ("code_challenge", challenge.as_str()),
                ("scope", scope.as_str()),
            ],
        )?;

        Ok(url.into())
    }

    /// Trades an authorization code for tokens and persists them.
    ///
    /// Needs the verifier stored by [`SpotifyAuth::start_auth`]; both copies
    /// are removed once the exchange succeeded. A failed exchange leaves the
    /// verifier in place.
    ///
    /// # Arguments
    ///
    /// * `code` - The `code` parameter Spotify appended to the redirect URI
    ///
    /// # Returns
    ///
    /// The new access token. Its expiry and refresh token are persisted
    /// alongside it.
    ///
    /// # Errors
    ///
    /// - `SpotifyError::Configuration` when the client registration is incomplete
    /// - `SpotifyError::MissingVerifier` when no verifier is stored
    /// - `SpotifyError::Network` when the token endpoint cannot be reached
    /// - `SpotifyError::TokenExchange` when Spotify answers with a non-2xx status
    /// - `SpotifyError::Decode` when the token response is not valid JSON
    /// - `SpotifyError::Storage` when the new auth state cannot be written
    ///
    /// # Example
    ///
    /// ```
    /// if let Some(code) = parse_callback_code(&callback_url) {
    ///     let token = auth.exchange_code_for_token(&code).await?;
    /// }
    /// ```
    pub async fn exchange_code_for_token(&self, code: &str) -> Result<String> {
        let (client_id, redirect_uri) = self.client_registration()?;
        let verifier = self
            .store
            .load_verifier()
            .await
            .ok_or(SpotifyError::MissingVerifier)?;

        let action = "exchange authorization code";
        let response = self
            .client
            .post(self.endpoints.token_url())
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("client_id", client_id),
                ("code_verifier", verifier.as_str()),
            ])
            .send()
            .await
            .map_err(|_| SpotifyError::Network {
                action: action.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(SpotifyError::TokenExchange {
                status: response.status().as_u16(),
            });
        }

        let token = decode_token(response, action).await?;
        let state = StoredAuthState {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at: expires_at(token.expires_in),
        };
        self.store
            .write(&state)
            .await
            .map_err(SpotifyError::Storage)?;
        if let Err(e) = self.store.clear_verifier().await {
            debug!(error = %e, "could not remove used PKCE verifier");
        }

        Ok(state.access_token)
    }

    /// Mints a new access token from `refresh_token` and persists it.
    ///
    /// Spotify may or may not rotate the refresh token; when the response has
    /// none the previous one is kept.
    ///
    /// # Arguments
    ///
    /// * `refresh_token` - Refresh token of the stored auth state
    ///
    /// # Returns
    ///
    /// - `Some(token)` - The new access token, already written to the store
    /// - `None` - The client id is missing, Spotify could not be reached or
    ///   rejected the refresh, the response was unusable, or the new state
    ///   could not be persisted. The user has to authorize again.
    ///
    /// A token that could not be persisted is never returned.
    ///
    /// # Example
    ///
    /// ```
    /// match auth.refresh_access_token(&refresh_token).await {
    ///     Some(token) => api.get_current_user_playlists(&token, None).await?,
    ///     None => return Err("run `trackcards auth` again".into()),
    /// };
    /// ```
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Option<String> {
        let client_id = self.config.client_id.as_deref()?;

        let response = match self
            .client
            .post(self.endpoints.token_url())
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", client_id),
            ])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "token refresh could not reach Spotify");
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(status = response.status().as_u16(), "token refresh rejected");
            return None;
        }

        let token = match decode_token(response, "refresh access token").await {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "token refresh returned an unusable body");
                return None;
            }
        };

        let state = StoredAuthState {
            access_token: token.access_token,
            refresh_token: token
                .refresh_token
                .or_else(|| Some(refresh_token.to_string())),
            expires_at: expires_at(token.expires_in),
        };
        if let Err(e) = self.store.write(&state).await {
            warn!(error = %e, "refreshed token could not be persisted, discarding it");
            return None;
        }

        Some(state.access_token)
    }

    /// Returns an access token that is good for at least another 30 seconds.
    ///
    /// Uses the stored token when possible and refreshes it otherwise.
    /// Concurrent callers share one refresh: whoever waited for the refresh lock
    /// reads the store again and reuses the token the first caller wrote.
    ///
    /// # Returns
    ///
    /// - `Some(token)` - A token valid for more than [`EXPIRY_BUFFER_MS`]
    /// - `None` - Nothing is stored, the state has no refresh token, or the
    ///   refresh failed
    ///
    /// # Example
    ///
    /// ```
    /// let Some(token) = auth.get_valid_access_token().await else {
    ///     error!("Not authenticated. Run `trackcards auth` first.");
    /// };
    /// let tracks = api.get_current_user_saved_tracks(&token, None).await?;
    /// ```
    pub async fn get_valid_access_token(&self) -> Option<String> {
        let stored = self.store.read().await?;
        if is_fresh(&stored) {
            return Some(stored.access_token);
        }
        if stored.refresh_token.is_none() {
            return None;
        }

        let _guard = self.refresh_lock.lock().await;

        // Another caller may have refreshed while this one waited for the lock.
        let stored = self.store.read().await?;
        if is_fresh(&stored) {
            return Some(stored.access_token);
        }
        let refresh_token = stored.refresh_token?;

        debug!("access token expiring, refreshing");
        self.refresh_access_token(&refresh_token).await
    }

    /// Forgets every stored token and verifier.
    ///
    /// # Errors
    ///
    /// `SpotifyError::Storage` when the store cannot remove a value.
    pub async fn logout(&self) -> Result<()> {
        self.store.clear().await.map_err(SpotifyError::Storage)
    }

    fn client_registration(&self) -> Result<(&str, &str)> {
        let client_id = self
            .config
            .client_id
            .as_deref()
            .ok_or(SpotifyError::Configuration("SPOTIFY_CLIENT_ID"))?;
        let redirect_uri = self
            .config
            .redirect_uri
            .as_deref()
            .ok_or(SpotifyError::Configuration("SPOTIFY_REDIRECT_URI"))?;
        Ok((client_id, redirect_uri))
    }
}

/// The `code` query parameter of an OAuth callback URL.
pub fn parse_callback_code(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == "code")
        .map(|(_, value)| value.into_owned())
}

/// Strips `code` and `state` from a callback URL, keeping every other
/// parameter. Calling it again changes nothing.
pub fn clear_callback_params(url: &mut Url) {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "code" && key != "state")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }
}

fn is_fresh(state: &StoredAuthState) -> bool {
    Utc::now().timestamp_millis() < state.expires_at - EXPIRY_BUFFER_MS
}

fn expires_at(expires_in: Option<i64>) -> i64 {
    Utc::now().timestamp_millis() + expires_in.unwrap_or(0) * 1000
}

async fn decode_token(response: reqwest::Response, action: &str) -> Result<TokenResponse> {
    let text = response.text().await.map_err(|_| SpotifyError::Network {
        action: action.to_string(),
    })?;
    serde_json::from_str(&text).map_err(|source| SpotifyError::Decode {
        action: action.to_string(),
        source,
    })
}
