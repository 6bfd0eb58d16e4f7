use std::sync::Arc;

use tracing::debug;

use crate::{
    config,
    management::{FileStorage, MemoryStorage, Storage},
    types::StoredAuthState,
};

pub const AUTH_STORAGE_KEY: &str = "spotify_auth";
pub const PKCE_VERIFIER_KEY: &str = "spotify_pkce_verifier";
pub const PKCE_VERIFIER_FALLBACK_KEY: &str = "spotify_pkce_verifier_fallback";

/// Owner of the persisted auth state and the PKCE verifier.
///
/// The auth state lives in the durable scope only. The verifier is written to
/// both scopes and read from either, so it survives when the session scope is
/// lost between starting the authorization and receiving the callback.
#[derive(Clone)]
pub struct TokenStore {
    durable: Arc<dyn Storage>,
    session: Arc<dyn Storage>,
}

impl TokenStore {
    pub fn new(durable: Arc<dyn Storage>, session: Arc<dyn Storage>) -> Self {
        TokenStore { durable, session }
    }

    /// Files under the local data directory for durable values, process memory
    /// for the session scope.
    pub fn local() -> Self {
        let mut dir = config::data_dir();
        dir.push("storage");
        Self::new(
            Arc::new(FileStorage::new(dir)),
            Arc::new(MemoryStorage::new()),
        )
    }

    /// Both scopes in memory.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()), Arc::new(MemoryStorage::new()))
    }

    /// Returns the stored auth state, or `None` when it is absent or unparsable.
    pub async fn read(&self) -> Option<StoredAuthState> {
        let raw = self.durable.get(AUTH_STORAGE_KEY).await?;
        match serde_json::from_str(&raw) {
            Ok(state) => Some(state),
            Err(e) => {
                debug!(error = %e, "ignoring malformed stored auth state");
                None
            }
        }
    }

    /// Replaces the stored auth state as a whole.
    pub async fn write(&self, state: &StoredAuthState) -> Result<(), String> {
        let json = serde_json::to_string(state).map_err(|e| e.to_string())?;
        self.durable.set(AUTH_STORAGE_KEY, &json).await
    }

    /// Removes the auth state and both verifier copies.
    pub async fn clear(&self) -> Result<(), String> {
        self.durable.remove(AUTH_STORAGE_KEY).await?;
        self.clear_verifier().await
    }

    pub async fn store_verifier(&self, verifier: &str) -> Result<(), String> {
        self.session.set(PKCE_VERIFIER_KEY, verifier).await?;
        self.durable.set(PKCE_VERIFIER_FALLBACK_KEY, verifier).await
    }

    /// Session copy first, durable fallback second.
    pub async fn load_verifier(&self) -> Option<String> {
        match self.session.get(PKCE_VERIFIER_KEY).await {
            Some(verifier) => Some(verifier),
            None => self.durable.get(PKCE_VERIFIER_FALLBACK_KEY).await,
        }
    }

    pub async fn clear_verifier(&self) -> Result<(), String> {
        self.session.remove(PKCE_VERIFIER_KEY).await?;
        self.durable.remove(PKCE_VERIFIER_FALLBACK_KEY).await
    }
}
