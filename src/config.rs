//! Configuration management for Trackcards.
//!
//! This module handles loading and accessing configuration values from environment
//! variables and `.env` files. It provides a centralized way to manage application
//! configuration including the Spotify client registration, API endpoints and the
//! local callback server address.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)
//!
//! The Spotify client id and redirect URI have no defaults. They are resolved as
//! optional values and every operation that starts an authorization treats their
//! absence as a configuration error.

use std::{env, path::PathBuf};

/// Default base URL of the Spotify Web API.
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";

/// Default base URL of the Spotify accounts service.
pub const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com";

/// Scopes requested when `SPOTIFY_API_AUTH_SCOPE` is not set.
pub const DEFAULT_SCOPES: &str = "playlist-read-private playlist-read-collaborative user-library-read";

const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";

/// Spotify client registration resolved from the environment.
///
/// Both values are optional here; callers that initiate an authorization must
/// reject a configuration where either one is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpotifyConfig {
    pub client_id: Option<String>,
    pub redirect_uri: Option<String>,
}

/// Base URLs of the two Spotify authorities the client talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Web API base, e.g. `https://api.spotify.com/v1`.
    pub api_base: String,
    /// Accounts service base, e.g. `https://accounts.spotify.com`.
    pub accounts_base: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_URL.to_string(),
            accounts_base: DEFAULT_ACCOUNTS_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Builds endpoints from `SPOTIFY_API_URL` and `SPOTIFY_ACCOUNTS_URL`,
    /// falling back to the public Spotify hosts.
    pub fn from_env() -> Self {
        Self {
            api_base: non_empty_var("SPOTIFY_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            accounts_base: non_empty_var("SPOTIFY_ACCOUNTS_URL")
                .unwrap_or_else(|| DEFAULT_ACCOUNTS_URL.to_string()),
        }
    }

    /// Uses one base URL for both authorities. Handy for pointing the whole
    /// client at a single mock server.
    pub fn single(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            api_base: base.clone(),
            accounts_base: base,
        }
    }

    pub fn authorize_url(&self) -> String {
        format!("{}/authorize", self.accounts_base.trim_end_matches('/'))
    }

    pub fn token_url(&self) -> String {
        format!("{}/api/token", self.accounts_base.trim_end_matches('/'))
    }
}

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the `trackcards` data directory if it doesn't exist and loads the
/// `.env` file located there. A missing file is fine because every value can
/// also come straight from the process environment.
///
/// # Directory Structure
///
/// The function looks for the `.env` file in:
/// - Linux: `~/.local/share/trackcards/.env`
/// - macOS: `~/Library/Application Support/trackcards/.env`
/// - Windows: `%LOCALAPPDATA%/trackcards/.env`
///
/// # Errors
///
/// Returns an error string if the data directory cannot be created or an
/// existing `.env` file cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let dir = data_dir();
    async_fs::create_dir_all(&dir)
        .await
        .map_err(|e| e.to_string())?;

    let path = dir.join(".env");
    if !path.is_file() {
        return Ok(());
    }

    dotenv::from_path(&path).map_err(|e| format!("{}: {}", path.display(), e))
}

/// Returns the local data directory used for the `.env` file and persisted state.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("trackcards");
    path
}

/// Resolves the Spotify client id and redirect URI.
///
/// Reads `SPOTIFY_CLIENT_ID` and `SPOTIFY_REDIRECT_URI`. Blank values are
/// reported as absent.
pub fn get_config() -> SpotifyConfig {
    SpotifyConfig {
        client_id: non_empty_var("SPOTIFY_CLIENT_ID"),
        redirect_uri: non_empty_var("SPOTIFY_REDIRECT_URI"),
    }
}

/// Returns the OAuth scopes to request.
///
/// `SPOTIFY_API_AUTH_SCOPE` is split on whitespace; [`DEFAULT_SCOPES`] is used
/// when the variable is not set.
pub fn scopes() -> Vec<String> {
    non_empty_var("SPOTIFY_API_AUTH_SCOPE")
        .unwrap_or_else(|| DEFAULT_SCOPES.to_string())
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Returns the address the local OAuth callback server binds to.
///
/// Reads `SERVER_ADDRESS`, e.g. `127.0.0.1:8888`. It has to match the host and
/// port of the registered redirect URI.
pub fn server_addr() -> String {
    non_empty_var("SERVER_ADDRESS").unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.to_string())
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
