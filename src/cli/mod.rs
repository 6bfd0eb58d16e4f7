//! # CLI Module
//!
//! User-facing commands of Trackcards. Each command wires configuration,
//! token storage and the Spotify client together, shows progress while it
//! talks to Spotify and reports the outcome with the colored output macros.
//!
//! ## Commands
//!
//! - [`auth`] - Runs the OAuth PKCE flow through the local callback server
//! - [`logout`] - Forgets stored tokens and any pending verifier
//! - [`list_playlists`] - Lists the playlists of the connected account
//! - [`search_tracks`] / [`search_albums`] - Catalog search
//! - [`cards`] - Builds cards from playlists, albums and saved tracks
//! - [`scan`] - Resolves a scanned card payload back to a track
//!
//! Commands that need Spotify access obtain a valid access token first and
//! exit with a hint to run `trackcards auth` when none is available.

mod auth;
mod cards;
mod playlists;
mod scan;
mod search;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

pub use auth::{auth, logout};
pub use cards::{CardSources, cards};
pub use playlists::list_playlists;
pub use scan::scan;
pub use search::{search_albums, search_tracks};

use crate::{
    config,
    error,
    management::TokenStore,
    spotify::{SpotifyApi, SpotifyAuth},
};

/// Auth service backed by the local data directory.
fn spotify_auth() -> SpotifyAuth {
    SpotifyAuth::new(
        config::get_config(),
        config::Endpoints::from_env(),
        TokenStore::local(),
    )
}

fn spotify_api() -> SpotifyApi {
    SpotifyApi::new(config::Endpoints::from_env().api_base)
}

/// Valid access token, refreshed when needed. Exits when not connected.
async fn access_token() -> String {
    match spotify_auth().get_valid_access_token().await {
        Some(token) => token,
        None => error!("Not connected to Spotify. Please run trackcards auth"),
    }
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}
