//! # Spotify Integration Module
//!
//! This module is the integration layer between Trackcards and the Spotify Web
//! API. It implements the OAuth PKCE lifecycle, a single authenticated request
//! path with typed errors, paginated listings, search and the compilation album
//! resolver.
//!
//! ## Architecture
//!
//! ```text
//! CLI / callback server
//!          ↓
//! SpotifyAuth (PKCE flow, token refresh)  →  TokenStore
//!          ↓ access token
//! SpotifyApi
//!     ├── Playlists and playlist tracks (paginated)
//!     ├── Saved tracks (paginated)
//!     ├── Search (tracks, albums)
//!     └── Album tracks (compilation resolver)
//!          ↓
//! request_json (reqwest, typed errors)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Authentication
//!
//! [`auth`] implements the authorization code flow with PKCE: verifier and
//! challenge generation, the authorize URL, code exchange and refresh. Tokens are
//! refreshed 30 seconds before they expire. A refresh that fails is not an
//! error; it simply means the user has to log in again.
//!
//! ## Requests and errors
//!
//! [`request`] attaches the bearer token, maps connection failures to
//! [`errors::SpotifyError::Network`] and non-2xx responses to
//! [`errors::SpotifyHttpError`], whose message names the failed action, the
//! endpoint and either Spotify's own reason or a hint derived from the status.
//! Nothing in this layer retries; a 429 only reports the advised `Retry-After`.
//!
//! ## Pagination
//!
//! Listings are walked with `offset`/`limit` until the `next` link is null,
//! one page after the other. Null placeholders for removed content are skipped.
//!
//! ## Compilation albums
//!
//! [`albums`] returns regular album tracks as listed. Compilation tracks are
//! looked up again in the catalog to find the release they originally came
//! from, with at most five searches in flight and the listing order preserved.

pub mod albums;
pub mod auth;
pub mod client;
pub mod errors;
pub mod playlists;
pub mod request;
pub mod search;
pub mod tracks;

pub use albums::{AlbumTracks, TrackSearch};
pub use auth::SpotifyAuth;
pub use client::SpotifyApi;
pub use errors::{SpotifyError, SpotifyHttpError};
