//! # API Module
//!
//! HTTP endpoints served by the local callback server while `trackcards auth`
//! is running.
//!
//! - [`callback`] - Receives Spotify's OAuth redirect, exchanges the
//!   authorization code for tokens and records the outcome for the waiting
//!   command. The URL is logged only after `code` and `state` were stripped.
//! - [`health`] - Reports status, service name and version.
//!
//! ```rust,ignore
//! use axum::{Router, routing::get};
//! use trackcards::api::{callback, health};
//!
//! let app = Router::new()
//!     .route("/callback", get(callback))
//!     .route("/health", get(health));
//! ```

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
