//! Trackcards Library
//!
//! This library turns Spotify tracks into printable card records and resolves
//! scanned cards back to playable track references. It covers the Spotify
//! OAuth PKCE lifecycle, an authenticated and paginated Web API client, the
//! compilation album resolver and the card builder used by the CLI.
//!
//! # Modules
//!
//! - `api` - HTTP handlers for the local OAuth callback server
//! - `cards` - Card building and scanned payload parsing
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `management` - Persisted auth state and PKCE verifier storage
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Spotify Web API client implementation
//! - `types` - Data structures and type definitions
//! - `utils` - PKCE helpers and track list utilities
//!
//! # Example
//!
//! ```
//! use trackcards::{config, spotify::SpotifyApi};
//!
//! #[tokio::main]
//! async fn main() -> trackcards::Res<()> {
//!     config::load_env().await?;
//!     let api = SpotifyApi::new(config::Endpoints::from_env().api_base);
//!     // Use the API client...
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cards;
pub mod cli;
pub mod config;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Used by the CLI glue code where any error is only reported to the user.
/// Library operations return [`spotify::errors::Result`] instead.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Fetching playlists...");
/// info!("Found {} tracks", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Authentication completed successfully");
/// success!("Built {} cards", count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only meant for the CLI layer: the program terminates with exit code 1
/// right after the message is printed.
///
/// # Example
///
/// ```
/// error!("Missing Spotify client configuration");
/// // Program exits here
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// # Example
///
/// ```
/// warning!("Some compilation tracks could not be resolved");
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
