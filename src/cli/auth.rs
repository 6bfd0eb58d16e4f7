use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use crate::{
    config, error, info,
    server::{CallbackState, start_api_server},
    success, warning,
};

const MAX_CALLBACK_WAIT: Duration = Duration::from_secs(120);

/// Connects the Spotify account.
///
/// Starts the callback server, opens the authorization page and waits until
/// the callback handler finished the token exchange or the wait times out.
/// The server and this command share one [`crate::spotify::SpotifyAuth`], so
/// the verifier kept in session storage is visible to the exchange.
pub async fn auth() {
    let auth = Arc::new(super::spotify_auth());
    let state = CallbackState::new(Arc::clone(&auth));

    let server_state = state.clone();
    tokio::spawn(async move {
        if let Err(e) = start_api_server(server_state).await {
            warning!("Callback server stopped. Err: {}", e);
        }
    });

    let auth_url = match auth.start_auth(&config::scopes()).await {
        Ok(url) => url,
        Err(e) => error!("Cannot start authorization. Err: {}", e),
    };

    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }
    info!("Waiting for Spotify authorization...");

    match wait_for_callback(&state).await {
        Some(Ok(())) => success!("Authentication successful!"),
        Some(Err(e)) => error!("Authentication failed. Err: {}", e),
        None => error!("Authentication timed out."),
    }
}

pub async fn logout() {
    match super::spotify_auth().logout().await {
        Ok(()) => success!("Disconnected from Spotify."),
        Err(e) => error!("Failed to clear stored tokens. Err: {}", e),
    }
}

async fn wait_for_callback(state: &CallbackState) -> Option<Result<(), String>> {
    let start = Instant::now();

    while start.elapsed() < MAX_CALLBACK_WAIT {
        if let Some(outcome) = state.outcome.lock().await.take() {
            return Some(outcome);
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}
