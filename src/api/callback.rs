use axum::{Extension, extract::OriginalUri, response::Html};
use tracing::{debug, warn};
use url::Url;

use crate::{
    server::CallbackState,
    spotify::auth::{clear_callback_params, parse_callback_code},
};

pub async fn callback(
    OriginalUri(uri): OriginalUri,
    Extension(state): Extension<CallbackState>,
) -> Html<&'static str> {
    let Ok(mut url) = Url::parse(&format!("http://localhost{uri}")) else {
        return Html("<h4>Invalid callback request.</h4>");
    };

    let code = parse_callback_code(&url);
    clear_callback_params(&mut url);
    debug!(%url, "oauth callback received");

    let outcome = match code {
        Some(code) => state
            .auth
            .exchange_code_for_token(&code)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string()),
        None => Err(url
            .query_pairs()
            .find(|(key, _)| key == "error")
            .map(|(_, reason)| format!("Spotify denied the authorization: {reason}"))
            .unwrap_or_else(|| "Callback without authorization code.".to_string())),
    };

    let page = match &outcome {
        Ok(()) => Html("<h2>Authentication successful.</h2><p>Close this browser window.</p>"),
        Err(e) => {
            warn!("Token exchange failed: {}", e);
            Html("<h4>Login failed.</h4><p>Check the terminal for details.</p>")
        }
    };

    *state.outcome.lock().await = Some(outcome);
    page
}
