use axum::{Extension, Router, routing::get};
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::sync::Mutex;
use tracing::debug;

use crate::{Res, api, config, spotify::SpotifyAuth};

/// Shared between the callback handler and the command waiting for it.
#[derive(Clone)]
pub struct CallbackState {
    pub auth: Arc<SpotifyAuth>,
    /// `None` until a callback arrived; then the exchange outcome.
    pub outcome: Arc<Mutex<Option<Result<(), String>>>>,
}

impl CallbackState {
    pub fn new(auth: Arc<SpotifyAuth>) -> Self {
        Self {
            auth,
            outcome: Arc::new(Mutex::new(None)),
        }
    }
}

pub async fn start_api_server(state: CallbackState) -> Res<()> {
    let app = Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback).layer(Extension(state)));

    let addr = SocketAddr::from_str(&config::server_addr())?;
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    debug!(%addr, "callback server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
