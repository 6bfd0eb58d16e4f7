use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::{
    spotify::{errors::Result, request::request_json},
    types::Page,
};

/// Page size used for every paginated listing.
pub const DEFAULT_PAGE_LIMIT: u32 = 50;

/// Authenticated Spotify Web API client.
///
/// Holds no credentials: every call takes the access token to use, so the
/// caller decides when to ask the auth flow for a fresh one.
#[derive(Debug, Clone)]
pub struct SpotifyApi {
    client: Client,
    base_url: String,
}

impl SpotifyApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub(crate) fn url(&self, path: &str, params: &[(&str, String)]) -> Result<String> {
        let raw = format!("{}{}", self.base_url, path);
        let url = if params.is_empty() {
            Url::parse(&raw)?
        } else {
            Url::parse_with_params(&raw, params)?
        };
        Ok(url.into())
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        access_token: &str,
        path: &str,
        params: &[(&str, String)],
        action: &str,
    ) -> Result<T> {
        let url = self.url(path, params)?;
        request_json(&self.client, access_token, &url, action, None).await
    }

    /// Walks an offset paginated listing until Spotify stops sending a `next`
    /// link.
    ///
    /// Pages are requested strictly one after another with `offset` advancing by
    /// `limit`. Null items are skipped and `normalize` drops whatever else it
    /// cannot use. An empty page that still has a `next` link does not stop the
    /// walk.
    pub(crate) async fn paginate<I, T, F>(
        &self,
        access_token: &str,
        path: &str,
        limit: u32,
        action: &str,
        mut normalize: F,
    ) -> Result<Vec<T>>
    where
        I: DeserializeOwned,
        F: FnMut(I) -> Option<T>,
    {
        let mut collected = Vec::new();
        let mut offset: u32 = 0;

        loop {
            let params = [("offset", offset.to_string()), ("limit", limit.to_string())];
            let page: Page<I> = self.get_json(access_token, path, &params, action).await?;

            let before = collected.len();
            collected.extend(page.items.into_iter().flatten().filter_map(&mut normalize));
            debug!(
                path,
                offset,
                added = collected.len() - before,
                has_next = page.next.is_some(),
                "fetched page"
            );

            if page.next.is_none() {
                break;
            }
            offset += limit;
        }

        Ok(collected)
    }
}
