use crate::{
    spotify::{SpotifyApi, errors::Result},
    types::{Album, RawTrack, SearchResponse, Track},
};

impl SpotifyApi {
    /// First page of track matches for `query`.
    pub async fn search_tracks(&self, access_token: &str, query: &str) -> Result<Vec<Track>> {
        let candidates = self
            .search_track_candidates(access_token, query, None)
            .await?;
        Ok(candidates
            .into_iter()
            .filter_map(RawTrack::into_track)
            .collect())
    }

    /// First page of album matches for `query`.
    pub async fn search_albums(&self, access_token: &str, query: &str) -> Result<Vec<Album>> {
        let params = [("q", query.to_string()), ("type", "album".to_string())];
        let response: SearchResponse = self
            .get_json(access_token, "/search", &params, "search albums")
            .await?;

        Ok(response
            .albums
            .map(|page| page.items.into_iter().flatten().collect())
            .unwrap_or_default())
    }

    /// Raw track hits, album type included, for callers that rank candidates.
    pub async fn search_track_candidates(
        &self,
        access_token: &str,
        query: &str,
        limit: Option<u32>,
    ) -> Result<Vec<RawTrack>> {
        let mut params = vec![("q", query.to_string()), ("type", "track".to_string())];
        if let Some(limit) = limit {
            params.push(("limit", limit.to_string()));
        }

        let response: SearchResponse = self
            .get_json(access_token, "/search", &params, "search tracks")
            .await?;

        Ok(response
            .tracks
            .map(|page| page.items.into_iter().flatten().collect())
            .unwrap_or_default())
    }
}
