use crate::{
    spotify::{SpotifyApi, client::DEFAULT_PAGE_LIMIT, errors::Result},
    types::{SavedTrackItem, Track},
};

impl SpotifyApi {
    /// The current user's "Liked Songs", most recently saved first.
    pub async fn get_current_user_saved_tracks(
        &self,
        access_token: &str,
        limit: Option<u32>,
    ) -> Result<Vec<Track>> {
        self.paginate(
            access_token,
            "/me/tracks",
            limit.unwrap_or(DEFAULT_PAGE_LIMIT),
            "retrieve saved tracks",
            |item: SavedTrackItem| item.track.and_then(|t| t.into_track()),
        )
        .await
    }
}
