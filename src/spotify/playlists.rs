use crate::{
    spotify::{
        SpotifyApi,
        client::DEFAULT_PAGE_LIMIT,
        errors::Result,
    },
    types::{Playlist, PlaylistItem, Track},
};

impl SpotifyApi {
    /// All tracks of a playlist, in playlist order.
    ///
    /// Removed or unavailable entries come back as null placeholders (or tracks
    /// without an id) and are skipped.
    pub async fn get_playlist_tracks(
        &self,
        access_token: &str,
        playlist_id: &str,
        limit: u32,
    ) -> Result<Vec<Track>> {
        self.paginate(
            access_token,
            &format!("/playlists/{playlist_id}/items"),
            limit,
            "retrieve playlist tracks",
            |item: PlaylistItem| item.track.or(item.item).and_then(|t| t.into_track()),
        )
        .await
    }

    /// Every playlist the current user owns or follows.
    pub async fn get_current_user_playlists(
        &self,
        access_token: &str,
        limit: Option<u32>,
    ) -> Result<Vec<Playlist>> {
        self.paginate(
            access_token,
            "/me/playlists",
            limit.unwrap_or(DEFAULT_PAGE_LIMIT),
            "retrieve playlists",
            |playlist: Playlist| Some(playlist),
        )
        .await
    }
}
