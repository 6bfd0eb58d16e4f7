use async_trait::async_trait;
use futures::{StreamExt, stream};
use tracing::{debug, warn};

use crate::{
    spotify::{SpotifyApi, errors::Result},
    types::{AlbumMetadata, AlbumRef, ArtistRef, RawTrack, Track},
};

/// Upper bound of search requests in flight while resolving a compilation.
pub const MAX_CONCURRENT_RESOLUTIONS: usize = 5;

/// Search hits considered per compilation track.
pub const CANDIDATE_LIMIT: u32 = 10;

const ALBUM_TRACKS_PAGE_LIMIT: u32 = 50;

/// Catalog search used to find the original release of a compilation track.
#[async_trait]
pub trait TrackSearch: Send + Sync {
    async fn search_candidates(
        &self,
        access_token: &str,
        query: &str,
        limit: u32,
    ) -> Result<Vec<RawTrack>>;
}

#[async_trait]
impl TrackSearch for SpotifyApi {
    async fn search_candidates(
        &self,
        access_token: &str,
        query: &str,
        limit: u32,
    ) -> Result<Vec<RawTrack>> {
        self.search_track_candidates(access_token, query, Some(limit))
            .await
    }
}

/// Compilation track waiting for its original release to be looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredTrack {
    pub id: String,
    pub name: String,
    pub artists: Vec<ArtistRef>,
}

impl DeferredTrack {
    fn from_raw(raw: RawTrack) -> Option<Self> {
        let artists = raw.artist_refs();
        Some(Self {
            id: raw.id.filter(|id| !id.is_empty())?,
            name: raw.name.unwrap_or_default(),
            artists,
        })
    }

    /// `"{name} {artist names joined by spaces}"`.
    pub fn search_query(&self) -> String {
        let artists = self
            .artists
            .iter()
            .map(|artist| artist.name.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        format!("{} {}", self.name, artists)
    }
}

/// Tracks of one album together with how many were listed. For compilations
/// `tracks.len()` can be lower than `total` when some could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumTracks {
    pub tracks: Vec<Track>,
    pub total: usize,
}

impl AlbumTracks {
    pub fn unresolved(&self) -> usize {
        self.total.saturating_sub(self.tracks.len())
    }
}

impl SpotifyApi {
    /// Tracks of an album, each carrying the release it most likely came from.
    ///
    /// Regular albums are returned as listed, attributed to the album itself.
    /// Compilations report their own pressing date, so every track is looked up
    /// again in the catalog and attributed to the release found there. Tracks
    /// that cannot be resolved are dropped.
    pub async fn get_album_tracks(&self, access_token: &str, album_id: &str) -> Result<Vec<Track>> {
        Ok(self.load_album_tracks(access_token, album_id).await?.tracks)
    }

    /// Same as [`SpotifyApi::get_album_tracks`], keeping the listed track count.
    ///
    /// The album metadata is fetched first, then its track listing page by page
    /// with 50 tracks per request. Only compilations trigger catalog searches.
    ///
    /// # Arguments
    ///
    /// * `access_token` - Valid access token for the Web API
    /// * `album_id` - Spotify id of the album
    ///
    /// # Returns
    ///
    /// An [`AlbumTracks`] whose `total` counts the listed tracks. For a
    /// compilation `tracks` holds the resolved ones in listing order and
    /// [`AlbumTracks::unresolved`] tells how many were dropped.
    ///
    /// # Errors
    ///
    /// Any failure while fetching the metadata or a listing page aborts the
    /// call with that error. Failed searches for single compilation tracks do
    /// not; those tracks are dropped.
    ///
    /// # Example
    ///
    /// ```
    /// let album = api.load_album_tracks(&token, "1A2GTWGtFfWp7KSQTwWOyo").await?;
    /// if album.unresolved() > 0 {
    ///     warning!("{} of {} tracks skipped", album.unresolved(), album.total);
    /// }
    /// ```
    pub async fn load_album_tracks(
        &self,
        access_token: &str,
        album_id: &str,
    ) -> Result<AlbumTracks> {
        let album: AlbumMetadata = self
            .get_json(
                access_token,
                &format!("/albums/{album_id}"),
                &[],
                "retrieve album",
            )
            .await?;
        let is_compilation = album.album_type.as_deref() == Some("compilation");

        let items = self
            .paginate(
                access_token,
                &format!("/albums/{album_id}/tracks"),
                ALBUM_TRACKS_PAGE_LIMIT,
                "retrieve album tracks",
                |item: RawTrack| Some(item),
            )
            .await?;

        if !is_compilation {
            let base_album = AlbumRef {
                name: album.name.unwrap_or_default(),
                release_date: album.release_date.unwrap_or_default(),
            };
            let tracks: Vec<Track> = items
                .into_iter()
                .filter_map(|item| item.into_track_on(base_album.clone()))
                .collect();
            return Ok(AlbumTracks {
                total: tracks.len(),
                tracks,
            });
        }

        let deferred: Vec<DeferredTrack> =
            items.into_iter().filter_map(DeferredTrack::from_raw).collect();
        debug!(album_id, tracks = deferred.len(), "resolving compilation");

        let tracks = resolve_compilation_tracks(self, access_token, &deferred).await;
        Ok(AlbumTracks {
            tracks,
            total: deferred.len(),
        })
    }
}

/// Resolves deferred compilation tracks with at most
/// [`MAX_CONCURRENT_RESOLUTIONS`] searches in flight.
///
/// Results are written into a slot per input index, so the output keeps the
/// input order no matter in which order the searches complete. Unresolved
/// slots are left out without leaving a gap.
///
/// # Arguments
///
/// * `searcher` - Catalog search, [`SpotifyApi`] outside of tests
/// * `access_token` - Token passed through to every search
/// * `tracks` - Compilation tracks in listing order
///
/// # Returns
///
/// One [`Track`] per resolved input, attributed to the album of the chosen
/// candidate (see [`pick_candidate`]). A track whose search fails or finds
/// nothing is logged and left out; this function never fails as a whole.
///
/// # Example
///
/// ```
/// let resolved = resolve_compilation_tracks(&api, &token, &deferred).await;
/// let dropped = deferred.len() - resolved.len();
/// ```
pub async fn resolve_compilation_tracks<S>(
    searcher: &S,
    access_token: &str,
    tracks: &[DeferredTrack],
) -> Vec<Track>
where
    S: TrackSearch + ?Sized,
{
    if tracks.is_empty() {
        return Vec::new();
    }

    let workers = MAX_CONCURRENT_RESOLUTIONS.min(tracks.len());
    let mut slots: Vec<Option<Track>> = vec![None; tracks.len()];

    let mut resolutions = stream::iter(tracks.iter().enumerate())
        .map(|(index, track)| async move {
            (index, resolve_track(searcher, access_token, track).await)
        })
        .buffer_unordered(workers);

    while let Some((index, resolved)) = resolutions.next().await {
        slots[index] = resolved;
    }

    let resolved: Vec<Track> = slots.into_iter().flatten().collect();
    debug!(
        resolved = resolved.len(),
        total = tracks.len(),
        "compilation resolution finished"
    );
    resolved
}

async fn resolve_track<S>(searcher: &S, access_token: &str, track: &DeferredTrack) -> Option<Track>
where
    S: TrackSearch + ?Sized,
{
    let query = track.search_query();
    let candidates = match searcher
        .search_candidates(access_token, &query, CANDIDATE_LIMIT)
        .await
    {
        Ok(candidates) => candidates,
        Err(e) => {
            warn!(track_id = %track.id, name = %track.name, error = %e, "dropping compilation track, search failed");
            return None;
        }
    };

    let Some(candidate) = pick_candidate(candidates) else {
        warn!(track_id = %track.id, name = %track.name, "dropping compilation track, no search candidates");
        return None;
    };

    candidate.into_track()
}

/// First candidate released on a regular album, else the first candidate.
pub fn pick_candidate(candidates: Vec<RawTrack>) -> Option<RawTrack> {
    let position = candidates
        .iter()
        .position(|candidate| candidate.album_type() == Some("album"))
        .unwrap_or(0);
    candidates.into_iter().nth(position)
}
