use serde::{Deserialize, Deserializer, Serialize};
use tabled::Tabled;

/// Persisted Spotify authorization.
///
/// `expires_at` is epoch milliseconds computed from the `expires_in` reported
/// by the token endpoint at write time. A missing refresh token means the user
/// has to authorize again once the access token expires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAuthState {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub expires_at: i64,
}

/// Body returned by `POST /api/token` for both grant types.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRef {
    #[serde(default, deserialize_with = "null_to_default")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumRef {
    #[serde(default, deserialize_with = "null_to_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub release_date: String,
}

/// Canonical track shape returned by every fetcher, whatever wrapper the
/// Spotify endpoint used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artists: Vec<ArtistRef>,
    pub album: AlbumRef,
}

impl Track {
    /// Artist names joined with `separator`, in credit order.
    pub fn artist_names(&self, separator: &str) -> String {
        self.artists
            .iter()
            .map(|artist| artist.name.as_str())
            .collect::<Vec<_>>()
            .join(separator)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAlbum {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub album_type: Option<String>,
}

/// Track object as Spotify sends it. Local files and unavailable content can
/// come back with null ids or missing fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTrack {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub artists: Vec<Option<ArtistRef>>,
    #[serde(default)]
    pub album: Option<RawAlbum>,
}

impl RawTrack {
    pub fn album_type(&self) -> Option<&str> {
        self.album.as_ref().and_then(|a| a.album_type.as_deref())
    }

    pub fn artist_refs(&self) -> Vec<ArtistRef> {
        self.artists.iter().flatten().cloned().collect()
    }

    /// Normalizes into a [`Track`] using the embedded album. Tracks without an
    /// id cannot be turned into cards and yield `None`.
    pub fn into_track(self) -> Option<Track> {
        let album = self
            .album
            .as_ref()
            .map(|a| AlbumRef {
                name: a.name.clone().unwrap_or_default(),
                release_date: a.release_date.clone().unwrap_or_default(),
            })
            .unwrap_or_default();
        self.into_track_on(album)
    }

    /// Normalizes into a [`Track`] attributed to `album`, used for album track
    /// listings whose items carry no album object.
    pub fn into_track_on(self, album: AlbumRef) -> Option<Track> {
        let artists = self.artist_refs();
        let id = self.id.filter(|id| !id.is_empty())?;
        Some(Track {
            id,
            name: self.name.unwrap_or_default(),
            artists,
            album,
        })
    }
}

/// One page of a Spotify paging object. `next` is null once exhausted.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(default, deserialize_with = "null_to_default")]
    pub items: Vec<Option<T>>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// Item of `GET /playlists/{id}/items`. Newer responses nest the track under
/// `item`, older ones under `track`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItem {
    #[serde(default)]
    pub track: Option<RawTrack>,
    #[serde(default)]
    pub item: Option<RawTrack>,
}

/// Item of `GET /me/tracks`.
#[derive(Debug, Clone, Deserialize)]
pub struct SavedTrackItem {
    #[serde(default)]
    pub track: Option<RawTrack>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    #[serde(default, deserialize_with = "null_to_default")]
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistOwner {
    #[serde(default, deserialize_with = "null_to_default")]
    pub display_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackCount {
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub images: Vec<Image>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub owner: PlaylistOwner,
    /// Track count under its current name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<TrackCount>,
    /// Track count under its legacy name. Responses may carry either key or both.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracks: Option<TrackCount>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub external_urls: ExternalUrls,
}

impl Playlist {
    /// Number of tracks, read from `items` first and `tracks` second, 0 when
    /// neither is present.
    pub fn track_total(&self) -> u64 {
        self.items
            .as_ref()
            .or(self.tracks.as_ref())
            .map(|count| count.total)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub release_date: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub images: Vec<Image>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub artists: Vec<ArtistRef>,
    #[serde(default)]
    pub total_tracks: u64,
}

/// Subset of `GET /albums/{id}` the resolver needs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlbumMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub album_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub tracks: Option<Page<RawTrack>>,
    #[serde(default)]
    pub albums: Option<Page<Album>>,
}

/// A printable card. The QR code on the card encodes `spotify_uri`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub year: i32,
    pub spotify_uri: String,
}

#[derive(Tabled)]
pub struct CardTableRow {
    pub year: String,
    pub title: String,
    pub artist: String,
    pub uri: String,
}

#[derive(Tabled)]
pub struct PlaylistTableRow {
    pub name: String,
    pub owner: String,
    pub tracks: u64,
    pub id: String,
}

#[derive(Tabled)]
pub struct TrackTableRow {
    pub name: String,
    pub artists: String,
    pub album: String,
    pub released: String,
    pub id: String,
}

#[derive(Tabled)]
pub struct AlbumTableRow {
    pub name: String,
    pub artists: String,
    pub released: String,
    pub tracks: u64,
    pub id: String,
}

fn null_to_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
