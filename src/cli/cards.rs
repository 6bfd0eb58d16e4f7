use std::path::{Path, PathBuf};

use futures::future::join_all;
use tabled::Table;

use crate::{
    cards::build_cards_from_tracks,
    error, info,
    spotify::{AlbumTracks, SpotifyError, client::DEFAULT_PAGE_LIMIT},
    success,
    types::{Card, CardTableRow, Track},
    utils::remove_duplicate_tracks,
    warning,
};

/// Where the tracks for a card batch come from.
#[derive(Debug, Clone, Default)]
pub struct CardSources {
    pub playlists: Vec<String>,
    pub albums: Vec<String>,
    pub saved: bool,
    /// Writes the cards as JSON when set.
    pub output: Option<PathBuf>,
}

impl CardSources {
    fn is_empty(&self) -> bool {
        self.playlists.is_empty() && self.albums.is_empty() && !self.saved
    }
}

/// Builds one card per distinct track of the selected sources.
///
/// Playlists and albums are fetched concurrently and collected in the order
/// they were given, saved tracks first. A failing source aborts the whole batch.
pub async fn cards(sources: CardSources) {
    if sources.is_empty() {
        error!("Nothing to print. Select tracks with --playlist, --album or --saved");
    }

    let token = super::access_token().await;
    let api = super::spotify_api();
    let pb = super::spinner("Collecting tracks...");

    let mut tracks: Vec<Track> = Vec::new();

    if sources.saved {
        match api.get_current_user_saved_tracks(&token, None).await {
            Ok(saved) => tracks.extend(saved),
            Err(e) => {
                pb.finish_and_clear();
                error!("{}", e);
            }
        }
    }

    let playlist_results = join_all(
        sources
            .playlists
            .iter()
            .map(|playlist_id| api.get_playlist_tracks(&token, playlist_id, DEFAULT_PAGE_LIMIT)),
    );
    let album_results = join_all(
        sources
            .albums
            .iter()
            .map(|album_id| api.load_album_tracks(&token, album_id)),
    );
    let (playlist_results, album_results) = tokio::join!(playlist_results, album_results);

    for result in playlist_results {
        tracks.extend(or_exit(result, &pb));
    }

    let mut listed = 0;
    let mut unresolved = 0;
    for result in album_results {
        let album: AlbumTracks = or_exit(result, &pb);
        listed += album.total;
        unresolved += album.unresolved();
        tracks.extend(album.tracks);
    }
    pb.finish_and_clear();

    if unresolved > 0 {
        warning!(
            "{} of {} album tracks could not be matched to their original release and were skipped.",
            unresolved,
            listed
        );
    }

    let collected = tracks.len();
    remove_duplicate_tracks(&mut tracks);
    if tracks.len() < collected {
        info!("Skipped {} duplicate tracks.", collected - tracks.len());
    }

    if tracks.is_empty() {
        info!("No tracks found for the selected sources.");
        return;
    }

    let cards = build_cards_from_tracks(&tracks);
    print_cards(&cards);

    if let Some(path) = sources.output {
        if let Err(e) = write_cards(&path, &cards).await {
            error!("Failed to write cards to {}. Err: {}", path.display(), e);
        }
        success!("Wrote {} cards to {}", cards.len(), path.display());
    } else {
        success!("Built {} cards.", cards.len());
    }
}

fn or_exit<T>(result: Result<T, SpotifyError>, pb: &indicatif::ProgressBar) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            pb.finish_and_clear();
            error!("{}", e);
        }
    }
}

fn print_cards(cards: &[Card]) {
    let rows: Vec<CardTableRow> = cards
        .iter()
        .map(|card| CardTableRow {
            year: match card.year {
                0 => "Unknown".to_string(),
                year => year.to_string(),
            },
            title: card.title.clone(),
            artist: card.artist.clone(),
            uri: card.spotify_uri.clone(),
        })
        .collect();

    println!("{}", Table::new(rows));
}

async fn write_cards(path: &Path, cards: &[Card]) -> Result<(), String> {
    let json = serde_json::to_string_pretty(cards).map_err(|e| e.to_string())?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }
    async_fs::write(path, json).await.map_err(|e| e.to_string())
}
