//! Cards and scanned card payloads.
//!
//! A card shows title, artist and release year; its QR code carries the
//! `spotify:track:` URI. Scanning a card yields that URI (or a track URL, when
//! a card was printed from a share link), which [`parse_track_from_scan`] turns
//! back into a track id.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::{Card, Track};

static TRACK_URI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^spotify:track:([A-Za-z0-9]+)$").expect("valid track URI pattern")
});

static TRACK_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)open\.spotify\.com/track/([A-Za-z0-9]+)(?:\?|/|$)")
        .expect("valid track URL pattern")
});

/// Maps tracks to cards, one per track and in the same order.
///
/// Card ids append the batch position to the track id so that a track listed
/// twice still gets two distinct cards.
pub fn build_cards_from_tracks(tracks: &[Track]) -> Vec<Card> {
    tracks
        .iter()
        .enumerate()
        .map(|(index, track)| Card {
            id: format!("{}-{}", track.id, index),
            title: track.name.clone(),
            artist: track.artist_names(", "),
            year: release_year(&track.album.release_date),
            spotify_uri: track_uri(&track.id),
        })
        .collect()
}

/// Year part of a `YYYY`, `YYYY-MM` or `YYYY-MM-DD` release date, 0 when it
/// cannot be read.
///
/// Only the leading digits before the first `-` count, so `1999/05/01` and
/// `1999abc` both give 1999.
pub fn release_year(release_date: &str) -> i32 {
    let year = release_date
        .split('-')
        .next()
        .unwrap_or_default()
        .trim_start();
    let year = year.strip_prefix('+').unwrap_or(year);
    let digits = year
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(year.len());
    year[..digits].parse().unwrap_or(0)
}

pub fn track_uri(track_id: &str) -> String {
    format!("spotify:track:{track_id}")
}

pub fn track_url(track_id: &str) -> String {
    format!("https://open.spotify.com/track/{track_id}")
}

/// Extracts the track id from a scanned `spotify:track:<id>` URI or an
/// `open.spotify.com/track/<id>` link. Anything else is `None`.
pub fn parse_track_from_scan(value: &str) -> Option<String> {
    let text = value.trim();

    TRACK_URI
        .captures(text)
        .or_else(|| TRACK_URL.captures(text))
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str().to_string())
}
