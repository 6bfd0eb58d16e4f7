use crate::{
    cards::{parse_track_from_scan, track_uri, track_url},
    error, success, warning,
};

/// Resolves a scanned card payload and optionally opens the track.
pub fn scan(value: String, open: bool) {
    let Some(track_id) = parse_track_from_scan(&value) else {
        error!("Not a Spotify track reference: {}", value.trim());
    };

    let url = track_url(&track_id);
    success!("Track {}", track_id);
    println!("  uri: {}", track_uri(&track_id));
    println!("  url: {}", url);

    if open && webbrowser::open(&url).is_err() {
        warning!("Failed to open browser. Open {} manually.", url);
    }
}
