use tabled::Table;

use crate::{
    error, info,
    types::{AlbumTableRow, TrackTableRow},
};

pub async fn search_tracks(query: String) {
    let token = super::access_token().await;
    let api = super::spotify_api();

    let pb = super::spinner(&format!("Searching tracks for \"{query}\"..."));
    let tracks = match api.search_tracks(&token, &query).await {
        Ok(tracks) => tracks,
        Err(e) => {
            pb.finish_and_clear();
            error!("{}", e);
        }
    };
    pb.finish_and_clear();

    if tracks.is_empty() {
        info!("No tracks found.");
        return;
    }

    let rows: Vec<TrackTableRow> = tracks
        .into_iter()
        .map(|t| TrackTableRow {
            artists: t.artist_names(", "),
            name: t.name,
            album: t.album.name,
            released: t.album.release_date,
            id: t.id,
        })
        .collect();

    println!("{}", Table::new(rows));
}

pub async fn search_albums(query: String) {
    let token = super::access_token().await;
    let api = super::spotify_api();

    let pb = super::spinner(&format!("Searching albums for \"{query}\"..."));
    let albums = match api.search_albums(&token, &query).await {
        Ok(albums) => albums,
        Err(e) => {
            pb.finish_and_clear();
            error!("{}", e);
        }
    };
    pb.finish_and_clear();

    if albums.is_empty() {
        info!("No albums found.");
        return;
    }

    let rows: Vec<AlbumTableRow> = albums
        .into_iter()
        .map(|a| AlbumTableRow {
            artists: a
                .artists
                .iter()
                .map(|artist| artist.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            name: a.name,
            released: a.release_date,
            tracks: a.total_tracks,
            id: a.id,
        })
        .collect();

    println!("{}", Table::new(rows));
}
