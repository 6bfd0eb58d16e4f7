use tabled::Table;

use crate::{error, info, types::PlaylistTableRow};

pub async fn list_playlists() {
    let token = super::access_token().await;
    let api = super::spotify_api();

    let pb = super::spinner("Fetching playlists...");
    let playlists = match api.get_current_user_playlists(&token, None).await {
        Ok(playlists) => playlists,
        Err(e) => {
            pb.finish_and_clear();
            error!("{}", e);
        }
    };
    pb.finish_and_clear();

    if playlists.is_empty() {
        info!("No playlists found.");
        return;
    }

    let rows: Vec<PlaylistTableRow> = playlists
        .into_iter()
        .map(|p| PlaylistTableRow {
            tracks: p.track_total(),
            name: p.name,
            owner: p.owner.display_name,
            id: p.id,
        })
        .collect();

    println!("{}", Table::new(rows));
}
