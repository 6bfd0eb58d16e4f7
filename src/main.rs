use std::path::PathBuf;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tracing_subscriber::EnvFilter;

use trackcards::{
    cli::{self, CardSources},
    config, error,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Connect your Spotify account
    Auth,

    /// Forget stored Spotify tokens
    Logout,

    /// List your playlists
    Playlists,

    /// Search the Spotify catalog
    Search(SearchOptions),

    /// Build cards from playlists, albums or saved tracks
    Cards(CardsOptions),

    /// Resolve a scanned card to its track
    Scan(ScanOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct SearchOptions {
    #[command(subcommand)]
    pub command: SearchSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SearchSubcommand {
    /// Search tracks
    Tracks { query: String },

    /// Search albums
    Albums { query: String },
}

#[derive(Parser, Debug, Clone)]
pub struct CardsOptions {
    /// Playlist id to include; can be repeated
    #[clap(long = "playlist", num_args = 1)]
    pub playlists: Vec<String>,

    /// Album id to include; can be repeated
    #[clap(long = "album", num_args = 1)]
    pub albums: Vec<String>,

    /// Include your saved tracks
    #[clap(long)]
    pub saved: bool,

    /// Write the cards as JSON to this file
    #[clap(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct ScanOptions {
    /// Scanned payload, a spotify:track URI or an open.spotify.com track link
    pub value: String,

    /// Open the track in the browser
    #[clap(long)]
    pub open: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Auth => cli::auth().await,
        Command::Logout => cli::logout().await,
        Command::Playlists => cli::list_playlists().await,
        Command::Search(opt) => match opt.command {
            SearchSubcommand::Tracks { query } => cli::search_tracks(query).await,
            SearchSubcommand::Albums { query } => cli::search_albums(query).await,
        },
        Command::Cards(opt) => {
            cli::cards(CardSources {
                playlists: opt.playlists,
                albums: opt.albums,
                saved: opt.saved,
                output: opt.output,
            })
            .await
        }
        Command::Scan(opt) => cli::scan(opt.value, opt.open),
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
