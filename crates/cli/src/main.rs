mod commands;
mod logging;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing::{error, info, warn};

use tvmaniak_core::{
    load_config, load_config_or_default, validate_config, CatalogGateway, CatalogRepository,
    Config, ShowRepository, ShowStore, SqliteShowStore, TvMazeClient,
};

/// Default configuration file. Built-in defaults apply when it is missing.
const DEFAULT_CONFIG_PATH: &str = "tvmaniak.toml";

#[derive(Parser)]
#[command(name = "tvmaniak")]
#[command(about = "Browse the TVMaze catalog and keep a watchlist, with an offline cache")]
#[command(version)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// Configuration file
    #[arg(long, global = true, env = "TVMANIAK_CONFIG")]
    config: Option<PathBuf>,

    /// Print command output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List cached shows, syncing with the catalog when the cache is stale
    List {
        /// Number of shows to print
        #[arg(long, default_value_t = 50)]
        limit: usize,

        /// Skip this many shows
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
    /// Replace the cached catalog with a fresh copy of the first page
    Refresh,
    /// Show details and cast of a show
    Show {
        /// Show ID
        id: u32,
    },
    /// Search the cache and the catalog
    Search {
        /// Search text
        query: String,
    },
    /// Manage the watchlist
    Watchlist {
        #[command(subcommand)]
        cmd: WatchlistCommands,
    },
    /// Print cache statistics
    Stats,
    /// Print the effective configuration
    Config,
    /// Delete all cached data, including the watchlist
    Clear,
}

#[derive(Subcommand)]
enum WatchlistCommands {
    /// Add a show to the watchlist
    Add { id: u32 },
    /// Remove a show from the watchlist
    Remove { id: u32 },
    /// List watchlisted shows
    List {
        /// Keep running and print the watchlist again after every change
        #[arg(long)]
        follow: bool,
    },
}

/// Wired services shared by all commands.
pub struct App {
    pub config: Config,
    pub store: Option<Arc<dyn ShowStore>>,
    pub repository: Arc<dyn ShowRepository>,
    pub json: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet, cli.json_logs);

    if let Err(e) = run(cli).await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn resolve_config(path: Option<PathBuf>) -> Result<Config> {
    let config = match path {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            load_config(&path).with_context(|| format!("Failed to load config from {:?}", path))?
        }
        None => {
            let path = PathBuf::from(DEFAULT_CONFIG_PATH);
            load_config_or_default(&path)
                .with_context(|| format!("Failed to load config from {:?}", path))?
        }
    };

    validate_config(&config).context("Configuration validation failed")?;
    Ok(config)
}

fn build_app(config: Config, json: bool) -> Result<App> {
    let gateway: Arc<dyn CatalogGateway> = Arc::new(
        TvMazeClient::new(config.remote.clone()).context("Failed to create catalog client")?,
    );

    // Without a usable database the app still works against the remote catalog.
    let store: Option<Arc<dyn ShowStore>> = match SqliteShowStore::new(&config.database.path) {
        Ok(store) => Some(Arc::new(store)),
        Err(e) => {
            warn!(
                "Local cache at {:?} unavailable, running without it: {}",
                config.database.path, e
            );
            None
        }
    };

    let repository: Arc<dyn ShowRepository> = Arc::new(CatalogRepository::new(
        gateway,
        store.clone(),
        config.cache.ttl(),
        config.paging.clone(),
    ));

    Ok(App {
        config,
        store,
        repository,
        json,
    })
}

async fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(cli.config)?;
    info!("Database path: {:?}", config.database.path);

    let app = build_app(config, cli.json)?;

    match cli.command {
        Commands::List { limit, offset } => commands::list(&app, limit, offset).await,
        Commands::Refresh => commands::refresh(&app).await,
        Commands::Show { id } => commands::show(&app, id).await,
        Commands::Search { query } => commands::search(&app, &query).await,
        Commands::Watchlist { cmd } => match cmd {
            WatchlistCommands::Add { id } => commands::watchlist_add(&app, id).await,
            WatchlistCommands::Remove { id } => commands::watchlist_remove(&app, id).await,
            WatchlistCommands::List { follow } => commands::watchlist_list(&app, follow).await,
        },
        Commands::Stats => commands::stats(&app).await,
        Commands::Config => commands::print_config(&app),
        Commands::Clear => commands::clear(&app).await,
    }
}
