pub mod config;
pub mod model;
pub mod remote;
pub mod repository;
pub mod search;
pub mod store;
pub mod sync;
pub mod testing;
pub mod usecase;

pub use config::{
    load_config, load_config_from_str, load_config_or_default, validate_config, CacheConfig,
    Config, ConfigError, DatabaseConfig,
};
pub use model::{CastMember, RemoteKey, ShowDetail, ShowDetailsWithCast, ShowId, ShowSummary};
pub use remote::{CatalogGateway, NetworkError, RemoteConfig, TvMazeClient};
pub use repository::{CatalogError, CatalogRepository, ShowRepository, WatchStream};
pub use store::{ShowStore, SqliteShowStore, StorageError, StoreStats};
pub use sync::{
    InitializeAction, LoadError, LoadSuccess, LoadType, PageSynchronizer, PagingConfig,
    PagingState, ShowPager,
};
pub use usecase::{
    AddToWatchlist, GetTvShowDetailsWithCast, GetTvShows, GetWatchlist, RemoveFromWatchlist,
    SearchTvShows,
};
