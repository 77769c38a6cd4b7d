//! Catalog repository - the façade the use cases talk to.
//!
//! Composes paged reads (through [`ShowPager`]), remote-first detail reads
//! with local fallback, local and remote search, and watchlist mutations.

mod catalog;

pub use catalog::CatalogRepository;

use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

use crate::model::{CastMember, ShowDetail, ShowId, ShowSummary};
use crate::remote::NetworkError;
use crate::store::StorageError;
use crate::sync::ShowPager;

/// Errors surfaced by the repository and the use cases.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Neither the remote catalog nor the local cache could provide the show.
    #[error("Show {id} is unavailable: remote fetch failed ({remote}) and it is not cached")]
    ShowUnavailable { id: ShowId, remote: NetworkError },
}

/// Reactive stream of query results. Re-runs the query after every store write.
pub type WatchStream<T> = BoxStream<'static, Result<T, StorageError>>;

/// Data access for the show catalog.
#[async_trait]
pub trait ShowRepository: Send + Sync {
    /// New paging session over the cached catalog, kept current by the synchronizer.
    fn pager(&self) -> ShowPager;

    /// Remote-first show details.
    ///
    /// On success the result is cached and annotated with watchlist
    /// membership. On remote failure the cached copy is returned instead;
    /// only when both fail is an error reported.
    async fn show_details(&self, id: ShowId) -> Result<ShowDetail, CatalogError>;

    /// Cast of a show, straight from the remote catalog.
    async fn show_cast(&self, id: ShowId) -> Result<Vec<CastMember>, CatalogError>;

    /// Cached show, if present. Does not touch the network.
    async fn cached_show(&self, id: ShowId) -> Result<Option<ShowDetail>, StorageError>;

    /// Scored substring search over the local cache. A blank query yields nothing.
    async fn search_local(&self, query: &str) -> Result<Vec<ShowSummary>, StorageError>;

    /// Reactive variant of [`ShowRepository::search_local`].
    fn watch_search_local(&self, query: &str) -> WatchStream<Vec<ShowSummary>>;

    /// Scored remote search. A blank query yields nothing without a remote call.
    async fn search_remote(&self, query: &str) -> Result<Vec<ShowSummary>, NetworkError>;

    async fn add_to_watchlist(&self, id: ShowId) -> Result<(), StorageError>;

    async fn remove_from_watchlist(&self, id: ShowId) -> Result<(), StorageError>;

    async fn is_in_watchlist(&self, id: ShowId) -> Result<bool, StorageError>;

    /// Reactive watchlist membership of one show.
    fn watch_in_watchlist(&self, id: ShowId) -> WatchStream<bool>;

    /// Watchlisted shows joined with their cached rows.
    async fn watchlist_shows(&self) -> Result<Vec<ShowSummary>, StorageError>;

    /// Reactive variant of [`ShowRepository::watchlist_shows`].
    fn watch_watchlist(&self) -> WatchStream<Vec<ShowSummary>>;

    /// Cache shows without changing their paging membership.
    async fn upsert_shows(&self, shows: &[ShowSummary]) -> Result<(), StorageError>;

    /// Cache one show detail without changing its paging membership.
    async fn upsert_show_detail(&self, show: &ShowDetail) -> Result<(), StorageError>;
}
