//! Local cache store - persistent show rows, watchlist membership and
//! pagination bookkeeping.
//!
//! The store is the only mutable shared resource in the core. Every
//! multi-row write happens inside a single transaction, and every committed
//! write bumps a revision published through [`ShowStore::changes`] so
//! reactive readers can re-run their queries.

mod sqlite;
mod types;

pub use sqlite::SqliteShowStore;
pub use types::*;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::model::{RemoteKey, ShowDetail, ShowId, ShowSummary};

/// Trait for local show cache backends.
pub trait ShowStore: Send + Sync {
    /// Apply one fetched remote page atomically.
    ///
    /// When `batch.refresh_at` is set, all show rows and remote keys are
    /// deleted first and the cache is marked valid at that instant. Either
    /// the whole batch becomes visible or none of it does.
    fn store_page(&self, batch: &PageBatch) -> Result<(), StorageError>;

    /// Read a window of the paged collection, ordered by page then id.
    fn shows_window(&self, limit: u32, offset: u32) -> Result<Vec<ShowSummary>, StorageError>;

    /// Number of rows in the paged collection.
    fn count_shows(&self) -> Result<u64, StorageError>;

    /// Get a cached show by id, annotated with watchlist membership.
    fn get_show(&self, id: ShowId) -> Result<Option<ShowDetail>, StorageError>;

    /// Pagination page recorded for a show (None if absent or cached outside paging).
    fn show_page(&self, id: ShowId) -> Result<Option<u32>, StorageError>;

    /// Case-insensitive substring search over name, summary and genres.
    fn search(&self, query: &str) -> Result<Vec<ShowSummary>, StorageError>;

    /// Insert or update shows, keeping each existing row's page.
    fn upsert_shows(&self, shows: &[ShowSummary]) -> Result<(), StorageError>;

    /// Insert or update one show detail, keeping the existing row's page.
    fn upsert_show_detail(&self, show: &ShowDetail) -> Result<(), StorageError>;

    /// Get the remote key for a show.
    fn remote_key(&self, show_id: ShowId) -> Result<Option<RemoteKey>, StorageError>;

    /// Read the cache validity marker.
    fn cache_validity(&self) -> Result<CacheValidity, StorageError>;

    /// Set the cache validity marker.
    fn mark_cache_valid(&self, at: DateTime<Utc>) -> Result<(), StorageError>;

    /// Add a show to the watchlist. Adding twice is a no-op.
    fn add_to_watchlist(&self, id: ShowId) -> Result<(), StorageError>;

    /// Remove a show from the watchlist. Removing an absent id is a no-op.
    fn remove_from_watchlist(&self, id: ShowId) -> Result<(), StorageError>;

    /// Check watchlist membership.
    fn is_in_watchlist(&self, id: ShowId) -> Result<bool, StorageError>;

    /// Ids of all watchlisted shows, cached or not.
    fn watchlist_ids(&self) -> Result<Vec<ShowId>, StorageError>;

    /// Watchlisted shows joined with their cached rows.
    fn watchlist_shows(&self) -> Result<Vec<ShowSummary>, StorageError>;

    /// Row counts and refresh time.
    fn stats(&self) -> Result<StoreStats, StorageError>;

    /// Clear all cached data, including the watchlist.
    fn clear(&self) -> Result<(), StorageError>;

    /// Subscribe to store revisions. The value increases after every committed write.
    fn changes(&self) -> watch::Receiver<u64>;
}

/// Run a store call on the blocking thread pool.
///
/// A panic inside `f` is resumed on the calling task.
pub async fn run_blocking<T, F>(store: Arc<dyn ShowStore>, f: F) -> Result<T, StorageError>
where
    T: Send + 'static,
    F: FnOnce(&dyn ShowStore) -> Result<T, StorageError> + Send + 'static,
{
    match tokio::task::spawn_blocking(move || f(store.as_ref())).await {
        Ok(result) => result,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => Err(StorageError::OperationFailed(format!(
            "Store task did not complete: {}",
            e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_blocking_returns_result() {
        let store: Arc<dyn ShowStore> = Arc::new(SqliteShowStore::in_memory().unwrap());
        let count = run_blocking(store, |s| s.count_shows()).await.unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    #[should_panic(expected = "boom")]
    async fn test_run_blocking_resumes_panics() {
        let store: Arc<dyn ShowStore> = Arc::new(SqliteShowStore::in_memory().unwrap());
        let _: Result<(), StorageError> = run_blocking(store, |_| panic!("boom")).await;
    }
}
