use std::sync::Arc;

use futures::stream::{BoxStream, StreamExt};
use tracing::{debug, error, warn};

use crate::model::{ShowId, ShowSummary};
use crate::repository::{CatalogError, ShowRepository};
use crate::store::StorageError;

/// Add a show to the watchlist, caching it first when needed.
pub struct AddToWatchlist {
    repository: Arc<dyn ShowRepository>,
}

impl AddToWatchlist {
    pub fn new(repository: Arc<dyn ShowRepository>) -> Self {
        Self { repository }
    }

    /// A show is never added to the watchlist without a cached row.
    ///
    /// When the show is not cached (or the cache cannot be read because no
    /// store exists) its details are fetched and cached first. If that
    /// fails, nothing is added.
    pub async fn execute(&self, id: ShowId) -> Result<(), CatalogError> {
        match self.repository.cached_show(id).await {
            Ok(Some(_)) => debug!("Show {} already cached", id),
            Ok(None) | Err(StorageError::Unavailable) => {
                debug!("Show {} not cached, fetching details", id);
                let detail = self.repository.show_details(id).await.map_err(|e| {
                    error!("Failed to fetch show {} for watchlist: {}", id, e);
                    e
                })?;
                self.repository.upsert_show_detail(&detail).await?;
            }
            Err(e) => {
                error!("Cache lookup for show {} failed: {}", id, e);
                return Err(e.into());
            }
        }

        self.repository.add_to_watchlist(id).await?;
        Ok(())
    }
}

/// Remove a show from the watchlist.
pub struct RemoveFromWatchlist {
    repository: Arc<dyn ShowRepository>,
}

impl RemoveFromWatchlist {
    pub fn new(repository: Arc<dyn ShowRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, id: ShowId) -> Result<(), StorageError> {
        self.repository.remove_from_watchlist(id).await
    }
}

/// Watchlisted shows. Storage failures read as an empty watchlist.
pub struct GetWatchlist {
    repository: Arc<dyn ShowRepository>,
}

impl GetWatchlist {
    pub fn new(repository: Arc<dyn ShowRepository>) -> Self {
        Self { repository }
    }

    /// Current watchlist.
    pub async fn execute(&self) -> Vec<ShowSummary> {
        self.repository.watchlist_shows().await.unwrap_or_else(|e| {
            warn!("Watchlist unavailable: {}", e);
            Vec::new()
        })
    }

    /// Watchlist that re-emits after every change.
    pub fn watch(&self) -> BoxStream<'static, Vec<ShowSummary>> {
        self.repository
            .watch_watchlist()
            .map(|result| {
                result.unwrap_or_else(|e| {
                    warn!("Watchlist unavailable: {}", e);
                    Vec::new()
                })
            })
            .boxed()
    }
}
