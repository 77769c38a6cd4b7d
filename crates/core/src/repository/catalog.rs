//! Production repository over the remote gateway and the SQLite cache.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use super::{CatalogError, ShowRepository, WatchStream};
use crate::model::{CastMember, ShowDetail, ShowId, ShowSummary};
use crate::remote::{CatalogGateway, NetworkError};
use crate::search::{score_show, LOCAL_BANDS, REMOTE_BANDS};
use crate::store::{run_blocking, ShowStore, StorageError};
use crate::sync::{PageSynchronizer, PagingConfig, ShowPager};

/// Repository over a [`CatalogGateway`] and an optional [`ShowStore`].
///
/// Without a store every storage operation reports
/// [`StorageError::Unavailable`] and paging is degenerate (always empty).
pub struct CatalogRepository {
    gateway: Arc<dyn CatalogGateway>,
    store: Option<Arc<dyn ShowStore>>,
    cache_ttl: Duration,
    paging: PagingConfig,
}

impl CatalogRepository {
    pub fn new(
        gateway: Arc<dyn CatalogGateway>,
        store: Option<Arc<dyn ShowStore>>,
        cache_ttl: Duration,
        paging: PagingConfig,
    ) -> Self {
        Self {
            gateway,
            store,
            cache_ttl,
            paging,
        }
    }

    async fn with_store<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn ShowStore) -> Result<T, StorageError> + Send + 'static,
    {
        let store = self.store.clone().ok_or(StorageError::Unavailable)?;
        run_blocking(store, f).await
    }

    /// Stream that runs `query` now and again after every store revision.
    fn watch_query<T, F>(&self, query: F) -> WatchStream<T>
    where
        T: Send + 'static,
        F: Fn(&dyn ShowStore) -> Result<T, StorageError> + Clone + Send + Sync + 'static,
    {
        let Some(store) = self.store.clone() else {
            return stream::once(async { Err(StorageError::Unavailable) }).boxed();
        };

        let changes = store.changes();
        stream::unfold(
            (store, changes, true),
            move |(store, mut changes, first)| {
                let query = query.clone();
                async move {
                    if !first {
                        // Store dropped: end of stream
                        changes.changed().await.ok()?;
                    }
                    let result = run_blocking(store.clone(), query).await;
                    Some((result, (store, changes, false)))
                }
            },
        )
        .boxed()
    }
}

#[async_trait]
impl ShowRepository for CatalogRepository {
    fn pager(&self) -> ShowPager {
        let synchronizer =
            PageSynchronizer::new(self.gateway.clone(), self.store.clone(), self.cache_ttl);
        ShowPager::new(self.store.clone(), synchronizer, self.paging.clone())
    }

    async fn show_details(&self, id: ShowId) -> Result<ShowDetail, CatalogError> {
        match self.gateway.get_show(id).await {
            Ok(detail) => {
                let cached = detail.clone();
                let in_watchlist = match self
                    .with_store(move |s| {
                        s.upsert_show_detail(&cached)?;
                        s.is_in_watchlist(id)
                    })
                    .await
                {
                    Ok(in_watchlist) => {
                        debug!("Cached details of show {}", id);
                        in_watchlist
                    }
                    Err(e) => {
                        warn!("Failed to cache details of show {}: {}", id, e);
                        false
                    }
                };
                Ok(detail.with_watchlist(in_watchlist))
            }
            Err(remote) => {
                warn!(
                    "Remote details of show {} failed, trying cache: {}",
                    id, remote
                );
                match self.with_store(move |s| s.get_show(id)).await {
                    Ok(Some(detail)) => Ok(detail),
                    Ok(None) => Err(CatalogError::ShowUnavailable { id, remote }),
                    Err(e) => {
                        warn!("Cached details of show {} unreadable: {}", id, e);
                        Err(CatalogError::ShowUnavailable { id, remote })
                    }
                }
            }
        }
    }

    async fn show_cast(&self, id: ShowId) -> Result<Vec<CastMember>, CatalogError> {
        Ok(self.gateway.get_cast(id).await?)
    }

    async fn cached_show(&self, id: ShowId) -> Result<Option<ShowDetail>, StorageError> {
        self.with_store(move |s| s.get_show(id)).await
    }

    async fn search_local(&self, query: &str) -> Result<Vec<ShowSummary>, StorageError> {
        let query = query.trim().to_string();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.with_store(move |s| local_search(s, &query)).await
    }

    fn watch_search_local(&self, query: &str) -> WatchStream<Vec<ShowSummary>> {
        let query = query.trim().to_string();
        if query.is_empty() {
            return stream::once(async { Ok(Vec::new()) }).boxed();
        }
        self.watch_query(move |s| local_search(s, &query))
    }

    async fn search_remote(&self, query: &str) -> Result<Vec<ShowSummary>, NetworkError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let results = self.gateway.search(query).await?;

        let watchlist = match self.with_store(|s| s.watchlist_ids()).await {
            Ok(ids) => ids,
            Err(e) => {
                debug!("Remote search without watchlist annotation: {}", e);
                Vec::new()
            }
        };

        Ok(results
            .into_iter()
            .map(|(show, _)| {
                let score = score_show(&show, query, &REMOTE_BANDS);
                let in_watchlist = watchlist.contains(&show.id);
                show.with_score(score).with_watchlist(in_watchlist)
            })
            .collect())
    }

    async fn add_to_watchlist(&self, id: ShowId) -> Result<(), StorageError> {
        self.with_store(move |s| s.add_to_watchlist(id)).await?;
        info!("Added show {} to watchlist", id);
        Ok(())
    }

    async fn remove_from_watchlist(&self, id: ShowId) -> Result<(), StorageError> {
        self.with_store(move |s| s.remove_from_watchlist(id)).await?;
        info!("Removed show {} from watchlist", id);
        Ok(())
    }

    async fn is_in_watchlist(&self, id: ShowId) -> Result<bool, StorageError> {
        self.with_store(move |s| s.is_in_watchlist(id)).await
    }

    fn watch_in_watchlist(&self, id: ShowId) -> WatchStream<bool> {
        self.watch_query(move |s| s.is_in_watchlist(id))
    }

    async fn watchlist_shows(&self) -> Result<Vec<ShowSummary>, StorageError> {
        self.with_store(|s| s.watchlist_shows()).await
    }

    fn watch_watchlist(&self) -> WatchStream<Vec<ShowSummary>> {
        self.watch_query(|s| s.watchlist_shows())
    }

    async fn upsert_shows(&self, shows: &[ShowSummary]) -> Result<(), StorageError> {
        let shows = shows.to_vec();
        self.with_store(move |s| s.upsert_shows(&shows)).await
    }

    async fn upsert_show_detail(&self, show: &ShowDetail) -> Result<(), StorageError> {
        let show = show.clone();
        self.with_store(move |s| s.upsert_show_detail(&show)).await
    }
}

fn local_search(store: &dyn ShowStore, query: &str) -> Result<Vec<ShowSummary>, StorageError> {
    Ok(store
        .search(query)?
        .into_iter()
        .map(|show| {
            let score = score_show(&show, query, &LOCAL_BANDS);
            show.with_score(score)
        })
        .collect())
}
