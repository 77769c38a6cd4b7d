//! Position-based paged reads over the local cache.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, warn};

use super::synchronizer::PageSynchronizer;
use super::types::{InitializeAction, LoadError, LoadSuccess, LoadType, PagingState};
use crate::model::ShowSummary;
use crate::store::{run_blocking, ShowStore};

/// Pager configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PagingConfig {
    /// Items read from the cache per prepend/append (default: 250).
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Items read on start and after a refresh (default: 250).
    #[serde(default = "default_initial_load_size")]
    pub initial_load_size: u32,
    /// Distance from either edge of the window at which the next load is due (default: 125).
    #[serde(default = "default_prefetch_distance")]
    pub prefetch_distance: u32,
    /// Maximum number of items kept in the window (default: 1000).
    #[serde(default = "default_max_size")]
    pub max_size: u32,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            initial_load_size: default_initial_load_size(),
            prefetch_distance: default_prefetch_distance(),
            max_size: default_max_size(),
        }
    }
}

fn default_page_size() -> u32 {
    250
}

fn default_initial_load_size() -> u32 {
    250
}

fn default_prefetch_distance() -> u32 {
    125
}

fn default_max_size() -> u32 {
    1000
}

/// Paging consumer over the cached show collection.
///
/// Holds a window of the paged collection (`offset` rows skipped, `items`
/// loaded). Cached rows are served first; the synchronizer is only asked to
/// fetch when the cache has nothing more in the requested direction.
pub struct ShowPager {
    store: Option<Arc<dyn ShowStore>>,
    synchronizer: PageSynchronizer,
    config: PagingConfig,
    offset: u32,
    items: Vec<ShowSummary>,
    anchor: Option<usize>,
}

impl ShowPager {
    pub fn new(
        store: Option<Arc<dyn ShowStore>>,
        synchronizer: PageSynchronizer,
        config: PagingConfig,
    ) -> Self {
        Self {
            store,
            synchronizer,
            config,
            offset: 0,
            items: Vec::new(),
            anchor: None,
        }
    }

    /// Currently loaded items, in catalog order.
    pub fn items(&self) -> &[ShowSummary] {
        &self.items
    }

    /// Position of the first loaded item within the whole cached collection.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Record the position (relative to `items()`) the consumer last accessed.
    pub fn set_anchor(&mut self, position: usize) {
        self.anchor = Some(position);
    }

    /// Whether the anchor is within prefetch distance of the end of the window.
    pub fn should_append(&self) -> bool {
        match self.anchor {
            Some(anchor) => anchor + self.config.prefetch_distance as usize >= self.items.len(),
            None => self.items.is_empty(),
        }
    }

    /// Whether the anchor is within prefetch distance of the start of the window.
    pub fn should_prepend(&self) -> bool {
        matches!(self.anchor, Some(anchor) if anchor < self.config.prefetch_distance as usize)
    }

    /// Store revisions. With no store the receiver never changes.
    pub fn changes(&self) -> watch::Receiver<u64> {
        match &self.store {
            Some(store) => store.changes(),
            None => watch::channel(0).1,
        }
    }

    fn paging_state(&self) -> PagingState {
        PagingState::new(self.items.iter().map(|s| s.id).collect(), self.anchor)
    }

    /// Check cache validity and either refresh from the remote catalog or
    /// serve the cache as is.
    ///
    /// A failed initial refresh still loads whatever the cache holds before
    /// reporting the error.
    pub async fn start(&mut self) -> Result<LoadSuccess, LoadError> {
        if self.store.is_none() {
            return Ok(LoadSuccess::end_reached());
        }

        match self.synchronizer.initialize().await {
            InitializeAction::LaunchInitialRefresh => {
                let result = self.refresh().await;
                if result.is_err() {
                    if let Err(e) = self.reload().await {
                        warn!("Could not read cached shows after failed refresh: {}", e);
                    }
                }
                result
            }
            InitializeAction::SkipInitialRefresh => {
                self.reload().await?;
                Ok(LoadSuccess::more_available())
            }
        }
    }

    /// Replace the collection from the remote catalog, then reload the window
    /// from the top.
    pub async fn refresh(&mut self) -> Result<LoadSuccess, LoadError> {
        if self.store.is_none() {
            return Ok(LoadSuccess::end_reached());
        }

        let result = self
            .synchronizer
            .load(LoadType::Refresh, &self.paging_state())
            .await?;

        self.offset = 0;
        self.items.clear();
        self.anchor = None;
        self.reload().await?;
        Ok(result)
    }

    /// Re-read the current window from the cache, e.g. after a store revision.
    pub async fn reload(&mut self) -> Result<(), LoadError> {
        let limit = (self.items.len() as u32).max(self.config.initial_load_size);
        let shows = self.read_window(limit, self.offset).await?;

        if shows.is_empty() && self.offset > 0 {
            // Rows behind the window are gone; start over.
            self.offset = 0;
            self.items = self.read_window(limit, 0).await?;
        } else {
            self.items = shows;
        }

        debug!(
            "Reloaded window: offset={} items={}",
            self.offset,
            self.items.len()
        );
        Ok(())
    }

    /// Extend the window at the end, fetching the next remote page when the
    /// cache has no more rows.
    pub async fn append(&mut self) -> Result<LoadSuccess, LoadError> {
        if self.store.is_none() {
            return Ok(LoadSuccess::end_reached());
        }

        let next = self.offset + self.items.len() as u32;
        let cached = self.read_window(self.config.page_size, next).await?;
        if !cached.is_empty() {
            self.push_back(cached);
            return Ok(LoadSuccess::more_available());
        }

        let result = self
            .synchronizer
            .load(LoadType::Append, &self.paging_state())
            .await?;

        let fetched = self.read_window(self.config.page_size, next).await?;
        self.push_back(fetched);
        Ok(result)
    }

    /// Extend the window at the start, fetching the previous remote page when
    /// the window already begins at the first cached row.
    pub async fn prepend(&mut self) -> Result<LoadSuccess, LoadError> {
        if self.store.is_none() {
            return Ok(LoadSuccess::end_reached());
        }

        if self.offset > 0 {
            let count = self.offset.min(self.config.page_size);
            let cached = self.read_window(count, self.offset - count).await?;
            self.push_front(cached);
            return Ok(LoadSuccess::more_available());
        }

        let before = self.count().await?;
        let result = self
            .synchronizer
            .load(LoadType::Prepend, &self.paging_state())
            .await?;

        let added = self.count().await?.saturating_sub(before) as u32;
        if added > 0 {
            let fetched = self.read_window(added, 0).await?;
            self.push_front(fetched);
        }
        Ok(result)
    }

    fn push_back(&mut self, shows: Vec<ShowSummary>) {
        self.items.extend(shows);

        let max = self.config.max_size as usize;
        if self.items.len() > max {
            let overflow = self.items.len() - max;
            self.items.drain(..overflow);
            self.offset += overflow as u32;
            self.anchor = self.anchor.map(|a| a.saturating_sub(overflow));
        }
    }

    fn push_front(&mut self, shows: Vec<ShowSummary>) {
        let added = shows.len();
        self.offset = self.offset.saturating_sub(added as u32);
        self.items.splice(0..0, shows);
        self.anchor = self.anchor.map(|a| a + added);

        let max = self.config.max_size as usize;
        if self.items.len() > max {
            self.items.truncate(max);
            self.anchor = self.anchor.map(|a| a.min(max.saturating_sub(1)));
        }
    }

    async fn read_window(&self, limit: u32, offset: u32) -> Result<Vec<ShowSummary>, LoadError> {
        let Some(store) = self.store.clone() else {
            return Ok(Vec::new());
        };
        Ok(run_blocking(store, move |s| s.shows_window(limit, offset)).await?)
    }

    async fn count(&self) -> Result<u64, LoadError> {
        let Some(store) = self.store.clone() else {
            return Ok(0);
        };
        Ok(run_blocking(store, |s| s.count_shows()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::NetworkError;
    use crate::store::SqliteShowStore;
    use crate::testing::{fixtures, MockCatalogGateway};
    use chrono::Utc;
    use std::time::Duration;

    fn small_config() -> PagingConfig {
        PagingConfig {
            page_size: 2,
            initial_load_size: 2,
            prefetch_distance: 1,
            max_size: 4,
        }
    }

    fn setup(config: PagingConfig) -> (Arc<MockCatalogGateway>, Arc<SqliteShowStore>, ShowPager) {
        let gateway = Arc::new(MockCatalogGateway::new());
        let store = Arc::new(SqliteShowStore::in_memory().unwrap());
        let sync = PageSynchronizer::new(
            gateway.clone(),
            Some(store.clone()),
            Duration::from_secs(3600),
        );
        let pager = ShowPager::new(Some(store.clone()), sync, config);
        (gateway, store, pager)
    }

    fn ids(pager: &ShowPager) -> Vec<u32> {
        pager.items().iter().map(|s| s.id).collect()
    }

    #[test]
    fn test_default_config() {
        let config = PagingConfig::default();
        assert_eq!(config.page_size, 250);
        assert_eq!(config.initial_load_size, 250);
        assert_eq!(config.prefetch_distance, 125);
        assert_eq!(config.max_size, 1000);
    }

    #[tokio::test]
    async fn test_start_on_cold_cache_refreshes() {
        let (gateway, _store, mut pager) = setup(PagingConfig::default());
        gateway.set_page(0, fixtures::shows(&[1, 2, 3])).await;

        let result = pager.start().await.unwrap();

        assert!(!result.end_of_pagination_reached);
        assert_eq!(ids(&pager), vec![1, 2, 3]);
        assert_eq!(gateway.page_requests().await, vec![0]);
    }

    #[tokio::test]
    async fn test_start_on_fresh_cache_skips_remote() {
        let (gateway, store, mut pager) = setup(PagingConfig::default());
        store
            .store_page(&crate::store::PageBatch {
                page: 0,
                shows: fixtures::shows(&[7, 8]),
                prev_key: None,
                next_key: Some(1),
                refresh_at: Some(Utc::now()),
            })
            .unwrap();

        pager.start().await.unwrap();

        assert_eq!(ids(&pager), vec![7, 8]);
        assert!(gateway.page_requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_start_still_serves_cache() {
        let (gateway, store, mut pager) = setup(PagingConfig::default());
        store
            .store_page(&crate::store::PageBatch {
                page: 0,
                shows: fixtures::shows(&[7]),
                prev_key: None,
                next_key: Some(1),
                refresh_at: Some(Utc::now() - chrono::Duration::hours(2)),
            })
            .unwrap();
        gateway
            .set_next_error(NetworkError::Io("offline".to_string()))
            .await;

        let result = pager.start().await;

        assert!(matches!(result, Err(LoadError::Network(_))));
        assert_eq!(ids(&pager), vec![7]);
    }

    #[tokio::test]
    async fn test_append_reads_cache_before_fetching() {
        let (gateway, _store, mut pager) = setup(small_config());
        gateway.set_page(0, fixtures::shows(&[1, 2, 3, 4])).await;
        gateway.set_page(1, fixtures::shows(&[5])).await;

        pager.start().await.unwrap();
        assert_eq!(ids(&pager), vec![1, 2]);

        pager.append().await.unwrap();
        assert_eq!(ids(&pager), vec![1, 2, 3, 4]);
        assert_eq!(gateway.page_requests().await, vec![0]);

        pager.append().await.unwrap();
        assert_eq!(gateway.page_requests().await, vec![0, 1]);
        // Window is capped at max_size
        assert_eq!(ids(&pager), vec![2, 3, 4, 5]);
        assert_eq!(pager.offset(), 1);
    }

    #[tokio::test]
    async fn test_append_until_end() {
        let (gateway, _store, mut pager) = setup(PagingConfig::default());
        gateway.set_page(0, fixtures::shows(&[1])).await;

        pager.start().await.unwrap();
        let result = pager.append().await.unwrap();
        assert!(result.end_of_pagination_reached);

        let again = pager.append().await.unwrap();
        assert!(again.end_of_pagination_reached);
        assert_eq!(gateway.page_requests().await, vec![0, 1]);
    }

    #[tokio::test]
    async fn test_prepend_reads_rows_before_window() {
        let (gateway, _store, mut pager) = setup(small_config());
        gateway.set_page(0, fixtures::shows(&[1, 2, 3, 4])).await;
        gateway.set_page(1, fixtures::shows(&[5, 6])).await;

        pager.start().await.unwrap();
        pager.append().await.unwrap();
        pager.append().await.unwrap();
        assert_eq!(ids(&pager), vec![3, 4, 5, 6]);

        let result = pager.prepend().await.unwrap();
        assert!(!result.end_of_pagination_reached);
        assert_eq!(ids(&pager), vec![1, 2, 3, 4]);
        assert_eq!(pager.offset(), 0);

        let result = pager.prepend().await.unwrap();
        assert!(result.end_of_pagination_reached);
    }

    #[tokio::test]
    async fn test_reload_sees_watchlist_change() {
        let (gateway, store, mut pager) = setup(PagingConfig::default());
        gateway.set_page(0, fixtures::shows(&[1, 2])).await;
        pager.start().await.unwrap();

        let mut changes = pager.changes();
        changes.borrow_and_update();
        store.add_to_watchlist(2).unwrap();
        assert!(changes.has_changed().unwrap());

        pager.reload().await.unwrap();
        assert!(pager.items()[1].is_in_watchlist);
    }

    #[tokio::test]
    async fn test_prefetch_hints() {
        let (gateway, _store, mut pager) = setup(small_config());
        gateway.set_page(0, fixtures::shows(&[1, 2, 3, 4])).await;
        pager.start().await.unwrap();
        pager.append().await.unwrap();

        pager.set_anchor(1);
        assert!(!pager.should_append());
        assert!(!pager.should_prepend());

        pager.set_anchor(3);
        assert!(pager.should_append());

        pager.set_anchor(0);
        assert!(pager.should_prepend());
    }

    #[tokio::test]
    async fn test_without_store_is_always_empty() {
        let gateway = Arc::new(MockCatalogGateway::new());
        let sync = PageSynchronizer::new(gateway.clone(), None, Duration::from_secs(3600));
        let mut pager = ShowPager::new(None, sync, PagingConfig::default());

        assert!(pager.start().await.unwrap().end_of_pagination_reached);
        assert!(pager.append().await.unwrap().end_of_pagination_reached);
        assert!(pager.prepend().await.unwrap().end_of_pagination_reached);
        assert!(pager.refresh().await.unwrap().end_of_pagination_reached);
        assert!(pager.items().is_empty());
        assert!(gateway.page_requests().await.is_empty());
    }
}
