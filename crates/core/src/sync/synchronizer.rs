//! Incremental load state machine between the remote catalog and the cache.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::types::{
    InitializeAction, LoadError, LoadSuccess, LoadType, PagingState, STARTING_PAGE_INDEX,
};
use crate::model::{RemoteKey, ShowId};
use crate::remote::CatalogGateway;
use crate::store::{run_blocking, PageBatch, ShowStore, StorageError};

/// Default cache time-to-live.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 60 * 60;

/// Directions known to be exhausted since the last refresh.
#[derive(Debug, Default)]
struct Exhausted {
    prepend: bool,
    append: bool,
}

/// Decides, per load request, which remote page to fetch and writes it into
/// the local cache.
///
/// One instance belongs to one paging session. Loads are serialized: a
/// refresh never races an append on the same remote keys.
pub struct PageSynchronizer {
    gateway: Arc<dyn CatalogGateway>,
    store: Option<Arc<dyn ShowStore>>,
    cache_ttl: Duration,
    exhausted: Mutex<Exhausted>,
}

impl PageSynchronizer {
    pub fn new(
        gateway: Arc<dyn CatalogGateway>,
        store: Option<Arc<dyn ShowStore>>,
        cache_ttl: std::time::Duration,
    ) -> Self {
        let cache_ttl = match Duration::from_std(cache_ttl) {
            Ok(ttl) => ttl,
            Err(_) => {
                warn!(
                    "Cache TTL of {}s is out of range, using {}s",
                    cache_ttl.as_secs(),
                    DEFAULT_CACHE_TTL_SECS
                );
                Duration::seconds(DEFAULT_CACHE_TTL_SECS as i64)
            }
        };

        Self {
            gateway,
            store,
            cache_ttl,
            exhausted: Mutex::new(Exhausted::default()),
        }
    }

    /// Check cache validity before the first load.
    ///
    /// An expired, never-refreshed or unreadable cache asks for a refresh.
    pub async fn initialize(&self) -> InitializeAction {
        let Some(store) = self.store.clone() else {
            warn!("No local store, cache considered expired");
            return InitializeAction::LaunchInitialRefresh;
        };

        match run_blocking(store, |s| s.cache_validity()).await {
            Ok(validity) if validity.is_expired(self.cache_ttl, Utc::now()) => {
                debug!("Cache expired (last refresh: {:?})", validity.last_refresh);
                InitializeAction::LaunchInitialRefresh
            }
            Ok(_) => {
                debug!("Cache still valid, skipping initial refresh");
                InitializeAction::SkipInitialRefresh
            }
            Err(e) => {
                error!("Cache check failed: {}", e);
                InitializeAction::LaunchInitialRefresh
            }
        }
    }

    /// Run one load.
    ///
    /// Resolves the target page from the remote keys of `state`, fetches it
    /// and applies it to the cache in a single transaction. Failures are
    /// returned as-is; nothing is retried here.
    pub async fn load(
        &self,
        load_type: LoadType,
        state: &PagingState,
    ) -> Result<LoadSuccess, LoadError> {
        let mut exhausted = self.exhausted.lock().await;

        let store = self.store.clone().ok_or(StorageError::Unavailable)?;

        let page = match load_type {
            LoadType::Refresh => {
                let key = match state.closest_item_to_anchor() {
                    Some(id) => Self::remote_key(&store, id).await?,
                    None => None,
                };
                key.and_then(|k| k.next_key)
                    .map(|next| next.saturating_sub(1))
                    .unwrap_or(STARTING_PAGE_INDEX)
            }
            LoadType::Prepend => {
                if exhausted.prepend {
                    return Ok(LoadSuccess::end_reached());
                }
                match Self::boundary_key(&store, state.first_item(), |k| k.prev_key).await? {
                    Some(page) => page,
                    None => {
                        exhausted.prepend = true;
                        return Ok(LoadSuccess::end_reached());
                    }
                }
            }
            LoadType::Append => {
                if exhausted.append {
                    return Ok(LoadSuccess::end_reached());
                }
                match Self::boundary_key(&store, state.last_item(), |k| k.next_key).await? {
                    Some(page) => page,
                    None => {
                        exhausted.append = true;
                        return Ok(LoadSuccess::end_reached());
                    }
                }
            }
        };

        debug!("Loading page {} ({})", page, load_type);

        let shows = self.gateway.get_page(page).await.map_err(|e| {
            error!("Page {} fetch failed ({}): {}", page, load_type, e);
            LoadError::Network(e)
        })?;

        let end_of_pagination_reached = shows.is_empty();
        let refresh = load_type == LoadType::Refresh;
        let count = shows.len();

        let batch = PageBatch {
            page,
            shows,
            prev_key: if page == STARTING_PAGE_INDEX {
                None
            } else {
                Some(page - 1)
            },
            next_key: if end_of_pagination_reached {
                None
            } else {
                Some(page + 1)
            },
            refresh_at: refresh.then(Utc::now),
        };

        run_blocking(store, move |s| s.store_page(&batch))
            .await
            .map_err(|e| {
                error!("Storing page {} failed: {}", page, e);
                LoadError::Storage(e)
            })?;

        if refresh {
            info!("Refreshed catalog from page {} ({} shows)", page, count);
            *exhausted = Exhausted::default();
        }
        if end_of_pagination_reached {
            match load_type {
                LoadType::Prepend => exhausted.prepend = true,
                LoadType::Append | LoadType::Refresh => exhausted.append = true,
            }
        }

        Ok(LoadSuccess {
            end_of_pagination_reached,
        })
    }

    async fn remote_key(
        store: &Arc<dyn ShowStore>,
        id: ShowId,
    ) -> Result<Option<RemoteKey>, StorageError> {
        run_blocking(store.clone(), move |s| s.remote_key(id)).await
    }

    /// Page token next to a boundary item. None when there is no item, no
    /// key, or no further page.
    async fn boundary_key(
        store: &Arc<dyn ShowStore>,
        item: Option<ShowId>,
        token: impl Fn(&RemoteKey) -> Option<u32>,
    ) -> Result<Option<u32>, StorageError> {
        let Some(id) = item else {
            return Ok(None);
        };
        Ok(Self::remote_key(store, id).await?.as_ref().and_then(token))
    }
}
