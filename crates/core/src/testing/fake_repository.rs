//! In-memory fake repository with seeded randomness.

use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::watch;

use super::{fixtures, MockCatalogGateway};
use crate::model::{CastMember, ShowDetail, ShowId, ShowSummary};
use crate::remote::NetworkError;
use crate::repository::{CatalogError, ShowRepository, WatchStream};
use crate::search::{matches_query, score_show, LOCAL_BANDS, REMOTE_BANDS};
use crate::store::{PageBatch, ShowStore, SqliteShowStore, StorageError};
use crate::sync::{PageSynchronizer, PagingConfig, ShowPager, DEFAULT_CACHE_TTL_SECS};

const LOCAL_SEARCH_LIMIT: usize = 10;
const REMOTE_SEARCH_LIMIT: usize = 20;

/// Probability of a simulated failure per operation kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FailureRates {
    /// Remote search.
    pub remote: f64,
    /// Cached reads and watchlist membership checks.
    pub read: f64,
    /// Watchlist mutations and upserts.
    pub write: f64,
}

impl FailureRates {
    /// Never fail.
    pub fn none() -> Self {
        Self {
            remote: 0.0,
            read: 0.0,
            write: 0.0,
        }
    }
}

impl Default for FailureRates {
    fn default() -> Self {
        Self {
            remote: 0.05,
            read: 0.01,
            write: 0.02,
        }
    }
}

#[derive(Debug, Default)]
struct FakeState {
    shows: RwLock<Vec<ShowSummary>>,
    watchlist: RwLock<Vec<ShowId>>,
    cast: RwLock<Vec<(ShowId, Vec<CastMember>)>>,
}

impl FakeState {
    fn shows(&self) -> RwLockReadGuard<'_, Vec<ShowSummary>> {
        self.shows.read().unwrap_or_else(|e| e.into_inner())
    }

    fn shows_mut(&self) -> RwLockWriteGuard<'_, Vec<ShowSummary>> {
        self.shows.write().unwrap_or_else(|e| e.into_inner())
    }

    fn watchlist(&self) -> RwLockReadGuard<'_, Vec<ShowId>> {
        self.watchlist.read().unwrap_or_else(|e| e.into_inner())
    }

    fn watchlist_mut(&self) -> RwLockWriteGuard<'_, Vec<ShowId>> {
        self.watchlist.write().unwrap_or_else(|e| e.into_inner())
    }

    fn in_watchlist(&self, id: ShowId) -> bool {
        self.watchlist().contains(&id)
    }

    fn find(&self, id: ShowId) -> Option<ShowSummary> {
        self.shows().iter().find(|s| s.id == id).cloned()
    }

    fn upsert(&self, show: ShowSummary) {
        let mut shows = self.shows_mut();
        match shows.iter_mut().find(|s| s.id == show.id) {
            Some(existing) => *existing = show,
            None => shows.push(show),
        }
    }

    fn watchlist_shows(&self) -> Vec<ShowSummary> {
        let watchlist = self.watchlist();
        self.shows()
            .iter()
            .filter(|s| watchlist.contains(&s.id))
            .map(|s| s.clone().with_watchlist(true))
            .collect()
    }

    fn matching(&self, query: &str) -> Vec<ShowSummary> {
        let watchlist = self.watchlist();
        self.shows()
            .iter()
            .filter(|s| matches_query(s, query))
            .map(|s| s.clone().with_watchlist(watchlist.contains(&s.id)))
            .collect()
    }
}

/// In-memory [`ShowRepository`] for previews and use-case tests.
///
/// All randomness (simulated latency, simulated failures, remote revision
/// bumps) comes from one [`StdRng`] seeded at construction, so a given seed
/// always produces the same sequence of outcomes.
pub struct FakeShowRepository {
    state: Arc<FakeState>,
    rng: Mutex<StdRng>,
    failures: FailureRates,
    latency: bool,
    revision: watch::Sender<u64>,
}

impl FakeShowRepository {
    /// Create a fake over the sample catalog, without failures or latency.
    pub fn new(seed: u64) -> Self {
        let (revision, _) = watch::channel(0);
        let state = FakeState::default();
        *state.shows_mut() = fixtures::sample_catalog();

        Self {
            state: Arc::new(state),
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            failures: FailureRates::none(),
            latency: false,
            revision,
        }
    }

    /// Replace the catalog.
    pub fn with_shows(self, shows: Vec<ShowSummary>) -> Self {
        *self.state.shows_mut() = shows;
        self
    }

    /// Enable simulated failures.
    pub fn with_failure_rates(mut self, failures: FailureRates) -> Self {
        self.failures = failures;
        self
    }

    /// Enable simulated latency.
    pub fn with_latency(mut self, latency: bool) -> Self {
        self.latency = latency;
        self
    }

    /// Set the cast served for a show.
    pub fn set_cast(&self, id: ShowId, cast: Vec<CastMember>) {
        let mut all = self.state.cast.write().unwrap_or_else(|e| e.into_inner());
        all.retain(|(show_id, _)| *show_id != id);
        all.push((id, cast));
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut rng)
    }

    fn roll(&self, rate: f64) -> bool {
        rate > 0.0 && self.with_rng(|rng| rng.gen_bool(rate.min(1.0)))
    }

    async fn delay(&self, base_ms: u64, jitter_ms: u64) {
        if !self.latency {
            return;
        }
        let ms = base_ms + self.with_rng(|rng| rng.gen_range(0..jitter_ms.max(1)));
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    fn read_failure(&self) -> Result<(), StorageError> {
        if self.roll(self.failures.read) {
            return Err(StorageError::OperationFailed("Simulated read failure".to_string()));
        }
        Ok(())
    }

    fn write_failure(&self) -> Result<(), StorageError> {
        if self.roll(self.failures.write) {
            return Err(StorageError::OperationFailed(
                "Simulated write failure".to_string(),
            ));
        }
        Ok(())
    }

    fn notify(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    fn watch<T, F>(&self, query: F) -> WatchStream<T>
    where
        T: Send + 'static,
        F: Fn(&FakeState) -> Result<T, StorageError> + Send + Sync + 'static,
    {
        let query = Arc::new(query);
        let changes = self.revision.subscribe();
        stream::unfold(
            (self.state.clone(), changes, true),
            move |(state, mut changes, first)| {
                let query = query.clone();
                async move {
                    if !first {
                        changes.changed().await.ok()?;
                    }
                    let result = query(&state);
                    Some((result, (state, changes, false)))
                }
            },
        )
        .boxed()
    }

    /// Seed an in-memory store with the catalog as page 0, marked fresh.
    fn seeded_store(&self) -> Result<Arc<dyn ShowStore>, StorageError> {
        let store = SqliteShowStore::in_memory()?;
        store.store_page(&PageBatch {
            page: 0,
            shows: self.state.shows().clone(),
            prev_key: None,
            next_key: None,
            refresh_at: Some(Utc::now()),
        })?;
        for id in self.state.watchlist().iter() {
            store.add_to_watchlist(*id)?;
        }
        Ok(Arc::new(store))
    }
}

#[async_trait]
impl ShowRepository for FakeShowRepository {
    /// Pager over a snapshot of the fake catalog. The remote side is empty,
    /// so the snapshot is the whole collection.
    fn pager(&self) -> ShowPager {
        let store = self.seeded_store().ok();
        let synchronizer = PageSynchronizer::new(
            Arc::new(MockCatalogGateway::new()),
            store.clone(),
            Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        );
        ShowPager::new(store, synchronizer, PagingConfig::default())
    }

    async fn show_details(&self, id: ShowId) -> Result<ShowDetail, CatalogError> {
        self.delay(150, 200).await;
        match self.state.find(id) {
            Some(show) => {
                let in_watchlist = self.state.in_watchlist(id);
                Ok(ShowDetail::from(show).with_watchlist(in_watchlist))
            }
            None => Err(CatalogError::ShowUnavailable {
                id,
                remote: NetworkError::Protocol {
                    status: Some(404),
                    message: format!("Show {} not found", id),
                },
            }),
        }
    }

    async fn show_cast(&self, id: ShowId) -> Result<Vec<CastMember>, CatalogError> {
        self.delay(100, 150).await;
        let cast = self.state.cast.read().unwrap_or_else(|e| e.into_inner());
        Ok(cast
            .iter()
            .find(|(show_id, _)| *show_id == id)
            .map(|(_, members)| members.clone())
            .unwrap_or_default())
    }

    async fn cached_show(&self, id: ShowId) -> Result<Option<ShowDetail>, StorageError> {
        self.delay(30, 50).await;
        self.read_failure()?;
        let in_watchlist = self.state.in_watchlist(id);
        Ok(self
            .state
            .find(id)
            .map(|s| ShowDetail::from(s).with_watchlist(in_watchlist)))
    }

    async fn search_local(&self, query: &str) -> Result<Vec<ShowSummary>, StorageError> {
        self.delay(50, 100).await;
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(local_results(&self.state, query))
    }

    fn watch_search_local(&self, query: &str) -> WatchStream<Vec<ShowSummary>> {
        let query = query.to_string();
        self.watch(move |state| {
            if query.trim().is_empty() {
                return Ok(Vec::new());
            }
            Ok(local_results(state, &query))
        })
    }

    async fn search_remote(&self, query: &str) -> Result<Vec<ShowSummary>, NetworkError> {
        self.delay(250, 250).await;
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        if self.roll(self.failures.remote) {
            return Err(NetworkError::Protocol {
                status: Some(503),
                message: "Simulated remote failure".to_string(),
            });
        }

        let results = self
            .state
            .matching(query)
            .into_iter()
            .take(REMOTE_SEARCH_LIMIT)
            .map(|show| {
                let score = score_show(&show, query, &REMOTE_BANDS);
                // Remote copies carry a newer revision
                let bump = self.with_rng(|rng| rng.gen_range(1..1000));
                let mut show = show.with_score(score);
                show.updated += bump;
                show
            })
            .collect();
        Ok(results)
    }

    async fn add_to_watchlist(&self, id: ShowId) -> Result<(), StorageError> {
        self.delay(50, 100).await;
        self.write_failure()?;
        {
            let mut watchlist = self.state.watchlist_mut();
            if !watchlist.contains(&id) {
                watchlist.push(id);
            }
        }
        self.notify();
        Ok(())
    }

    async fn remove_from_watchlist(&self, id: ShowId) -> Result<(), StorageError> {
        self.delay(50, 100).await;
        self.write_failure()?;
        self.state.watchlist_mut().retain(|w| *w != id);
        self.notify();
        Ok(())
    }

    async fn is_in_watchlist(&self, id: ShowId) -> Result<bool, StorageError> {
        self.delay(30, 50).await;
        self.read_failure()?;
        Ok(self.state.in_watchlist(id))
    }

    fn watch_in_watchlist(&self, id: ShowId) -> WatchStream<bool> {
        self.watch(move |state| Ok(state.in_watchlist(id)))
    }

    async fn watchlist_shows(&self) -> Result<Vec<ShowSummary>, StorageError> {
        self.read_failure()?;
        Ok(self.state.watchlist_shows())
    }

    fn watch_watchlist(&self) -> WatchStream<Vec<ShowSummary>> {
        self.watch(|state| Ok(state.watchlist_shows()))
    }

    async fn upsert_shows(&self, shows: &[ShowSummary]) -> Result<(), StorageError> {
        self.delay(50, 100).await;
        self.write_failure()?;
        for show in shows {
            self.state.upsert(show.clone());
        }
        self.notify();
        Ok(())
    }

    async fn upsert_show_detail(&self, show: &ShowDetail) -> Result<(), StorageError> {
        self.delay(50, 100).await;
        self.write_failure()?;
        self.state.upsert(ShowSummary::from(show.clone()));
        self.notify();
        Ok(())
    }
}

fn local_results(state: &FakeState, query: &str) -> Vec<ShowSummary> {
    state
        .matching(query)
        .into_iter()
        .take(LOCAL_SEARCH_LIMIT)
        .map(|show| {
            let score = score_show(&show, query, &LOCAL_BANDS);
            show.with_score(score)
        })
        .collect()
}
