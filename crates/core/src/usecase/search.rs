use std::sync::Arc;

use tracing::{debug, warn};

use crate::model::ShowSummary;
use crate::repository::ShowRepository;
use crate::search::merge_results;

/// Combined local and remote search.
pub struct SearchTvShows {
    repository: Arc<dyn ShowRepository>,
}

impl SearchTvShows {
    pub fn new(repository: Arc<dyn ShowRepository>) -> Self {
        Self { repository }
    }

    /// Run local and remote search concurrently and merge the results.
    ///
    /// A failing source contributes nothing. Remote results are cached
    /// before merging; a failed cache write is only logged.
    pub async fn execute(&self, query: &str) -> Vec<ShowSummary> {
        let (local, remote) = tokio::join!(
            self.repository.search_local(query),
            self.repository.search_remote(query)
        );

        let local = local.unwrap_or_else(|e| {
            warn!("Local search for '{}' failed: {}", query, e);
            Vec::new()
        });

        let remote = match remote {
            Ok(remote) => {
                if !remote.is_empty() {
                    if let Err(e) = self.repository.upsert_shows(&remote).await {
                        warn!("Failed to cache remote search results: {}", e);
                    }
                }
                remote
            }
            Err(e) => {
                warn!("Remote search for '{}' failed: {}", query, e);
                Vec::new()
            }
        };

        debug!(
            "Search '{}': {} local, {} remote",
            query,
            local.len(),
            remote.len()
        );
        merge_results(local, remote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::NetworkError;
    use crate::repository::CatalogRepository;
    use crate::search::{LOCAL_BANDS, REMOTE_BANDS};
    use crate::store::{ShowStore, SqliteShowStore};
    use crate::sync::PagingConfig;
    use crate::testing::{fixtures, FakeShowRepository, MockCatalogGateway};
    use std::time::Duration;

    fn setup() -> (Arc<MockCatalogGateway>, Arc<SqliteShowStore>, SearchTvShows) {
        let gateway = Arc::new(MockCatalogGateway::new());
        let store = Arc::new(SqliteShowStore::in_memory().unwrap());
        let repo = CatalogRepository::new(
            gateway.clone(),
            Some(store.clone()),
            Duration::from_secs(3600),
            PagingConfig::default(),
        );
        (gateway, store, SearchTvShows::new(Arc::new(repo)))
    }

    fn revision(mut show: ShowSummary, updated: i64) -> ShowSummary {
        show.updated = updated;
        show
    }

    #[tokio::test]
    async fn test_newer_remote_copy_wins() {
        let (gateway, store, usecase) = setup();
        store
            .upsert_shows(&[revision(fixtures::show(1, "Lost"), 100)])
            .unwrap();
        let mut remote = revision(fixtures::show(1, "Lost"), 200);
        remote.summary = "Updated synopsis".to_string();
        gateway.set_search_results(vec![(remote, 10.0)]).await;

        let results = usecase.execute("lost").await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].updated, 200);
        assert_eq!(results[0].summary, "Updated synopsis");
        assert_eq!(results[0].score, REMOTE_BANDS.exact);
    }

    #[tokio::test]
    async fn test_newer_local_copy_wins() {
        let (gateway, store, usecase) = setup();
        store
            .upsert_shows(&[revision(fixtures::show(1, "Lost"), 200)])
            .unwrap();
        gateway
            .set_search_results(vec![(revision(fixtures::show(1, "Lost"), 100), 10.0)])
            .await;

        let results = usecase.execute("lost").await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].score, LOCAL_BANDS.exact);
    }

    #[tokio::test]
    async fn test_remote_results_are_cached() {
        let (gateway, store, usecase) = setup();
        gateway
            .set_search_results(vec![(fixtures::show(8, "Lost Girl"), 3.0)])
            .await;

        usecase.execute("lost").await;

        assert!(store.get_show(8).unwrap().is_some());
        assert_eq!(store.show_page(8).unwrap(), None);
    }

    #[tokio::test]
    async fn test_remote_failure_keeps_local_results() {
        let (gateway, store, usecase) = setup();
        store.upsert_shows(&[fixtures::show(1, "Lost")]).unwrap();
        gateway
            .set_next_error(NetworkError::Io("offline".to_string()))
            .await;

        let results = usecase.execute("lost").await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, 1);
    }

    #[tokio::test]
    async fn test_results_sorted_by_score() {
        let usecase = SearchTvShows::new(Arc::new(FakeShowRepository::new(11)));

        let results = usecase.execute("drama").await;

        assert!(!results.is_empty());
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[tokio::test]
    async fn test_blank_query_is_empty() {
        let (gateway, _store, usecase) = setup();

        assert!(usecase.execute("").await.is_empty());
        assert!(gateway.search_requests().await.is_empty());
    }
}
