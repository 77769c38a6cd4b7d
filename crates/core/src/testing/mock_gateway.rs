//! Mock remote catalog for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::model::{CastMember, ShowDetail, ShowId, ShowSummary};
use crate::remote::{CatalogGateway, NetworkError};

/// A recorded gateway call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedGatewayCall {
    GetPage { page: u32 },
    GetShow { id: ShowId },
    Search { query: String },
    GetCast { id: ShowId },
}

/// Mock implementation of the CatalogGateway trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable pages, shows, search results and cast
/// - Track calls for assertions
/// - Simulate failures
///
/// Pages that were never configured are empty, which reads as the end of
/// the catalog. Unknown shows answer like the real API does: HTTP 404.
///
/// # Example
///
/// ```rust,ignore
/// use tvmaniak_core::testing::{MockCatalogGateway, fixtures};
///
/// let gateway = MockCatalogGateway::new();
/// gateway.set_page(0, fixtures::shows(&[1, 2, 3])).await;
///
/// let page = gateway.get_page(0).await?;
/// assert_eq!(page.len(), 3);
/// ```
#[derive(Debug)]
pub struct MockCatalogGateway {
    /// Index pages by page number.
    pages: Arc<RwLock<HashMap<u32, Vec<ShowSummary>>>>,
    /// Show details by ID.
    shows: Arc<RwLock<HashMap<ShowId, ShowDetail>>>,
    /// Results returned for any search query.
    search_results: Arc<RwLock<Vec<(ShowSummary, f32)>>>,
    /// Cast by show ID.
    cast: Arc<RwLock<HashMap<ShowId, Vec<CastMember>>>>,
    /// Recorded calls.
    calls: Arc<RwLock<Vec<RecordedGatewayCall>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<NetworkError>>>,
    /// If set, every cast request fails with this error.
    cast_error: Arc<RwLock<Option<NetworkError>>>,
}

impl Default for MockCatalogGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCatalogGateway {
    /// Create a new empty mock gateway.
    pub fn new() -> Self {
        Self {
            pages: Arc::new(RwLock::new(HashMap::new())),
            shows: Arc::new(RwLock::new(HashMap::new())),
            search_results: Arc::new(RwLock::new(Vec::new())),
            cast: Arc::new(RwLock::new(HashMap::new())),
            calls: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            cast_error: Arc::new(RwLock::new(None)),
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Set the shows returned for an index page.
    pub async fn set_page(&self, page: u32, shows: Vec<ShowSummary>) {
        self.pages.write().await.insert(page, shows);
    }

    /// Add a show served by `get_show`.
    pub async fn add_show(&self, show: ShowDetail) {
        self.shows.write().await.insert(show.id, show);
    }

    /// Set the results returned for every search query.
    pub async fn set_search_results(&self, results: Vec<(ShowSummary, f32)>) {
        *self.search_results.write().await = results;
    }

    /// Set the cast of a show.
    pub async fn set_cast(&self, id: ShowId, cast: Vec<CastMember>) {
        self.cast.write().await.insert(id, cast);
    }

    /// Make the next operation fail with the given error.
    pub async fn set_next_error(&self, error: NetworkError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make every cast request fail (or succeed again with `None`).
    pub async fn set_cast_error(&self, error: Option<NetworkError>) {
        *self.cast_error.write().await = error;
    }

    // =========================================================================
    // Assertions
    // =========================================================================

    /// All recorded calls, in order.
    pub async fn calls(&self) -> Vec<RecordedGatewayCall> {
        self.calls.read().await.clone()
    }

    /// Page numbers requested, in order.
    pub async fn page_requests(&self) -> Vec<u32> {
        self.calls
            .read()
            .await
            .iter()
            .filter_map(|c| match c {
                RecordedGatewayCall::GetPage { page } => Some(*page),
                _ => None,
            })
            .collect()
    }

    /// Show IDs requested through `get_show`, in order.
    pub async fn show_requests(&self) -> Vec<ShowId> {
        self.calls
            .read()
            .await
            .iter()
            .filter_map(|c| match c {
                RecordedGatewayCall::GetShow { id } => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// Search queries, in order.
    pub async fn search_requests(&self) -> Vec<String> {
        self.calls
            .read()
            .await
            .iter()
            .filter_map(|c| match c {
                RecordedGatewayCall::Search { query } => Some(query.clone()),
                _ => None,
            })
            .collect()
    }

    /// Clear recorded calls.
    pub async fn clear_calls(&self) {
        self.calls.write().await.clear();
    }

    async fn record(&self, call: RecordedGatewayCall) -> Result<(), NetworkError> {
        self.calls.write().await.push(call);
        match self.next_error.write().await.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CatalogGateway for MockCatalogGateway {
    async fn get_page(&self, page: u32) -> Result<Vec<ShowSummary>, NetworkError> {
        self.record(RecordedGatewayCall::GetPage { page }).await?;
        Ok(self
            .pages
            .read()
            .await
            .get(&page)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_show(&self, id: ShowId) -> Result<ShowDetail, NetworkError> {
        self.record(RecordedGatewayCall::GetShow { id }).await?;
        self.shows
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| NetworkError::Protocol {
                status: Some(404),
                message: format!("Show {} not found", id),
            })
    }

    async fn search(&self, query: &str) -> Result<Vec<(ShowSummary, f32)>, NetworkError> {
        self.record(RecordedGatewayCall::Search {
            query: query.to_string(),
        })
        .await?;
        Ok(self.search_results.read().await.clone())
    }

    async fn get_cast(&self, id: ShowId) -> Result<Vec<CastMember>, NetworkError> {
        self.record(RecordedGatewayCall::GetCast { id }).await?;
        if let Some(error) = self.cast_error.read().await.clone() {
            return Err(error);
        }
        Ok(self.cast.read().await.get(&id).cloned().unwrap_or_default())
    }
}
