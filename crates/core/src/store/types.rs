//! Types for the local cache store.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ShowSummary;

/// Errors for store operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    /// No store instance or connection.
    #[error("Local store is not available")]
    Unavailable,

    /// A specific read or write failed.
    #[error("Storage operation failed: {0}")]
    OperationFailed(String),
}

/// One fetched remote page, ready to be written.
#[derive(Debug, Clone)]
pub struct PageBatch {
    /// Page number the shows were fetched from.
    pub page: u32,
    /// Shows on the page, in catalog order.
    pub shows: Vec<ShowSummary>,
    /// Page before this one (None for the first page).
    pub prev_key: Option<u32>,
    /// Page after this one (None when this page was empty).
    pub next_key: Option<u32>,
    /// Set for refresh loads: clear everything first, then mark the cache valid at this instant.
    pub refresh_at: Option<DateTime<Utc>>,
}

/// The "last full refresh" marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheValidity {
    pub last_refresh: Option<DateTime<Utc>>,
}

impl CacheValidity {
    /// Cache is expired when it was never refreshed or is older than `ttl`.
    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        match self.last_refresh {
            Some(at) => now - at > ttl,
            None => true,
        }
    }
}

/// Store statistics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreStats {
    /// All cached show rows.
    pub total_shows: u64,
    /// Rows belonging to the paged collection.
    pub paged_shows: u64,
    /// Remote key rows.
    pub remote_keys: u64,
    /// Watchlist entries.
    pub watchlist_entries: u64,
    /// Last full refresh.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_refresh: Option<DateTime<Utc>>,
}
