//! Remote catalog gateway.
//!
//! Thin typed wrapper over the catalog's HTTP/JSON API. Everything above this
//! module works with domain records and [`NetworkError`] only.

mod tvmaze;
mod wire;

pub use tvmaze::{RemoteConfig, TvMazeClient};

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{CastMember, ShowDetail, ShowId, ShowSummary};

/// Errors that can occur when talking to the remote catalog.
///
/// Transport and protocol failures are kept apart so callers can pick
/// between retrying and surfacing the error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NetworkError {
    /// Connectivity or transport failure (DNS, connect, timeout).
    #[error("Network I/O failure: {0}")]
    Io(String),

    /// Non-2xx response or malformed body.
    #[error("Protocol failure{}: {message}", fmt_status(.status))]
    Protocol {
        status: Option<u16>,
        message: String,
    },
}

fn fmt_status(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default()
}

impl NetworkError {
    /// Whether this is a transport-level failure.
    pub fn is_io(&self) -> bool {
        matches!(self, NetworkError::Io(_))
    }

    /// HTTP status code, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            NetworkError::Protocol { status, .. } => *status,
            NetworkError::Io(_) => None,
        }
    }
}

impl From<reqwest::Error> for NetworkError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() || e.is_status() {
            NetworkError::Protocol {
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
            }
        } else {
            NetworkError::Io(e.to_string())
        }
    }
}

/// Capability the core needs from the remote catalog.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    /// Fetch one page of the full show index. An empty page means there is no more data.
    async fn get_page(&self, page: u32) -> Result<Vec<ShowSummary>, NetworkError>;

    /// Fetch a single show by ID.
    async fn get_show(&self, id: ShowId) -> Result<ShowDetail, NetworkError>;

    /// Free-text search. Returns each matching show with the catalog's own relevance score.
    async fn search(&self, query: &str) -> Result<Vec<(ShowSummary, f32)>, NetworkError>;

    /// Fetch the cast of a show.
    async fn get_cast(&self, id: ShowId) -> Result<Vec<CastMember>, NetworkError>;
}
