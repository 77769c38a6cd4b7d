//! Types for the page synchronizer.

use thiserror::Error;

use crate::model::ShowId;
use crate::remote::NetworkError;
use crate::store::StorageError;

/// First remote page of the catalog index.
pub const STARTING_PAGE_INDEX: u32 = 0;

/// Which end of the loaded window a load request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadType {
    /// Replace the collection, starting from the page around the anchor.
    Refresh,
    /// Load the page before the first loaded item.
    Prepend,
    /// Load the page after the last loaded item.
    Append,
}

impl std::fmt::Display for LoadType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadType::Refresh => write!(f, "refresh"),
            LoadType::Prepend => write!(f, "prepend"),
            LoadType::Append => write!(f, "append"),
        }
    }
}

/// Outcome of the pre-load cache check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitializeAction {
    /// Cache is expired or unreadable: refresh from the remote catalog first.
    LaunchInitialRefresh,
    /// Cache is fresh: serve from it without a remote call.
    SkipInitialRefresh,
}

/// Successful load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSuccess {
    /// No more data exists in the requested direction.
    pub end_of_pagination_reached: bool,
}

impl LoadSuccess {
    pub fn more_available() -> Self {
        Self {
            end_of_pagination_reached: false,
        }
    }

    pub fn end_reached() -> Self {
        Self {
            end_of_pagination_reached: true,
        }
    }
}

/// Failed load. Retry policy belongs to the caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("Failed to fetch shows: {0}")]
    Network(#[from] NetworkError),

    #[error("Failed to store shows: {0}")]
    Storage(#[from] StorageError),
}

/// Snapshot of what the paging consumer currently holds.
///
/// Only show ids matter to the synchronizer: it resolves page tokens through
/// the remote key recorded for the first, last or anchored item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PagingState {
    /// Ids of the loaded items, in display order.
    pub loaded: Vec<ShowId>,
    /// Position the consumer last accessed, if any.
    pub anchor_position: Option<usize>,
}

impl PagingState {
    pub fn new(loaded: Vec<ShowId>, anchor_position: Option<usize>) -> Self {
        Self {
            loaded,
            anchor_position,
        }
    }

    pub fn first_item(&self) -> Option<ShowId> {
        self.loaded.first().copied()
    }

    pub fn last_item(&self) -> Option<ShowId> {
        self.loaded.last().copied()
    }

    /// Item at the anchor, clamped to the loaded range. None without an anchor.
    pub fn closest_item_to_anchor(&self) -> Option<ShowId> {
        let position = self.anchor_position?;
        let last = self.loaded.len().checked_sub(1)?;
        self.loaded.get(position.min(last)).copied()
    }
}
