//! Page synchronization between the remote catalog and the local cache.
//!
//! [`PageSynchronizer`] is the load state machine: given a load intent and
//! what the consumer currently holds, it resolves a remote page through the
//! stored remote keys, fetches it and applies it in one transaction.
//! [`ShowPager`] is the position-based consumer that drives it and serves
//! windows of the cached collection.

mod pager;
mod synchronizer;
mod types;

pub use pager::{PagingConfig, ShowPager};
pub use synchronizer::{PageSynchronizer, DEFAULT_CACHE_TTL_SECS};
pub use types::*;
