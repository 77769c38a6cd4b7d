//! Search relevance scoring and local/remote result merging.

mod merge;
mod scoring;

pub use merge::merge_results;
pub use scoring::{matches_query, score_show, ScoreBands, LOCAL_BANDS, REMOTE_BANDS};
