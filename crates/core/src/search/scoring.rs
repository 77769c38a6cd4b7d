//! Relevance scoring.
//!
//! Each source scores with its own band set. Within a band set the ordering
//! exact > prefix > substring > genre > floor always holds; the numbers
//! themselves are tuning values.

use crate::model::ShowSummary;

/// Score per match kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBands {
    /// Name equals the query.
    pub exact: f32,
    /// Name starts with the query.
    pub prefix: f32,
    /// Name contains the query.
    pub contains: f32,
    /// A genre equals the query.
    pub genre: f32,
    /// Anything else (description match or catalog fuzziness).
    pub floor: f32,
}

impl ScoreBands {
    /// Whether the bands are strictly ordered from exact down to floor.
    pub fn is_ordered(&self) -> bool {
        self.exact > self.prefix
            && self.prefix > self.contains
            && self.contains > self.genre
            && self.genre > self.floor
    }
}

/// Bands for results from the local cache.
pub const LOCAL_BANDS: ScoreBands = ScoreBands {
    exact: 100.0,
    prefix: 90.0,
    contains: 80.0,
    genre: 70.0,
    floor: 50.0,
};

/// Bands for results from the remote catalog. Each band sits a few points below local.
pub const REMOTE_BANDS: ScoreBands = ScoreBands {
    exact: 95.0,
    prefix: 85.0,
    contains: 75.0,
    genre: 65.0,
    floor: 45.0,
};

/// Case-insensitive substring match over name, summary and genres.
pub fn matches_query(show: &ShowSummary, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return false;
    }

    show.name.to_lowercase().contains(&query)
        || show.summary.to_lowercase().contains(&query)
        || show
            .genres
            .iter()
            .any(|g| g.to_lowercase().contains(&query))
}

/// Score one show against a query.
pub fn score_show(show: &ShowSummary, query: &str, bands: &ScoreBands) -> f32 {
    let query = query.trim().to_lowercase();
    let name = show.name.to_lowercase();

    if query.is_empty() {
        bands.floor
    } else if name == query {
        bands.exact
    } else if name.starts_with(&query) {
        bands.prefix
    } else if name.contains(&query) {
        bands.contains
    } else if show.genres.iter().any(|g| g.to_lowercase() == query) {
        bands.genre
    } else {
        bands.floor
    }
}
