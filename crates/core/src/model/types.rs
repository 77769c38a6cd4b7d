//! Show, cast and pagination records.

use serde::{Deserialize, Serialize};

/// Stable catalog identifier of a show.
pub type ShowId = u32;

/// A show as it appears in lists and search results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShowSummary {
    /// Catalog identifier (unique key).
    pub id: ShowId,
    /// Show name.
    pub name: String,
    /// Short description (may contain HTML markup from the catalog).
    #[serde(default)]
    pub summary: String,
    /// Show type (e.g., "Scripted", "Animation").
    #[serde(default, rename = "type")]
    pub show_type: String,
    /// Primary language.
    #[serde(default)]
    pub language: String,
    /// Genre names.
    #[serde(default)]
    pub genres: Vec<String>,
    /// Status (e.g., "Running", "Ended").
    #[serde(default)]
    pub status: String,
    /// Average rating (0-10).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    /// Medium-sized poster URL.
    #[serde(default)]
    pub image_url: String,
    /// Original-sized poster URL.
    #[serde(default)]
    pub large_image_url: String,
    /// Remote revision timestamp (epoch seconds), monotonic per show.
    pub updated: i64,
    /// Search relevance. Only meaningful within a single search.
    #[serde(default)]
    pub score: f32,
    /// Watchlist membership, recomputed from the watchlist at read time.
    #[serde(default)]
    pub is_in_watchlist: bool,
}

impl ShowSummary {
    /// Copy of this show with a different search score.
    pub fn with_score(mut self, score: f32) -> Self {
        self.score = score;
        self
    }

    /// Copy of this show annotated with watchlist membership.
    pub fn with_watchlist(mut self, is_in_watchlist: bool) -> Self {
        self.is_in_watchlist = is_in_watchlist;
        self
    }
}

/// Full show information for the detail view. Cast is fetched separately.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShowDetail {
    /// Catalog identifier.
    pub id: ShowId,
    /// Show name.
    pub name: String,
    /// Full description.
    #[serde(default)]
    pub summary: String,
    /// Show type.
    #[serde(default, rename = "type")]
    pub show_type: String,
    /// Primary language.
    #[serde(default)]
    pub language: String,
    /// Genre names.
    #[serde(default)]
    pub genres: Vec<String>,
    /// Status.
    #[serde(default)]
    pub status: String,
    /// Average rating (0-10).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    /// Medium-sized poster URL.
    #[serde(default)]
    pub small_image_url: String,
    /// Original-sized poster URL.
    #[serde(default)]
    pub large_image_url: String,
    /// Remote revision timestamp (epoch seconds).
    pub updated: i64,
    /// Watchlist membership at read time.
    #[serde(default)]
    pub is_in_watchlist: bool,
}

impl ShowDetail {
    /// Copy of this detail annotated with watchlist membership.
    pub fn with_watchlist(mut self, is_in_watchlist: bool) -> Self {
        self.is_in_watchlist = is_in_watchlist;
        self
    }
}

impl From<ShowSummary> for ShowDetail {
    fn from(s: ShowSummary) -> Self {
        Self {
            id: s.id,
            name: s.name,
            summary: s.summary,
            show_type: s.show_type,
            language: s.language,
            genres: s.genres,
            status: s.status,
            rating: s.rating,
            small_image_url: s.image_url,
            large_image_url: s.large_image_url,
            updated: s.updated,
            is_in_watchlist: s.is_in_watchlist,
        }
    }
}

impl From<ShowDetail> for ShowSummary {
    fn from(d: ShowDetail) -> Self {
        Self {
            id: d.id,
            name: d.name,
            summary: d.summary,
            show_type: d.show_type,
            language: d.language,
            genres: d.genres,
            status: d.status,
            rating: d.rating,
            image_url: d.small_image_url,
            large_image_url: d.large_image_url,
            updated: d.updated,
            score: 0.0,
            is_in_watchlist: d.is_in_watchlist,
        }
    }
}

/// A cast member shown on the detail view. Never cached.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CastMember {
    /// Person identifier.
    pub id: u32,
    /// Person name.
    pub name: String,
    /// Medium-sized portrait URL (empty when the catalog has none).
    #[serde(default)]
    pub small_image_url: String,
}

/// Detail view payload: the show plus its cast.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShowDetailsWithCast {
    pub details: ShowDetail,
    pub cast: Vec<CastMember>,
}

/// Pagination bookkeeping for one cached show.
///
/// Links the row to the remote pages before and after the page it was
/// fetched from, so paging can resume without deriving page numbers from
/// scroll position.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteKey {
    pub show_id: ShowId,
    pub prev_key: Option<u32>,
    pub next_key: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> ShowSummary {
        ShowSummary {
            id: 1,
            name: "Under the Dome".to_string(),
            summary: "A small town sealed off.".to_string(),
            show_type: "Scripted".to_string(),
            language: "English".to_string(),
            genres: vec!["Drama".to_string(), "Thriller".to_string()],
            status: "Ended".to_string(),
            rating: Some(6.5),
            image_url: "https://img/medium.jpg".to_string(),
            large_image_url: "https://img/original.jpg".to_string(),
            updated: 1_704_794_122,
            score: 42.0,
            is_in_watchlist: true,
        }
    }

    #[test]
    fn test_detail_from_summary_keeps_images() {
        let detail = ShowDetail::from(summary());
        assert_eq!(detail.small_image_url, "https://img/medium.jpg");
        assert_eq!(detail.large_image_url, "https://img/original.jpg");
        assert!(detail.is_in_watchlist);
    }

    #[test]
    fn test_summary_from_detail_resets_score() {
        let back = ShowSummary::from(ShowDetail::from(summary()));
        assert_eq!(back.score, 0.0);
        assert_eq!(back.image_url, "https://img/medium.jpg");
    }

    #[test]
    fn test_type_field_serialized_as_type() {
        let json = serde_json::to_value(summary()).unwrap();
        assert_eq!(json["type"], "Scripted");
        assert!(json.get("show_type").is_none());
    }
}
