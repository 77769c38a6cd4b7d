//! TVMaze response bodies and their conversion into domain records.

use serde::Deserialize;

use crate::model::{CastMember, ShowDetail, ShowSummary};

#[derive(Debug, Deserialize)]
pub(super) struct ShowResponse {
    pub id: u32,
    pub name: String,
    #[serde(rename = "type")]
    pub show_type: Option<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub status: Option<String>,
    pub rating: Option<RatingResponse>,
    pub image: Option<ImageResponse>,
    pub summary: Option<String>,
    #[serde(default)]
    pub updated: i64,
}

#[derive(Debug, Deserialize)]
pub(super) struct RatingResponse {
    pub average: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ImageResponse {
    pub medium: Option<String>,
    pub original: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SearchResponse {
    #[serde(default)]
    pub score: f32,
    pub show: ShowResponse,
}

#[derive(Debug, Deserialize)]
pub(super) struct CastResponse {
    pub person: PersonResponse,
}

#[derive(Debug, Deserialize)]
pub(super) struct PersonResponse {
    pub id: u32,
    pub name: String,
    pub image: Option<ImageResponse>,
}

impl ShowResponse {
    fn rating(&self) -> Option<f32> {
        self.rating
            .as_ref()
            .and_then(|r| r.average)
            .map(|a| a as f32)
    }

    fn images(&self) -> (String, String) {
        match &self.image {
            Some(image) => (
                image.medium.clone().unwrap_or_default(),
                image.original.clone().unwrap_or_default(),
            ),
            None => (String::new(), String::new()),
        }
    }
}

impl From<ShowResponse> for ShowSummary {
    fn from(r: ShowResponse) -> Self {
        let rating = r.rating();
        let (image_url, large_image_url) = r.images();
        Self {
            id: r.id,
            name: r.name,
            summary: r.summary.unwrap_or_default(),
            show_type: r.show_type.unwrap_or_default(),
            language: r.language.unwrap_or_default(),
            genres: r.genres,
            status: r.status.unwrap_or_default(),
            rating,
            image_url,
            large_image_url,
            updated: r.updated,
            score: 0.0,
            is_in_watchlist: false,
        }
    }
}

impl From<ShowResponse> for ShowDetail {
    fn from(r: ShowResponse) -> Self {
        ShowSummary::from(r).into()
    }
}

impl From<SearchResponse> for (ShowSummary, f32) {
    fn from(r: SearchResponse) -> Self {
        (r.show.into(), r.score)
    }
}

impl From<CastResponse> for CastMember {
    fn from(c: CastResponse) -> Self {
        Self {
            id: c.person.id,
            name: c.person.name,
            small_image_url: c
                .person
                .image
                .and_then(|i| i.medium)
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHOW_JSON: &str = r#"{
        "id": 1,
        "url": "https://www.tvmaze.com/shows/1/under-the-dome",
        "name": "Under the Dome",
        "type": "Scripted",
        "language": "English",
        "genres": ["Drama", "Science-Fiction", "Thriller"],
        "status": "Ended",
        "runtime": 60,
        "rating": {"average": 6.5},
        "weight": 98,
        "image": {
            "medium": "https://static.tvmaze.com/uploads/images/medium_portrait/81/202627.jpg",
            "original": "https://static.tvmaze.com/uploads/images/original_untouched/81/202627.jpg"
        },
        "summary": "<p><b>Under the Dome</b> is the story of a small town...</p>",
        "updated": 1704794122,
        "_links": {"self": {"href": "https://api.tvmaze.com/shows/1"}}
    }"#;

    #[test]
    fn test_show_response_conversion() {
        let response: ShowResponse = serde_json::from_str(SHOW_JSON).unwrap();
        let show: ShowSummary = response.into();

        assert_eq!(show.id, 1);
        assert_eq!(show.name, "Under the Dome");
        assert_eq!(show.show_type, "Scripted");
        assert_eq!(show.genres.len(), 3);
        assert_eq!(show.rating, Some(6.5));
        assert!(show.image_url.contains("medium_portrait"));
        assert!(show.large_image_url.contains("original_untouched"));
        assert_eq!(show.updated, 1_704_794_122);
        assert_eq!(show.score, 0.0);
    }

    #[test]
    fn test_show_response_missing_optionals() {
        let json = r#"{"id": 7, "name": "Bare", "updated": 5, "rating": {"average": null}, "image": null}"#;
        let response: ShowResponse = serde_json::from_str(json).unwrap();
        let detail: ShowDetail = response.into();

        assert_eq!(detail.id, 7);
        assert!(detail.rating.is_none());
        assert!(detail.small_image_url.is_empty());
        assert!(detail.large_image_url.is_empty());
        assert!(detail.language.is_empty());
    }

    #[test]
    fn test_search_response_keeps_score() {
        let json = format!(r#"{{"score": 0.91, "show": {}}}"#, SHOW_JSON);
        let response: SearchResponse = serde_json::from_str(&json).unwrap();
        let (show, score) = response.into();

        assert_eq!(show.id, 1);
        assert!((score - 0.91).abs() < f32::EPSILON);
    }

    #[test]
    fn test_cast_response_conversion() {
        let json = r#"{
            "person": {"id": 9, "name": "Mike Vogel", "image": {"medium": "https://img/m.jpg", "original": "https://img/o.jpg"}},
            "character": {"id": 3, "name": "Dale Barbara"},
            "self": false,
            "voice": false
        }"#;
        let response: CastResponse = serde_json::from_str(json).unwrap();
        let member: CastMember = response.into();

        assert_eq!(member.id, 9);
        assert_eq!(member.name, "Mike Vogel");
        assert_eq!(member.small_image_url, "https://img/m.jpg");
    }
}
