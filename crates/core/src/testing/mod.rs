//! Testing utilities, mock gateway and an in-memory fake repository.
//!
//! # Example
//!
//! ```rust,ignore
//! use tvmaniak_core::testing::{fixtures, FakeShowRepository, MockCatalogGateway};
//!
//! let gateway = MockCatalogGateway::new();
//! gateway.set_page(0, fixtures::shows(&[1, 2, 3])).await;
//!
//! // Deterministic fake for use-case tests
//! let repository = FakeShowRepository::new(42);
//! ```

mod fake_repository;
mod mock_gateway;

pub use fake_repository::{FailureRates, FakeShowRepository};
pub use mock_gateway::{MockCatalogGateway, RecordedGatewayCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::model::{CastMember, ShowDetail, ShowId, ShowSummary};

    /// Create a test show with reasonable defaults.
    pub fn show(id: ShowId, name: &str) -> ShowSummary {
        ShowSummary {
            id,
            name: name.to_string(),
            summary: format!("<p>{} is a show.</p>", name),
            show_type: "Scripted".to_string(),
            language: "English".to_string(),
            genres: vec!["Comedy".to_string()],
            status: "Running".to_string(),
            rating: Some(7.5),
            image_url: format!(
                "https://static.tvmaze.com/uploads/images/medium_portrait/{}.jpg",
                id
            ),
            large_image_url: format!(
                "https://static.tvmaze.com/uploads/images/original_untouched/{}.jpg",
                id
            ),
            updated: 1_700_000_000,
            score: 0.0,
            is_in_watchlist: false,
        }
    }

    /// Create one test show per id, named "Show {id}".
    pub fn shows(ids: &[ShowId]) -> Vec<ShowSummary> {
        ids.iter()
            .map(|id| show(*id, &format!("Show {}", id)))
            .collect()
    }

    /// Create a test show detail.
    pub fn detail(id: ShowId, name: &str) -> ShowDetail {
        ShowDetail::from(show(id, name))
    }

    /// Create a test cast member.
    pub fn cast_member(id: u32, name: &str) -> CastMember {
        CastMember {
            id,
            name: name.to_string(),
            small_image_url: format!(
                "https://static.tvmaze.com/uploads/images/medium_portrait/people/{}.jpg",
                id
            ),
        }
    }

    /// A small catalog modelled on the first TVMaze entries.
    pub fn sample_catalog() -> Vec<ShowSummary> {
        let mut dome = show(1, "Under the Dome");
        dome.summary = "<p><b>Under the Dome</b> is the story of a small town that is suddenly \
                        and inexplicably sealed off from the rest of the world by an enormous \
                        transparent dome.</p>"
            .to_string();
        dome.genres = vec![
            "Drama".to_string(),
            "Science-Fiction".to_string(),
            "Thriller".to_string(),
        ];
        dome.status = "Ended".to_string();
        dome.rating = Some(6.5);
        dome.updated = 1_704_794_122;

        let mut poi = show(2, "Person of Interest");
        poi.summary = "<p>You are being watched. The government has a secret system, a machine \
                       that spies on you every hour of every day.</p>"
            .to_string();
        poi.genres = vec![
            "Action".to_string(),
            "Crime".to_string(),
            "Science-Fiction".to_string(),
        ];
        poi.status = "Ended".to_string();
        poi.rating = Some(8.7);
        poi.updated = 1_743_150_150;

        let mut bitten = show(3, "Bitten");
        bitten.summary = "<p>Based on the critically acclaimed series of novels from Kelley \
                          Armstrong.</p>"
            .to_string();
        bitten.genres = vec![
            "Drama".to_string(),
            "Horror".to_string(),
            "Romance".to_string(),
        ];
        bitten.status = "Ended".to_string();
        bitten.rating = Some(7.4);
        bitten.updated = 1_751_862_963;

        vec![dome, poi, bitten]
    }
}
