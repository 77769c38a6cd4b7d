//! One operation per user intent, orchestrated over a [`ShowRepository`].
//!
//! [`ShowRepository`]: crate::repository::ShowRepository

mod details;
mod search;
mod shows;
mod watchlist;

pub use details::GetTvShowDetailsWithCast;
pub use search::SearchTvShows;
pub use shows::GetTvShows;
pub use watchlist::{AddToWatchlist, GetWatchlist, RemoveFromWatchlist};
