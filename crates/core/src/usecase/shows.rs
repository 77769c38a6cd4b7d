use std::sync::Arc;

use crate::repository::ShowRepository;
use crate::sync::ShowPager;

/// Paged catalog listing.
pub struct GetTvShows {
    repository: Arc<dyn ShowRepository>,
}

impl GetTvShows {
    pub fn new(repository: Arc<dyn ShowRepository>) -> Self {
        Self { repository }
    }

    /// Open a new paging session. Call [`ShowPager::start`] to load.
    pub fn execute(&self) -> ShowPager {
        self.repository.pager()
    }
}
