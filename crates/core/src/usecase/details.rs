use std::sync::Arc;

use tracing::warn;

use crate::model::{ShowDetailsWithCast, ShowId};
use crate::repository::{CatalogError, ShowRepository};

/// Show details plus cast for the detail view.
pub struct GetTvShowDetailsWithCast {
    repository: Arc<dyn ShowRepository>,
}

impl GetTvShowDetailsWithCast {
    pub fn new(repository: Arc<dyn ShowRepository>) -> Self {
        Self { repository }
    }

    /// Fetch details and cast concurrently.
    ///
    /// A cast failure yields an empty cast; only a details failure (remote
    /// and cache both unavailable) fails the whole operation.
    pub async fn execute(&self, id: ShowId) -> Result<ShowDetailsWithCast, CatalogError> {
        let (details, cast) = tokio::join!(
            self.repository.show_details(id),
            self.repository.show_cast(id)
        );

        let details = details?;
        let cast = cast.unwrap_or_else(|e| {
            warn!("Cast of show {} unavailable: {}", id, e);
            Vec::new()
        });

        Ok(ShowDetailsWithCast { details, cast })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::NetworkError;
    use crate::repository::CatalogRepository;
    use crate::store::SqliteShowStore;
    use crate::sync::PagingConfig;
    use crate::testing::{fixtures, FakeShowRepository, MockCatalogGateway};
    use std::time::Duration;

    fn catalog(gateway: Arc<MockCatalogGateway>) -> Arc<dyn ShowRepository> {
        let store = Arc::new(SqliteShowStore::in_memory().unwrap());
        Arc::new(CatalogRepository::new(
            gateway,
            Some(store),
            Duration::from_secs(3600),
            PagingConfig::default(),
        ))
    }

    #[tokio::test]
    async fn test_details_with_cast() {
        let gateway = Arc::new(MockCatalogGateway::new());
        gateway.add_show(fixtures::detail(5, "Lost")).await;
        gateway
            .set_cast(
                5,
                vec![
                    fixtures::cast_member(1, "Evangeline Lilly"),
                    fixtures::cast_member(2, "Josh Holloway"),
                ],
            )
            .await;
        let usecase = GetTvShowDetailsWithCast::new(catalog(gateway));

        let result = usecase.execute(5).await.unwrap();

        assert_eq!(result.details.name, "Lost");
        assert_eq!(result.cast.len(), 2);
    }

    #[tokio::test]
    async fn test_cast_failure_degrades_to_empty() {
        let gateway = Arc::new(MockCatalogGateway::new());
        gateway.add_show(fixtures::detail(5, "Lost")).await;
        gateway
            .set_cast_error(Some(NetworkError::Io("reset".to_string())))
            .await;
        let usecase = GetTvShowDetailsWithCast::new(catalog(gateway));

        let result = usecase.execute(5).await.unwrap();

        assert_eq!(result.details.id, 5);
        assert!(result.cast.is_empty());
    }

    #[tokio::test]
    async fn test_details_failure_is_fatal() {
        let usecase = GetTvShowDetailsWithCast::new(Arc::new(FakeShowRepository::new(3)));

        let result = usecase.execute(404).await;

        assert!(matches!(
            result,
            Err(CatalogError::ShowUnavailable { id: 404, .. })
        ));
    }
}
