//! TVMaze API client.
//!
//! TVMaze needs no API key. The show index is paged in blocks of 250 ids;
//! asking for a page past the end answers 404, which is reported as an
//! empty page.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::wire::{CastResponse, SearchResponse, ShowResponse};
use super::{CatalogGateway, NetworkError};
use crate::model::{CastMember, ShowDetail, ShowId, ShowSummary};

/// Remote catalog configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Base URL (default: https://api.tvmaze.com).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.tvmaze.com".to_string()
}

fn default_timeout() -> u32 {
    30
}

/// TVMaze API client.
pub struct TvMazeClient {
    client: Client,
    base_url: String,
}

impl TvMazeClient {
    /// Create a new TVMaze client.
    pub fn new(config: RemoteConfig) -> Result<Self, NetworkError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, NetworkError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).query(query).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, NetworkError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NetworkError::Protocol {
                status: Some(status.as_u16()),
                message: body,
            });
        }

        response.json().await.map_err(|e| NetworkError::Protocol {
            status: Some(status.as_u16()),
            message: format!("Failed to parse response: {}", e),
        })
    }
}

#[async_trait]
impl CatalogGateway for TvMazeClient {
    async fn get_page(&self, page: u32) -> Result<Vec<ShowSummary>, NetworkError> {
        debug!("TVMaze get page: page={}", page);

        match self
            .fetch::<Vec<ShowResponse>>("/shows", &[("page", page.to_string())])
            .await
        {
            Ok(shows) => Ok(shows.into_iter().map(Into::into).collect()),
            Err(NetworkError::Protocol {
                status: Some(code), ..
            }) if code == StatusCode::NOT_FOUND.as_u16() => {
                debug!("TVMaze page {} is past the end of the index", page);
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    async fn get_show(&self, id: ShowId) -> Result<ShowDetail, NetworkError> {
        debug!("TVMaze get show: id={}", id);

        let show: ShowResponse = self.fetch(&format!("/shows/{}", id), &[]).await?;
        Ok(show.into())
    }

    async fn search(&self, query: &str) -> Result<Vec<(ShowSummary, f32)>, NetworkError> {
        debug!("TVMaze search: query='{}'", query);

        let results: Vec<SearchResponse> = self
            .fetch("/search/shows", &[("q", query.to_string())])
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn get_cast(&self, id: ShowId) -> Result<Vec<CastMember>, NetworkError> {
        debug!("TVMaze get cast: id={}", id);

        let cast: Vec<CastResponse> = self.fetch(&format!("/shows/{}/cast", id), &[]).await?;
        Ok(cast.into_iter().map(Into::into).collect())
    }
}
