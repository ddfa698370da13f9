// src/services/api.rs

//! Upstream job board client.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::Result;
use crate::models::UpstreamConfig;
use crate::models::upstream::{ConceptsResponse, ListingPage, RegionsResponse};
use crate::utils::endpoint;

/// Read access to the upstream job board.
///
/// Each call is a single request; callers decide how failures degrade.
#[async_trait]
pub trait JobBoardApi: Send + Sync {
    /// Fetch one page of listings (1-based page index).
    async fn fetch_page(&self, page_index: u32, page_size: u32) -> Result<ListingPage>;

    /// Fetch the concepts table carrying salary-code descriptions.
    async fn fetch_concepts(&self) -> Result<ConceptsResponse>;

    /// Fetch the flat region-code to region-name table.
    async fn fetch_regions(&self) -> Result<RegionsResponse>;
}

/// `JobBoardApi` over HTTP.
pub struct HttpJobBoard {
    client: Client,
    config: UpstreamConfig,
}

impl HttpJobBoard {
    pub fn new(client: Client, config: UpstreamConfig) -> Self {
        Self { client, config }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = endpoint(&self.config.base_url, path)?;
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl JobBoardApi for HttpJobBoard {
    async fn fetch_page(&self, page_index: u32, page_size: u32) -> Result<ListingPage> {
        let query = [
            ("filters", "{}".to_string()),
            ("pageIndex", page_index.to_string()),
            ("pageSize", page_size.to_string()),
        ];
        self.get_json(&self.config.listings_path, &query).await
    }

    async fn fetch_concepts(&self) -> Result<ConceptsResponse> {
        self.get_json(&self.config.concepts_path, &[]).await
    }

    async fn fetch_regions(&self) -> Result<RegionsResponse> {
        self.get_json(&self.config.regions_path, &[]).await
    }
}
