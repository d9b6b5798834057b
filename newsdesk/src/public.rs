use common::ApiConfig;

use crate::client::ApiClient;
use crate::error::Result;
use crate::models::ApiResponse;

/// Unauthenticated client used by the public news viewer.
///
/// Calls return the whole [`ApiResponse`] (status, headers, body) rather than
/// just the body.
#[derive(Clone)]
pub struct PublicApi {
    client: ApiClient,
}

impl PublicApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Ok(Self::new(ApiClient::from_config(config)?))
    }

    /// News items of the most recent batch.
    pub async fn fetch_latest_news(&self) -> Result<ApiResponse> {
        self.client.get("/news/latest").await
    }

    /// Latest analysis covering `days` days (the backend knows 3 and 7).
    pub async fn fetch_analysis(&self, days: u32) -> Result<ApiResponse> {
        self.client
            .get(&format!("/analysis/latest?days={}", days))
            .await
    }

    pub async fn fetch_site_categories(&self) -> Result<ApiResponse> {
        self.client.get("/sites/categories").await
    }
}
