//! Admin dashboard client.
//!
//! One method per backend operation under `/admin`. Each issues exactly one
//! request and returns the parsed response body; failures are returned as-is.
//! Older call sites use a second set of names, kept in [`aliases`].

use std::sync::Arc;

use common::{ApiConfig, TokenStore};
use serde_json::{json, Value};

use crate::client::ApiClient;
use crate::error::{ApiError, Result};
use crate::models::{
    AnalysisFilter, BatchFilter, Credentials, NewsFilter, SetupRequest, SiteCategoryInput,
    SiteFilter,
};
use crate::query::QueryString;

pub mod aliases;

#[derive(Clone)]
pub struct AdminApi {
    client: ApiClient,
    store: Arc<dyn TokenStore>,
}

impl AdminApi {
    /// Wrap `client`, attaching the token held by `store` to every request.
    pub fn new(client: ApiClient, store: Arc<dyn TokenStore>) -> Self {
        Self {
            client: client.with_token_store(store.clone()),
            store,
        }
    }

    pub fn from_config(config: &ApiConfig, store: Arc<dyn TokenStore>) -> Result<Self> {
        Ok(Self::new(ApiClient::from_config(config)?, store))
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    // Token persistence

    pub async fn get_admin_token(&self) -> Result<String> {
        self.store.get_token().await.map_err(store_error)
    }

    /// Persist `token`; `None` or an empty token clears it.
    pub async fn set_admin_token(&self, token: Option<&str>) -> Result<()> {
        self.store.set_token(token).await.map_err(store_error)
    }

    pub async fn clear_admin_token(&self) -> Result<()> {
        self.store.clear_token().await.map_err(store_error)
    }

    // Session

    pub async fn admin_setup(&self, request: &SetupRequest) -> Result<Value> {
        Ok(self.client.post("/admin/setup", request).await?.data)
    }

    pub async fn admin_login(&self, credentials: &Credentials) -> Result<Value> {
        Ok(self.client.post("/admin/login", credentials).await?.data)
    }

    pub async fn admin_logout(&self) -> Result<Value> {
        Ok(self.client.post_empty("/admin/logout").await?.data)
    }

    /// Ask the backend to run a news/analysis update now.
    pub async fn admin_trigger_update(&self) -> Result<Value> {
        Ok(self.client.post_empty("/admin/trigger-update").await?.data)
    }

    // Users

    pub async fn admin_user_list(&self) -> Result<Value> {
        Ok(self.client.get("/admin/users").await?.data)
    }

    pub async fn admin_user_create(&self, credentials: &Credentials) -> Result<Value> {
        Ok(self.client.post("/admin/users", credentials).await?.data)
    }

    pub async fn admin_user_set_password(&self, id: u64, password: &str) -> Result<Value> {
        let body = json!({ "password": password });
        Ok(self
            .client
            .patch(&format!("/admin/users/{}/password", id), &body)
            .await?
            .data)
    }

    pub async fn admin_user_delete(&self, id: u64) -> Result<Value> {
        Ok(self.client.delete(&format!("/admin/users/{}", id)).await?.data)
    }

    // Site categories

    pub async fn admin_site_category_list(&self) -> Result<Value> {
        Ok(self.client.get("/admin/site-categories").await?.data)
    }

    pub async fn admin_site_category_create(&self, input: &SiteCategoryInput) -> Result<Value> {
        Ok(self.client.post("/admin/site-categories", input).await?.data)
    }

    pub async fn admin_site_category_update(
        &self,
        id: u64,
        input: &SiteCategoryInput,
    ) -> Result<Value> {
        Ok(self
            .client
            .patch(&format!("/admin/site-categories/{}", id), input)
            .await?
            .data)
    }

    pub async fn admin_site_category_delete(&self, id: u64) -> Result<Value> {
        Ok(self
            .client
            .delete(&format!("/admin/site-categories/{}", id))
            .await?
            .data)
    }

    // Sites

    pub async fn admin_site_list(&self, filter: &SiteFilter) -> Result<Value> {
        let path = QueryString::new()
            .id("categoryId", filter.category_id)
            .apply("/admin/sites");
        Ok(self.client.get(&path).await?.data)
    }

    pub async fn admin_site_create(&self, payload: &Value) -> Result<Value> {
        Ok(self.client.post("/admin/sites", payload).await?.data)
    }

    pub async fn admin_site_update(&self, id: u64, payload: &Value) -> Result<Value> {
        Ok(self
            .client
            .patch(&format!("/admin/sites/{}", id), payload)
            .await?
            .data)
    }

    pub async fn admin_site_delete(&self, id: u64) -> Result<Value> {
        Ok(self.client.delete(&format!("/admin/sites/{}", id)).await?.data)
    }

    // Batches

    pub async fn admin_batch_list(&self, filter: &BatchFilter) -> Result<Value> {
        let path = QueryString::new()
            .text("type", filter.batch_type.as_deref())
            .text("createdAtStart", filter.created_at_start.as_deref())
            .text("createdAtEnd", filter.created_at_end.as_deref())
            .apply("/admin/batches");
        Ok(self.client.get(&path).await?.data)
    }

    pub async fn admin_batch_news_list(&self, batch_id: u64) -> Result<Value> {
        Ok(self
            .client
            .get(&format!("/admin/batches/{}/news", batch_id))
            .await?
            .data)
    }

    pub async fn admin_batch_delete(&self, batch_id: u64) -> Result<Value> {
        Ok(self
            .client
            .delete(&format!("/admin/batches/{}", batch_id))
            .await?
            .data)
    }

    // News

    pub async fn admin_news_list(&self, filter: &NewsFilter) -> Result<Value> {
        let path = QueryString::new()
            .id("batchId", filter.batch_id)
            .text("keyword", filter.keyword.as_deref())
            .text("createdAtStart", filter.created_at_start.as_deref())
            .text("createdAtEnd", filter.created_at_end.as_deref())
            .apply("/admin/news");
        Ok(self.client.get(&path).await?.data)
    }

    pub async fn admin_news_create(&self, payload: &Value) -> Result<Value> {
        Ok(self.client.post("/admin/news", payload).await?.data)
    }

    pub async fn admin_news_update(&self, id: u64, payload: &Value) -> Result<Value> {
        Ok(self
            .client
            .patch(&format!("/admin/news/{}", id), payload)
            .await?
            .data)
    }

    pub async fn admin_news_delete(&self, id: u64) -> Result<Value> {
        Ok(self.client.delete(&format!("/admin/news/{}", id)).await?.data)
    }

    // Analysis

    pub async fn admin_analysis_list(&self, filter: &AnalysisFilter) -> Result<Value> {
        let path = QueryString::new()
            .id("batchId", filter.batch_id)
            .text("type", filter.analysis_type.as_deref())
            .text("createdAtStart", filter.created_at_start.as_deref())
            .text("createdAtEnd", filter.created_at_end.as_deref())
            .apply("/admin/analysis");
        Ok(self.client.get(&path).await?.data)
    }

    pub async fn admin_analysis_create(&self, payload: &Value) -> Result<Value> {
        Ok(self.client.post("/admin/analysis", payload).await?.data)
    }

    pub async fn admin_analysis_update(&self, id: u64, payload: &Value) -> Result<Value> {
        Ok(self
            .client
            .patch(&format!("/admin/analysis/{}", id), payload)
            .await?
            .data)
    }

    pub async fn admin_analysis_delete(&self, id: u64) -> Result<Value> {
        Ok(self
            .client
            .delete(&format!("/admin/analysis/{}", id))
            .await?
            .data)
    }
}

fn store_error(err: anyhow::Error) -> ApiError {
    ApiError::TokenStore(format!("{err:#}"))
}
