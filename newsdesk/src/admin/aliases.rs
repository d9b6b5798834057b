//! Alternate names for [`AdminApi`] methods.
//!
//! Each forwards to its `admin_*` counterpart unchanged.

use serde_json::Value;

use super::AdminApi;
use crate::error::Result;
use crate::models::{
    AnalysisFilter, BatchFilter, Credentials, NewsFilter, SiteCategoryInput, SiteFilter,
};

impl AdminApi {
    pub async fn set_token(&self, token: Option<&str>) -> Result<()> {
        self.set_admin_token(token).await
    }

    pub async fn get_users(&self) -> Result<Value> {
        self.admin_user_list().await
    }

    pub async fn create_user(&self, credentials: &Credentials) -> Result<Value> {
        self.admin_user_create(credentials).await
    }

    pub async fn update_user_password(&self, id: u64, password: &str) -> Result<Value> {
        self.admin_user_set_password(id, password).await
    }

    pub async fn delete_user(&self, id: u64) -> Result<Value> {
        self.admin_user_delete(id).await
    }

    pub async fn get_site_categories(&self) -> Result<Value> {
        self.admin_site_category_list().await
    }

    pub async fn create_site_category(&self, input: &SiteCategoryInput) -> Result<Value> {
        self.admin_site_category_create(input).await
    }

    pub async fn update_site_category(&self, id: u64, input: &SiteCategoryInput) -> Result<Value> {
        self.admin_site_category_update(id, input).await
    }

    pub async fn delete_site_category(&self, id: u64) -> Result<Value> {
        self.admin_site_category_delete(id).await
    }

    pub async fn get_sites(&self, filter: &SiteFilter) -> Result<Value> {
        self.admin_site_list(filter).await
    }

    pub async fn create_site(&self, payload: &Value) -> Result<Value> {
        self.admin_site_create(payload).await
    }

    pub async fn update_site(&self, id: u64, payload: &Value) -> Result<Value> {
        self.admin_site_update(id, payload).await
    }

    pub async fn delete_site(&self, id: u64) -> Result<Value> {
        self.admin_site_delete(id).await
    }

    pub async fn get_batches(&self, filter: &BatchFilter) -> Result<Value> {
        self.admin_batch_list(filter).await
    }

    pub async fn get_batch_news(&self, batch_id: u64) -> Result<Value> {
        self.admin_batch_news_list(batch_id).await
    }

    pub async fn delete_batch(&self, batch_id: u64) -> Result<Value> {
        self.admin_batch_delete(batch_id).await
    }

    pub async fn get_news(&self, filter: &NewsFilter) -> Result<Value> {
        self.admin_news_list(filter).await
    }

    pub async fn create_news(&self, payload: &Value) -> Result<Value> {
        self.admin_news_create(payload).await
    }

    pub async fn update_news(&self, id: u64, payload: &Value) -> Result<Value> {
        self.admin_news_update(id, payload).await
    }

    pub async fn delete_news(&self, id: u64) -> Result<Value> {
        self.admin_news_delete(id).await
    }

    pub async fn get_analysis(&self, filter: &AnalysisFilter) -> Result<Value> {
        self.admin_analysis_list(filter).await
    }

    pub async fn create_analysis(&self, payload: &Value) -> Result<Value> {
        self.admin_analysis_create(payload).await
    }

    pub async fn update_analysis(&self, id: u64, payload: &Value) -> Result<Value> {
        self.admin_analysis_update(id, payload).await
    }

    pub async fn delete_analysis(&self, id: u64) -> Result<Value> {
        self.admin_analysis_delete(id).await
    }
}
