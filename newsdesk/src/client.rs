//! HTTP client bound to the backend base URL.
//!
//! Every call goes through [`ApiClient::authorize`], which attaches
//! `Authorization: Bearer <token>` when a token store is configured and holds
//! a non-empty token.

use std::sync::Arc;
use std::time::Duration;

use common::{ApiConfig, TokenStore};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ApiError, Result};
use crate::models::{ApiResponse, Envelope};

#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    token_store: Option<Arc<dyn TokenStore>>,
}

impl ApiClient {
    /// Build a client for `base_url` (absolute http/https) with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let parsed = url::Url::parse(base_url).map_err(|e| ApiError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token_store: None,
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_seconds))
    }

    /// Read the bearer token from `store` before every request.
    pub fn with_token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.token_store = Some(store);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.send(Method::GET, path, None::<&()>).await
    }

    pub async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<ApiResponse> {
        self.send(Method::POST, path, Some(body)).await
    }

    /// POST without a request body.
    pub async fn post_empty(&self, path: &str) -> Result<ApiResponse> {
        self.send(Method::POST, path, None::<&()>).await
    }

    pub async fn patch<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<ApiResponse> {
        self.send(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.send(Method::DELETE, path, None::<&()>).await
    }

    /// Attach the bearer token if one is stored; otherwise leave the request untouched.
    async fn authorize(&self, builder: RequestBuilder) -> Result<RequestBuilder> {
        let Some(store) = &self.token_store else {
            return Ok(builder);
        };
        let token = store
            .get_token()
            .await
            .map_err(|e| ApiError::TokenStore(format!("{e:#}")))?;
        if token.is_empty() {
            Ok(builder)
        } else {
            Ok(builder.bearer_auth(token))
        }
    }

    async fn send<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&T>,
    ) -> Result<ApiResponse> {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.client.request(method.clone(), &url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let builder = self.authorize(builder).await?;

        let response = builder.send().await.map_err(|e| classify(e, path))?;
        let status = response.status();
        let headers = response.headers().clone();
        let text = response.text().await.map_err(|e| classify(e, path))?;
        debug!(%method, path, status = status.as_u16(), "backend request");

        if !status.is_success() {
            let message = error_message(&text, status);
            warn!(%method, path, status = status.as_u16(), %message, "backend returned an error");
            return Err(ApiError::Status { status, message });
        }

        Ok(ApiResponse {
            status,
            headers,
            data: parse_body(&text),
        })
    }
}

fn classify(err: reqwest::Error, path: &str) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout {
            path: path.to_string(),
        }
    } else {
        ApiError::Network(err)
    }
}

/// JSON when possible, `null` for an empty body, the raw text otherwise.
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

fn error_message(text: &str, status: StatusCode) -> String {
    if let Ok(Envelope { msg: Some(msg) }) = serde_json::from_str::<Envelope>(text) {
        if !msg.is_empty() {
            return msg;
        }
    }
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    status.canonical_reason().unwrap_or_default().to_string()
}
