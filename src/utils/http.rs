// src/utils/http.rs

//! HTTP page fetching.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::ScraperConfig;

/// Fetches raw markup for an absolute URL.
///
/// No retry and no caching: a failed fetch propagates to the caller,
/// every call re-fetches.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// reqwest-backed fetcher used for real runs.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a configured HTTP fetcher.
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::network(url, e))?;
        let response = response
            .error_for_status()
            .map_err(|e| AppError::network(url, e))?;
        response.text().await.map_err(|e| AppError::network(url, e))
    }
}
