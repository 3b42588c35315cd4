use std::time::Duration;

use async_trait::async_trait;
use feed_rs::parser;
use reqwest::Client;

use crate::error::{AppError, Result};

use super::document::FeedDocument;

/// Anything that can turn a feed URL into a normalized document.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FeedDocument>;
}

pub struct FeedFetcher {
    client: Client,
}

impl FeedFetcher {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()
            .map_err(|e| AppError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl FeedSource for FeedFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FeedDocument> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| AppError::upstream(url, e))?;

        if !response.status().is_success() {
            return Err(AppError::upstream(url, format!("HTTP {}", response.status())));
        }

        let bytes = response.bytes().await.map_err(|e| AppError::upstream(url, e))?;
        let feed = parser::parse(&bytes[..]).map_err(|e| AppError::upstream(url, e))?;

        tracing::debug!("Parsed {} entries from {}", feed.entries.len(), url);
        Ok(feed.into())
    }
}
