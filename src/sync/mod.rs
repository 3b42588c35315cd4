//! Feed synchronization engine.
//!
//! `FeedService` resolves feeds by link or keyword, bootstraps unknown feeds,
//! refreshes known feeds incrementally and serves paged item reads. Every
//! write goes through one `Repository::commit` per operation, so a failed
//! bootstrap or refresh never leaves partial state behind and can simply be
//! retried.

use std::sync::Arc;
use std::time::Duration;

use crate::db::Repository;
use crate::error::{AppError, Result};
use crate::feed::{FeedDocument, FeedSource};
use crate::services::ContentConverter;

mod bootstrap;
mod locks;
mod mapping;
mod persons;
mod reader;
mod refresh;
mod resolver;
#[cfg(test)]
pub(crate) mod testing;

pub use reader::PAGE_SIZE;
pub use refresh::RefreshOutcome;

use locks::KeyedLocks;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Ceiling for one upstream fetch, including parsing.
    pub fetch_timeout: Duration,
    pub case_sensitive_search: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            case_sensitive_search: true,
        }
    }
}

pub struct FeedService {
    repository: Repository,
    source: Arc<dyn FeedSource>,
    converter: Arc<dyn ContentConverter>,
    options: SyncOptions,
    locks: KeyedLocks,
}

impl FeedService {
    pub fn new(
        repository: Repository,
        source: Arc<dyn FeedSource>,
        converter: Arc<dyn ContentConverter>,
        options: SyncOptions,
    ) -> Self {
        Self {
            repository,
            source,
            converter,
            options,
            locks: KeyedLocks::new(),
        }
    }

    pub async fn feed_ids(&self) -> Result<Vec<String>> {
        self.repository.get_all_feed_ids().await
    }

    async fn fetch_document(&self, url: &str) -> Result<FeedDocument> {
        let timeout = self.options.fetch_timeout;
        match tokio::time::timeout(timeout, self.source.fetch(url, timeout)).await {
            Ok(document) => document,
            Err(_) => Err(AppError::upstream(
                url,
                format!("timed out after {}s", timeout.as_secs_f32()),
            )),
        }
    }

    /// Empty input converts to empty output without calling the converter.
    async fn to_markdown(&self, html: &str) -> Result<String> {
        if html.is_empty() {
            return Ok(String::new());
        }
        self.converter.to_markdown(html).await
    }
}
