use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::config::{Config, ConverterKind};
use crate::db::Repository;
use crate::error::Result;
use crate::feed::{parse_opml_file, FeedFetcher, FeedSource};
use crate::models::{Feed, FeedItem, Person};
use crate::scheduler::{Scheduler, SweepReport};
use crate::services::{ContentConverter, LocalConverter, RemoteConverter};
use crate::sync::{FeedService, RefreshOutcome};

#[derive(Debug, Default, Serialize)]
pub struct ImportReport {
    pub listed: usize,
    pub resolved: usize,
    pub failed: usize,
}

/// Wires configuration, storage and upstream clients into one `FeedService`.
pub struct App {
    service: Arc<FeedService>,
    refresh_interval: Duration,
    refresh_concurrency: usize,
}

impl App {
    pub async fn new(config: &Config) -> Result<Self> {
        let repository = Repository::new(&config.db_path).await?;
        let source: Arc<dyn FeedSource> = Arc::new(FeedFetcher::new(&config.user_agent)?);
        let converter: Arc<dyn ContentConverter> = match config.converter {
            ConverterKind::Remote => Arc::new(RemoteConverter::new(
                &config.converter_url,
                Duration::from_secs(config.converter_timeout_secs),
            )?),
            ConverterKind::Local => Arc::new(LocalConverter::new()),
        };

        let service = FeedService::new(repository, source, converter, config.sync_options());
        Ok(Self::with_service(
            Arc::new(service),
            config.refresh_interval(),
            config.refresh_concurrency,
        ))
    }

    pub fn with_service(
        service: Arc<FeedService>,
        refresh_interval: Duration,
        refresh_concurrency: usize,
    ) -> Self {
        Self {
            service,
            refresh_interval,
            refresh_concurrency,
        }
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Feed>> {
        self.service.resolve_feeds(query).await
    }

    pub async fn refresh(&self, feed_id: &str) -> Result<RefreshOutcome> {
        self.service.refresh(feed_id).await
    }

    pub async fn refresh_all(&self) -> Result<SweepReport> {
        self.scheduler().run_once().await
    }

    pub async fn pull(&self, feed_id: &str, after: Option<&str>) -> Result<Vec<FeedItem>> {
        self.service.pull(feed_id, after).await
    }

    pub async fn pull_since(&self, feed_id: &str, since: Option<&str>) -> Result<Vec<FeedItem>> {
        self.service.pull_since(feed_id, since).await
    }

    pub async fn feed_authors(&self, feed_id: &str) -> Result<Vec<Person>> {
        self.service.feed_authors(feed_id).await
    }

    pub async fn item_authors(&self, item_id: &str) -> Result<Vec<Person>> {
        self.service.item_authors(item_id).await
    }

    /// Subscribe to every feed listed in an OPML file. Feeds already stored
    /// are matched by link; failures are logged and counted.
    pub async fn import_opml(&self, path: &Path) -> Result<ImportReport> {
        let urls = parse_opml_file(path)?;
        let mut report = ImportReport {
            listed: urls.len(),
            ..Default::default()
        };

        for url in &urls {
            match self.service.resolve_feeds(url).await {
                Ok(_) => report.resolved += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!("Could not import {}: {}", url, e);
                }
            }
        }

        Ok(report)
    }

    pub async fn watch(&self) -> Result<()> {
        self.scheduler().run().await
    }

    fn scheduler(&self) -> Scheduler {
        Scheduler::new(
            self.service.clone(),
            self.refresh_interval,
            self.refresh_concurrency,
        )
    }
}
