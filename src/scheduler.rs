use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio::time::MissedTickBehavior;

use crate::error::Result;
use crate::sync::FeedService;

/// Summary of one pass over every stored feed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepReport {
    pub feeds: usize,
    pub refreshed: usize,
    pub failed: usize,
    pub new_items: usize,
}

/// Periodic trigger for `FeedService::refresh`. Failures are logged and left
/// for the next tick.
pub struct Scheduler {
    service: Arc<FeedService>,
    interval: Duration,
    concurrency: usize,
}

impl Scheduler {
    pub fn new(service: Arc<FeedService>, interval: Duration, concurrency: usize) -> Self {
        Self {
            service,
            interval,
            concurrency: concurrency.max(1),
        }
    }

    /// Refresh every stored feed once, `concurrency` feeds at a time.
    pub async fn run_once(&self) -> Result<SweepReport> {
        let feed_ids = self.service.feed_ids().await?;
        let mut report = SweepReport {
            feeds: feed_ids.len(),
            ..Default::default()
        };

        let results: Vec<_> = stream::iter(feed_ids)
            .map(|feed_id| {
                let service = self.service.clone();
                async move {
                    let result = service.refresh(&feed_id).await;
                    (feed_id, result)
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        for (feed_id, result) in results {
            match result {
                Ok(outcome) => {
                    report.refreshed += 1;
                    report.new_items += outcome.inserted;
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!("Refresh of feed {} failed ({}): {}", feed_id, e.kind(), e);
                }
            }
        }

        Ok(report)
    }

    /// Sweep on every tick until Ctrl-C.
    pub async fn run(&self) -> Result<()> {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            "Refreshing feeds every {}s, {} at a time",
            self.interval.as_secs(),
            self.concurrency
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.run_once().await {
                        Ok(report) => tracing::info!(
                            "Sweep done: {} feeds, {} failed, {} new items",
                            report.feeds,
                            report.failed,
                            report.new_items
                        ),
                        Err(e) => tracing::warn!("Sweep failed: {}", e),
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Stopping scheduler");
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Repository;
    use crate::sync::SyncOptions;
    use crate::sync::testing::{self, StubConverter, StubSource};

    #[tokio::test]
    async fn one_failing_feed_does_not_stop_the_sweep() {
        let source = StubSource::new();
        let converter = StubConverter::new();
        let repository = Repository::open_in_memory().await.unwrap();
        let service = Arc::new(FeedService::new(
            repository.clone(),
            source.clone(),
            converter.clone(),
            SyncOptions::default(),
        ));

        source.publish("https://a.example.com/rss", testing::document("A", &[], vec![]));
        source.publish("https://b.example.com/rss", testing::document("B", &[], vec![]));
        service.bootstrap("https://a.example.com/rss").await.unwrap();
        service.bootstrap("https://b.example.com/rss").await.unwrap();
        // A stored feed whose upstream has disappeared.
        testing::insert_feed(&repository, "https://gone.example.com/rss").await;

        source.publish(
            "https://a.example.com/rss",
            testing::document("A", &[], vec![testing::item("a1", &[]), testing::item("a2", &[])]),
        );
        source.publish(
            "https://b.example.com/rss",
            testing::document("B", &[], vec![testing::item("b1", &[])]),
        );

        let scheduler = Scheduler::new(service.clone(), Duration::from_secs(60), 2);
        let report = scheduler.run_once().await.unwrap();
        assert_eq!(report.feeds, 3);
        assert_eq!(report.refreshed, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.new_items, 3);

        let again = scheduler.run_once().await.unwrap();
        assert_eq!(again.new_items, 0);
        assert_eq!(again.refreshed, 2);
    }

    #[tokio::test]
    async fn empty_store_is_a_quiet_sweep() {
        let source = StubSource::new();
        let converter = StubConverter::new();
        let service = Arc::new(testing::service(&source, &converter).await);
        let report = Scheduler::new(service, Duration::from_secs(60), 0)
            .run_once()
            .await
            .unwrap();
        assert_eq!(report.feeds, 0);
        assert_eq!(source.calls(), 0);
    }
}
