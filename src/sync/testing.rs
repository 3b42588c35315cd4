//! In-process stand-ins for the upstream feed and the converter service.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::db::{PendingWrite, Repository};
use crate::error::{AppError, Result};
use crate::feed::{FeedDocument, FeedSource, ItemDocument, PersonRef};
use crate::services::ContentConverter;

use super::{mapping, FeedService, SyncOptions};

#[derive(Default)]
pub struct StubSource {
    documents: Mutex<HashMap<String, FeedDocument>>,
    delay: Mutex<Option<Duration>>,
    calls: AtomicUsize,
}

impl StubSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn publish(&self, url: &str, document: FeedDocument) {
        self.documents
            .lock()
            .unwrap()
            .insert(url.to_string(), document);
    }

    pub fn stall_for(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedSource for StubSource {
    async fn fetch(&self, url: &str, _timeout: Duration) -> Result<FeedDocument> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.documents
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::upstream(url, "HTTP 404"))
    }
}

/// Prefixes its input with `md:`. Can be told to fail from the n-th call on.
#[derive(Default)]
pub struct StubConverter {
    calls: AtomicUsize,
    fail_from: AtomicUsize,
}

impl StubConverter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_from_call(&self, n: usize) {
        self.fail_from.store(n, Ordering::SeqCst);
    }

    pub fn recover(&self) {
        self.fail_from.store(0, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentConverter for StubConverter {
    async fn to_markdown(&self, html: &str) -> Result<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let fail_from = self.fail_from.load(Ordering::SeqCst);
        if fail_from != 0 && call >= fail_from {
            return Err(AppError::Conversion("HTTP 502".to_string()));
        }
        Ok(format!("md:{}", html))
    }
}

pub async fn service(source: &Arc<StubSource>, converter: &Arc<StubConverter>) -> FeedService {
    let repository = Repository::open_in_memory().await.unwrap();
    FeedService::new(
        repository,
        source.clone(),
        converter.clone(),
        SyncOptions::default(),
    )
}

pub fn item(guid: &str, authors: &[(&str, &str)]) -> ItemDocument {
    ItemDocument {
        guid: guid.to_string(),
        title: format!("Title {}", guid),
        description: format!("<p>about {}</p>", guid),
        content: format!("<article>{}</article>", guid),
        link: format!("https://example.com/{}", guid),
        links: vec![format!("https://example.com/{}", guid)],
        authors: authors
            .iter()
            .map(|(name, email)| PersonRef::new(*name, *email))
            .collect(),
        ..Default::default()
    }
}

pub fn document(title: &str, authors: &[(&str, &str)], items: Vec<ItemDocument>) -> FeedDocument {
    FeedDocument {
        title: title.to_string(),
        description: format!("{} description", title),
        link: "https://example.com/".to_string(),
        links: vec!["https://example.com/".to_string()],
        feed_type: "rss".to_string(),
        feed_version: Some("2.0".to_string()),
        authors: authors
            .iter()
            .map(|(name, email)| PersonRef::new(*name, *email))
            .collect(),
        items,
        ..Default::default()
    }
}

/// Insert a bare feed row directly, bypassing the engine.
pub async fn insert_feed(repository: &Repository, feed_link: &str) -> String {
    let id = repository.next_id().unwrap();
    let feed = mapping::new_feed(id.clone(), feed_link, &document("Seed", &[], vec![])).unwrap();
    repository
        .commit(vec![PendingWrite::InsertFeed(feed)])
        .await
        .unwrap();
    id
}
