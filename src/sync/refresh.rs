use std::collections::HashSet;

use serde::Serialize;

use crate::db::PendingWrite;
use crate::error::{AppError, Result};
use crate::feed::ItemDocument;

use super::persons::PersonRegistry;
use super::{mapping, FeedService};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RefreshOutcome {
    pub inserted: usize,
    /// Upstream entries whose GUID was already stored (or repeated upstream).
    pub skipped: usize,
}

impl FeedService {
    /// Append upstream entries with unseen GUIDs to a stored feed.
    ///
    /// Stored entries are never updated. All new items, new authors and their
    /// links commit together, so running this twice without upstream changes
    /// is a no-op and any failure leaves the feed as it was.
    pub async fn refresh(&self, feed_id: &str) -> Result<RefreshOutcome> {
        let _guard = self.locks.acquire(format!("feed:{}", feed_id)).await;

        let feed = self
            .repository
            .get_feed(feed_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("feed {}", feed_id)))?;

        let document = self.fetch_document(&feed.feed_link).await?;

        let mut persons = PersonRegistry::new(&self.repository, feed_id);
        persons
            .resolve_all(document.items.iter().flat_map(|item| item.authors.iter()))
            .await?;

        let guids = document.items.iter().map(|item| item.guid.clone()).collect();
        let existing = self.repository.existing_guids(feed_id, guids).await?;
        let items = select_new_items(&document.items, &existing);
        let outcome = RefreshOutcome {
            inserted: items.len(),
            skipped: document.items.len() - items.len(),
        };

        let item_writes = self.build_item_writes(feed_id, &items, &persons).await?;
        let mut writes: Vec<PendingWrite> = persons
            .into_new_persons()
            .into_iter()
            .map(PendingWrite::InsertPerson)
            .collect();
        writes.extend(item_writes);
        self.repository.commit(writes).await?;

        if outcome.inserted > 0 {
            tracing::info!(
                "Refreshed feed {}: {} new, {} skipped",
                feed_id,
                outcome.inserted,
                outcome.skipped
            );
        } else {
            tracing::debug!("Refreshed feed {}: nothing new", feed_id);
        }
        Ok(outcome)
    }

    /// Convert and map each item, in order, together with its author links.
    /// Stops at the first conversion failure.
    pub(super) async fn build_item_writes(
        &self,
        feed_id: &str,
        items: &[&ItemDocument],
        persons: &PersonRegistry<'_>,
    ) -> Result<Vec<PendingWrite>> {
        let mut writes = Vec::new();
        for item in items {
            let description_markdown = self.to_markdown(&item.description).await.map_err(|e| {
                tracing::warn!("Converting description of {} failed: {}", item.guid, e);
                e
            })?;
            let content_markdown = self.to_markdown(&item.content).await.map_err(|e| {
                tracing::warn!("Converting content of {} failed: {}", item.guid, e);
                e
            })?;

            let item_id = self.repository.next_id()?;
            writes.push(PendingWrite::InsertItem(mapping::new_item(
                item_id.clone(),
                feed_id,
                item,
                description_markdown,
                content_markdown,
            )?));
            writes.extend(
                persons
                    .link_ids(&item.authors)
                    .into_iter()
                    .map(|person_id| PendingWrite::LinkItemAuthor {
                        item_id: item_id.clone(),
                        person_id,
                    }),
            );
        }
        Ok(writes)
    }
}

/// Items whose GUID is neither stored nor repeated earlier in the document.
pub(super) fn select_new_items<'d>(
    items: &'d [ItemDocument],
    existing: &HashSet<String>,
) -> Vec<&'d ItemDocument> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|item| !existing.contains(&item.guid) && seen.insert(item.guid.as_str()))
        .collect()
}
