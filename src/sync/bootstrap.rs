use crate::db::PendingWrite;
use crate::error::{AppError, Result};
use crate::models::Feed;

use super::persons::PersonRegistry;
use super::refresh::select_new_items;
use super::{mapping, FeedService};

impl FeedService {
    /// First-time ingestion of a subscribe link.
    ///
    /// The feed row, its authors and its initial items are written in one
    /// transaction. A link that is already stored resolves to the stored feed.
    pub async fn bootstrap(&self, feed_link: &str) -> Result<Feed> {
        let _guard = self.locks.acquire(format!("link:{}", feed_link)).await;

        if let Some(existing) = self.repository.find_feed_by_link(feed_link).await? {
            tracing::debug!("Feed {} already stored as {}", feed_link, existing.id);
            return Ok(existing);
        }

        let document = self.fetch_document(feed_link).await?;
        let feed_id = self.repository.next_id()?;
        let new_feed = mapping::new_feed(feed_id.clone(), feed_link, &document)?;

        let mut persons = PersonRegistry::new(&self.repository, &feed_id);
        persons.resolve_all(&document.authors).await?;
        persons
            .resolve_all(document.items.iter().flat_map(|item| item.authors.iter()))
            .await?;

        let feed_authors = persons.link_ids(&document.authors);
        let items = select_new_items(&document.items, &Default::default());
        let item_writes = self.build_item_writes(&feed_id, &items, &persons).await?;

        let mut writes = vec![PendingWrite::InsertFeed(new_feed)];
        writes.extend(
            persons
                .into_new_persons()
                .into_iter()
                .map(PendingWrite::InsertPerson),
        );
        writes.extend(
            feed_authors
                .into_iter()
                .map(|person_id| PendingWrite::LinkFeedAuthor {
                    feed_id: feed_id.clone(),
                    person_id,
                }),
        );
        writes.extend(item_writes);
        self.repository.commit(writes).await?;

        tracing::info!(
            "Bootstrapped feed {} ({}) with {} items",
            feed_link,
            feed_id,
            items.len()
        );

        self.repository
            .get_feed(&feed_id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("feed {} vanished after commit", feed_id)))
    }
}
