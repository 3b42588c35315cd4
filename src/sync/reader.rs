use crate::db::PageCursor;
use crate::error::Result;
use crate::models::{FeedItem, Person};

use super::FeedService;

pub const PAGE_SIZE: usize = 10;

impl FeedService {
    /// One page of a feed's items, newest identifier first.
    ///
    /// With `after_item_id`, the page continues the listing after that item:
    /// only items whose identifier sorts below the cursor are returned, so
    /// feeding back the last id of each page walks the whole feed.
    pub async fn pull(&self, feed_id: &str, after_item_id: Option<&str>) -> Result<Vec<FeedItem>> {
        let cursor = match after_item_id.filter(|id| !id.is_empty()) {
            Some(id) => PageCursor::Before(id.to_string()),
            None => PageCursor::Start,
        };
        self.repository
            .get_items_page(feed_id, cursor, PAGE_SIZE)
            .await
    }

    /// Items stored after `since_item_id` (strictly greater identifiers),
    /// newest first, one page at most. Used by pollers that already hold the
    /// newest item they have seen.
    pub async fn pull_since(
        &self,
        feed_id: &str,
        since_item_id: Option<&str>,
    ) -> Result<Vec<FeedItem>> {
        let cursor = match since_item_id.filter(|id| !id.is_empty()) {
            Some(id) => PageCursor::After(id.to_string()),
            None => PageCursor::Start,
        };
        self.repository
            .get_items_page(feed_id, cursor, PAGE_SIZE)
            .await
    }

    pub async fn feed_authors(&self, feed_id: &str) -> Result<Vec<Person>> {
        self.repository.get_feed_authors(feed_id).await
    }

    pub async fn item_authors(&self, item_id: &str) -> Result<Vec<Person>> {
        self.repository.get_item_authors(item_id).await
    }
}
