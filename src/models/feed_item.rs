use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::feed::{Enclosure, Image, ItemExtensions};

use super::Blob;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedItem {
    pub id: String,
    pub feed_id: String,
    pub guid: String,
    pub title: String,
    pub description: String,
    pub description_markdown: String,
    pub content: String,
    pub content_markdown: String,
    pub link: String,
    pub links: Vec<String>,
    pub published: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
    pub categories: Vec<String>,
    pub enclosures: Blob,
    pub image: Blob,
    pub extensions: Blob,
    pub created_at: DateTime<Utc>,
}

impl FeedItem {
    pub fn enclosures(&self) -> Result<Vec<Enclosure>> {
        self.enclosures.decode()
    }

    pub fn image(&self) -> Result<Option<Image>> {
        self.image.decode()
    }

    pub fn extensions(&self) -> Result<ItemExtensions> {
        self.extensions.decode()
    }
}

#[derive(Debug, Clone)]
pub struct NewFeedItem {
    pub id: String,
    pub feed_id: String,
    pub guid: String,
    pub title: String,
    pub description: String,
    pub description_markdown: String,
    pub content: String,
    pub content_markdown: String,
    pub link: String,
    pub links: Vec<String>,
    pub published: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
    pub categories: Vec<String>,
    pub enclosures: Blob,
    pub image: Blob,
    pub extensions: Blob,
}
