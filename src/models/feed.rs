use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::feed::{FeedExtensions, Image};

use super::Blob;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feed {
    pub id: String,
    pub title: String,
    pub description: String,
    pub link: String,
    /// Subscribe URL; unique across feeds.
    pub feed_link: String,
    pub links: Vec<String>,
    pub feed_type: String,
    pub feed_version: Option<String>,
    pub language: Option<String>,
    pub copyright: Option<String>,
    pub generator: Option<String>,
    pub categories: Vec<String>,
    pub image: Blob,
    pub extensions: Blob,
    pub updated: Option<DateTime<Utc>>,
    pub published: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Feed {
    pub fn image(&self) -> Result<Option<Image>> {
        self.image.decode()
    }

    pub fn extensions(&self) -> Result<FeedExtensions> {
        self.extensions.decode()
    }
}

#[derive(Debug, Clone)]
pub struct NewFeed {
    pub id: String,
    pub title: String,
    pub description: String,
    pub link: String,
    pub feed_link: String,
    pub links: Vec<String>,
    pub feed_type: String,
    pub feed_version: Option<String>,
    pub language: Option<String>,
    pub copyright: Option<String>,
    pub generator: Option<String>,
    pub categories: Vec<String>,
    pub image: Blob,
    pub extensions: Blob,
    pub updated: Option<DateTime<Utc>>,
    pub published: Option<DateTime<Utc>>,
}
