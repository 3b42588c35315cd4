use crate::error::Result;
use crate::feed::{FeedDocument, ItemDocument};
use crate::models::{Blob, NewFeed, NewFeedItem};

pub fn new_feed(id: String, feed_link: &str, document: &FeedDocument) -> Result<NewFeed> {
    Ok(NewFeed {
        id,
        title: document.title.clone(),
        description: document.description.clone(),
        link: document.link.clone(),
        feed_link: feed_link.to_string(),
        links: document.links.clone(),
        feed_type: document.feed_type.clone(),
        feed_version: document.feed_version.clone(),
        language: document.language.clone(),
        copyright: document.copyright.clone(),
        generator: document.generator.clone(),
        categories: document.categories.clone(),
        image: Blob::encode(&document.image)?,
        extensions: Blob::encode(&document.extensions)?,
        updated: document.updated,
        published: document.published,
    })
}

pub fn new_item(
    id: String,
    feed_id: &str,
    item: &ItemDocument,
    description_markdown: String,
    content_markdown: String,
) -> Result<NewFeedItem> {
    Ok(NewFeedItem {
        id,
        feed_id: feed_id.to_string(),
        guid: item.guid.clone(),
        title: item.title.clone(),
        description: item.description.clone(),
        description_markdown,
        content: item.content.clone(),
        content_markdown,
        link: item.link.clone(),
        links: item.links.clone(),
        published: item.published,
        updated: item.updated,
        categories: item.categories.clone(),
        enclosures: Blob::encode(&item.enclosures)?,
        image: Blob::encode(&item.image)?,
        extensions: Blob::encode(&item.extensions)?,
    })
}
