//! Normalized in-memory view of a parsed feed.
//!
//! Everything the engine needs from an upstream feed lives here, independent
//! of the wire format. Sub-structures the store keeps opaque (images,
//! enclosures, extension blocks) derive serde so they can travel as blobs.

use chrono::{DateTime, Utc};
use feed_rs::model::{self, FeedType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default)]
pub struct FeedDocument {
    pub title: String,
    pub description: String,
    pub link: String,
    pub links: Vec<String>,
    pub feed_type: String,
    pub feed_version: Option<String>,
    pub language: Option<String>,
    pub copyright: Option<String>,
    pub generator: Option<String>,
    pub categories: Vec<String>,
    pub image: Option<Image>,
    pub extensions: FeedExtensions,
    pub updated: Option<DateTime<Utc>>,
    pub published: Option<DateTime<Utc>>,
    pub authors: Vec<PersonRef>,
    /// Upstream order is preserved.
    pub items: Vec<ItemDocument>,
}

#[derive(Debug, Clone, Default)]
pub struct ItemDocument {
    pub guid: String,
    pub title: String,
    /// Raw HTML.
    pub description: String,
    /// Raw HTML.
    pub content: String,
    pub link: String,
    pub links: Vec<String>,
    pub published: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
    pub categories: Vec<String>,
    pub enclosures: Vec<Enclosure>,
    pub image: Option<Image>,
    pub authors: Vec<PersonRef>,
    pub extensions: ItemExtensions,
}

/// An author reference as it appears upstream. A missing email is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRef {
    pub name: String,
    pub email: String,
}

impl PersonRef {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enclosure {
    pub url: String,
    pub mime_type: Option<String>,
    pub length: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedExtensions {
    pub source_id: String,
    pub ttl: Option<u32>,
    pub icon: Option<Image>,
    pub contributors: Vec<PersonRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemExtensions {
    pub media: Vec<MediaBlock>,
    pub source: Option<String>,
    pub rights: Option<String>,
    pub language: Option<String>,
    pub contributors: Vec<PersonRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaBlock {
    pub title: Option<String>,
    pub description: Option<String>,
    pub urls: Vec<String>,
    pub thumbnails: Vec<String>,
}

impl From<model::Feed> for FeedDocument {
    fn from(feed: model::Feed) -> Self {
        let (feed_type, feed_version) = type_and_version(&feed.feed_type);
        let image = feed.logo.as_ref().or(feed.icon.as_ref()).map(image_from);

        FeedDocument {
            title: text(feed.title),
            description: text(feed.description),
            link: canonical_link(&feed.links),
            links: feed.links.iter().map(|l| l.href.clone()).collect(),
            feed_type: feed_type.to_string(),
            feed_version: feed_version.map(str::to_string),
            language: feed.language,
            copyright: feed.rights.map(|t| t.content),
            generator: feed.generator.map(|g| match g.version {
                Some(version) => format!("{} {}", g.content, version),
                None => g.content,
            }),
            categories: feed.categories.into_iter().map(|c| c.term).collect(),
            image,
            extensions: FeedExtensions {
                source_id: feed.id,
                ttl: feed.ttl,
                icon: feed.icon.as_ref().map(image_from),
                contributors: feed.contributors.iter().map(person_from).collect(),
            },
            updated: feed.updated,
            published: feed.published,
            authors: feed.authors.iter().map(person_from).collect(),
            items: feed.entries.into_iter().map(ItemDocument::from).collect(),
        }
    }
}

impl From<model::Entry> for ItemDocument {
    fn from(entry: model::Entry) -> Self {
        let mut enclosures: Vec<Enclosure> = entry
            .links
            .iter()
            .filter(|l| l.rel.as_deref() == Some("enclosure"))
            .map(|l| Enclosure {
                url: l.href.clone(),
                mime_type: l.media_type.clone(),
                length: l.length,
            })
            .collect();
        for media in &entry.media {
            for content in &media.content {
                if let Some(url) = &content.url {
                    let url = url.to_string();
                    if enclosures.iter().all(|e| e.url != url) {
                        enclosures.push(Enclosure {
                            url,
                            mime_type: content.content_type.as_ref().map(|m| m.to_string()),
                            length: content.size,
                        });
                    }
                }
            }
        }

        let image = entry
            .media
            .iter()
            .flat_map(|m| m.thumbnails.iter())
            .map(|t| image_from(&t.image))
            .next()
            .or_else(|| {
                entry
                    .media
                    .iter()
                    .flat_map(|m| m.content.iter())
                    .find(|c| {
                        c.content_type
                            .as_ref()
                            .is_some_and(|m| m.to_string().starts_with("image/"))
                    })
                    .and_then(|c| c.url.as_ref())
                    .map(|url| Image {
                        url: url.to_string(),
                        title: None,
                    })
            });

        let media = entry
            .media
            .iter()
            .map(|m| MediaBlock {
                title: m.title.as_ref().map(|t| t.content.clone()),
                description: m.description.as_ref().map(|t| t.content.clone()),
                urls: m
                    .content
                    .iter()
                    .filter_map(|c| c.url.as_ref().map(|u| u.to_string()))
                    .collect(),
                thumbnails: m.thumbnails.iter().map(|t| t.image.uri.clone()).collect(),
            })
            .collect();

        ItemDocument {
            guid: entry.id,
            title: text(entry.title),
            description: text(entry.summary),
            content: entry.content.and_then(|c| c.body).unwrap_or_default(),
            link: canonical_link(&entry.links),
            links: entry.links.iter().map(|l| l.href.clone()).collect(),
            published: entry.published,
            updated: entry.updated,
            categories: entry.categories.into_iter().map(|c| c.term).collect(),
            enclosures,
            image,
            authors: entry.authors.iter().map(person_from).collect(),
            extensions: ItemExtensions {
                media,
                source: entry.source,
                rights: entry.rights.map(|t| t.content),
                language: entry.language,
                contributors: entry.contributors.iter().map(person_from).collect(),
            },
        }
    }
}

fn type_and_version(feed_type: &FeedType) -> (&'static str, Option<&'static str>) {
    match feed_type {
        FeedType::Atom => ("atom", Some("1.0")),
        FeedType::JSON => ("json", None),
        FeedType::RSS0 => ("rss", Some("0.9x")),
        FeedType::RSS1 => ("rss", Some("1.0")),
        FeedType::RSS2 => ("rss", Some("2.0")),
    }
}

fn text(value: Option<model::Text>) -> String {
    value.map(|t| t.content).unwrap_or_default()
}

fn canonical_link(links: &[model::Link]) -> String {
    links
        .iter()
        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .map(|l| l.href.clone())
        .unwrap_or_default()
}

fn person_from(person: &model::Person) -> PersonRef {
    PersonRef {
        name: person.name.clone(),
        email: person.email.clone().unwrap_or_default(),
    }
}

fn image_from(image: &model::Image) -> Image {
    Image {
        url: image.uri.clone(),
        title: image.title.clone(),
    }
}
