use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row, Transaction};
use tokio_rusqlite::Connection;
use ulid::Generator;

use crate::error::{AppError, Result};
use crate::models::{Blob, Feed, FeedItem, NewFeed, NewFeedItem, Person, PersonKey};

use super::schema::SCHEMA;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const FEED_COLUMNS: &str = "id, title, description, link, feed_link, links, feed_type, feed_version, \
     language, copyright, generator, categories, image, extensions, updated, published, created_at";

const ITEM_COLUMNS: &str = "id, feed_id, guid, title, description, description_markdown, content, \
     content_markdown, link, links, published, updated, categories, enclosures, image, extensions, \
     created_at";

/// One row-level write inside an atomic batch. Applied in order.
#[derive(Debug, Clone)]
pub enum PendingWrite {
    InsertFeed(NewFeed),
    InsertPerson(Person),
    LinkFeedAuthor { feed_id: String, person_id: String },
    InsertItem(NewFeedItem),
    LinkItemAuthor { item_id: String, person_id: String },
}

/// Position within a feed's item listing (newest identifier first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCursor {
    Start,
    /// Items listed after the given id, i.e. with a smaller identifier.
    Before(String),
    /// Items with a strictly greater identifier than the given id.
    After(String),
}

#[derive(Clone)]
pub struct Repository {
    conn: Connection,
    ids: Arc<Mutex<Generator>>,
}

impl Repository {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;
        Self::init(conn).await
    }

    pub async fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().await?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self> {
        conn.call(|conn| {
            conn.busy_timeout(BUSY_TIMEOUT)?;
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self {
            conn,
            ids: Arc::new(Mutex::new(Generator::new())),
        })
    }

    /// Allocate a new row identifier. Identifiers sort in allocation order.
    pub fn next_id(&self) -> Result<String> {
        let mut generator = self.ids.lock().unwrap_or_else(|e| e.into_inner());
        generator
            .generate()
            .map(|id| id.to_string())
            .map_err(|e| AppError::Internal(format!("identifier space exhausted: {}", e)))
    }

    /// Apply every write in one transaction. Either all rows become visible or
    /// none do.
    pub async fn commit(&self, writes: Vec<PendingWrite>) -> Result<()> {
        if writes.is_empty() {
            return Ok(());
        }

        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                for write in &writes {
                    apply_write(&tx, write)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    // Feed operations

    pub async fn get_feed(&self, id: &str) -> Result<Option<Feed>> {
        let id = id.to_string();
        let feed = self
            .conn
            .call(move |conn| {
                let mut stmt =
                    conn.prepare(&format!("SELECT {} FROM feeds WHERE id = ?1", FEED_COLUMNS))?;
                let feed = stmt.query_row(params![id], feed_from_row).optional()?;
                Ok(feed)
            })
            .await?;
        Ok(feed)
    }

    pub async fn find_feed_by_link(&self, feed_link: &str) -> Result<Option<Feed>> {
        let feed_link = feed_link.to_string();
        let feed = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM feeds WHERE feed_link = ?1",
                    FEED_COLUMNS
                ))?;
                let feed = stmt.query_row(params![feed_link], feed_from_row).optional()?;
                Ok(feed)
            })
            .await?;
        Ok(feed)
    }

    /// Feeds whose title contains `keyword`. The case-insensitive variant
    /// folds ASCII only, like SQLite's `lower()`.
    pub async fn search_feeds_by_title(
        &self,
        keyword: &str,
        case_sensitive: bool,
    ) -> Result<Vec<Feed>> {
        let keyword = keyword.to_string();
        let feeds = self
            .conn
            .call(move |conn| {
                let filter = if case_sensitive {
                    "instr(title, ?1) > 0"
                } else {
                    "instr(lower(title), lower(?1)) > 0"
                };
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM feeds WHERE {} ORDER BY title, id",
                    FEED_COLUMNS, filter
                ))?;
                let feeds = stmt
                    .query_map(params![keyword], feed_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(feeds)
            })
            .await?;
        Ok(feeds)
    }

    pub async fn get_all_feed_ids(&self) -> Result<Vec<String>> {
        let ids = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare("SELECT id FROM feeds ORDER BY id")?;
                let ids = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<std::result::Result<Vec<String>, _>>()?;
                Ok(ids)
            })
            .await?;
        Ok(ids)
    }

    // Person operations

    pub async fn find_person(&self, feed_id: &str, key: &PersonKey) -> Result<Option<Person>> {
        let feed_id = feed_id.to_string();
        let key = key.clone();
        let person = self
            .conn
            .call(move |conn| {
                let person = conn
                    .query_row(
                        "SELECT id, feed_id, name, email FROM feed_persons
                         WHERE feed_id = ?1 AND name = ?2 AND email = ?3",
                        params![feed_id, key.name, key.email],
                        person_from_row,
                    )
                    .optional()?;
                Ok(person)
            })
            .await?;
        Ok(person)
    }

    pub async fn get_feed_authors(&self, feed_id: &str) -> Result<Vec<Person>> {
        let feed_id = feed_id.to_string();
        let persons = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT p.id, p.feed_id, p.name, p.email
                     FROM feed_authors fa
                     JOIN feed_persons p ON p.id = fa.person_id
                     WHERE fa.feed_id = ?1
                     ORDER BY p.id",
                )?;
                let persons = stmt
                    .query_map(params![feed_id], person_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(persons)
            })
            .await?;
        Ok(persons)
    }

    pub async fn get_item_authors(&self, item_id: &str) -> Result<Vec<Person>> {
        let item_id = item_id.to_string();
        let persons = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT p.id, p.feed_id, p.name, p.email
                     FROM feed_item_authors ia
                     JOIN feed_persons p ON p.id = ia.person_id
                     WHERE ia.item_id = ?1
                     ORDER BY p.id",
                )?;
                let persons = stmt
                    .query_map(params![item_id], person_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(persons)
            })
            .await?;
        Ok(persons)
    }

    // Item operations

    /// The subset of `guids` already stored for this feed.
    pub async fn existing_guids(&self, feed_id: &str, guids: Vec<String>) -> Result<HashSet<String>> {
        let feed_id = feed_id.to_string();
        let existing = self
            .conn
            .call(move |conn| {
                let mut stmt =
                    conn.prepare("SELECT 1 FROM feed_items WHERE feed_id = ?1 AND guid = ?2")?;
                let mut existing = HashSet::new();
                for guid in guids {
                    if stmt.exists(params![feed_id, guid])? {
                        existing.insert(guid);
                    }
                }
                Ok(existing)
            })
            .await?;
        Ok(existing)
    }

    pub async fn get_items_page(
        &self,
        feed_id: &str,
        cursor: PageCursor,
        limit: usize,
    ) -> Result<Vec<FeedItem>> {
        let feed_id = feed_id.to_string();
        let limit = limit as i64;
        let items = self
            .conn
            .call(move |conn| {
                let (filter, cursor_id) = match cursor {
                    PageCursor::Start => ("", None),
                    PageCursor::Before(id) => ("AND id < ?3", Some(id)),
                    PageCursor::After(id) => ("AND id > ?3", Some(id)),
                };
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM feed_items WHERE feed_id = ?1 {} ORDER BY id DESC LIMIT ?2",
                    ITEM_COLUMNS, filter
                ))?;
                let rows = match cursor_id {
                    Some(id) => stmt.query_map(params![feed_id, limit, id], item_from_row)?,
                    None => stmt.query_map(params![feed_id, limit], item_from_row)?,
                };
                let items = rows.collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(items)
            })
            .await?;
        Ok(items)
    }

    #[cfg(test)]
    pub async fn count_rows(&self, table: &'static str) -> Result<i64> {
        let count = self
            .conn
            .call(move |conn| {
                let count: i64 =
                    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                        row.get(0)
                    })?;
                Ok(count)
            })
            .await?;
        Ok(count)
    }
}

fn apply_write(tx: &Transaction, write: &PendingWrite) -> rusqlite::Result<()> {
    match write {
        PendingWrite::InsertFeed(feed) => {
            tx.execute(
                &format!(
                    "INSERT INTO feeds ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, datetime('now'))",
                    FEED_COLUMNS
                ),
                params![
                    feed.id,
                    feed.title,
                    feed.description,
                    feed.link,
                    feed.feed_link,
                    json_list(&feed.links),
                    feed.feed_type,
                    feed.feed_version,
                    feed.language,
                    feed.copyright,
                    feed.generator,
                    json_list(&feed.categories),
                    feed.image.as_str(),
                    feed.extensions.as_str(),
                    feed.updated.map(|dt| dt.to_rfc3339()),
                    feed.published.map(|dt| dt.to_rfc3339()),
                ],
            )?;
        }
        PendingWrite::InsertPerson(person) => {
            tx.execute(
                "INSERT INTO feed_persons (id, feed_id, name, email) VALUES (?1, ?2, ?3, ?4)",
                params![person.id, person.feed_id, person.name, person.email],
            )?;
        }
        PendingWrite::LinkFeedAuthor { feed_id, person_id } => {
            tx.execute(
                "INSERT INTO feed_authors (feed_id, person_id) VALUES (?1, ?2)",
                params![feed_id, person_id],
            )?;
        }
        PendingWrite::InsertItem(item) => {
            tx.execute(
                &format!(
                    "INSERT INTO feed_items ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, datetime('now'))",
                    ITEM_COLUMNS
                ),
                params![
                    item.id,
                    item.feed_id,
                    item.guid,
                    item.title,
                    item.description,
                    item.description_markdown,
                    item.content,
                    item.content_markdown,
                    item.link,
                    json_list(&item.links),
                    item.published.map(|dt| dt.to_rfc3339()),
                    item.updated.map(|dt| dt.to_rfc3339()),
                    json_list(&item.categories),
                    item.enclosures.as_str(),
                    item.image.as_str(),
                    item.extensions.as_str(),
                ],
            )?;
        }
        PendingWrite::LinkItemAuthor { item_id, person_id } => {
            tx.execute(
                "INSERT INTO feed_item_authors (item_id, person_id) VALUES (?1, ?2)",
                params![item_id, person_id],
            )?;
        }
    }
    Ok(())
}

fn json_list(values: &[String]) -> String {
    serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string())
}

fn json_list_at(row: &Row, idx: usize) -> rusqlite::Result<Vec<String>> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    // Try RFC3339 first (e.g., "2026-01-11T12:34:56+00:00")
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Try SQLite datetime format (e.g., "2026-01-11 12:34:56")
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    None
}

fn datetime_at(row: &Row, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    Ok(row
        .get::<_, Option<String>>(idx)?
        .and_then(|s| parse_datetime(&s)))
}

fn feed_from_row(row: &Row) -> rusqlite::Result<Feed> {
    Ok(Feed {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        link: row.get(3)?,
        feed_link: row.get(4)?,
        links: json_list_at(row, 5)?,
        feed_type: row.get(6)?,
        feed_version: row.get(7)?,
        language: row.get(8)?,
        copyright: row.get(9)?,
        generator: row.get(10)?,
        categories: json_list_at(row, 11)?,
        image: Blob::from_raw(row.get(12)?),
        extensions: Blob::from_raw(row.get(13)?),
        updated: datetime_at(row, 14)?,
        published: datetime_at(row, 15)?,
        created_at: datetime_at(row, 16)?.unwrap_or_else(Utc::now),
    })
}

fn item_from_row(row: &Row) -> rusqlite::Result<FeedItem> {
    Ok(FeedItem {
        id: row.get(0)?,
        feed_id: row.get(1)?,
        guid: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        description_markdown: row.get(5)?,
        content: row.get(6)?,
        content_markdown: row.get(7)?,
        link: row.get(8)?,
        links: json_list_at(row, 9)?,
        published: datetime_at(row, 10)?,
        updated: datetime_at(row, 11)?,
        categories: json_list_at(row, 12)?,
        enclosures: Blob::from_raw(row.get(13)?),
        image: Blob::from_raw(row.get(14)?),
        extensions: Blob::from_raw(row.get(15)?),
        created_at: datetime_at(row, 16)?.unwrap_or_else(Utc::now),
    })
}

fn person_from_row(row: &Row) -> rusqlite::Result<Person> {
    Ok(Person {
        id: row.get(0)?,
        feed_id: row.get(1)?,
        name: row.get(2)?,
        email: row.get(3)?,
    })
}
