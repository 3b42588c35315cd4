pub const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

-- feeds table
CREATE TABLE IF NOT EXISTS feeds (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    link TEXT NOT NULL DEFAULT '',
    feed_link TEXT NOT NULL UNIQUE,
    links TEXT NOT NULL DEFAULT '[]',
    feed_type TEXT NOT NULL DEFAULT '',
    feed_version TEXT,
    language TEXT,
    copyright TEXT,
    generator TEXT,
    categories TEXT NOT NULL DEFAULT '[]',
    image TEXT NOT NULL DEFAULT 'null',
    extensions TEXT NOT NULL DEFAULT '{}',
    updated TEXT,
    published TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_feeds_title ON feeds(title);

-- feed_items table
CREATE TABLE IF NOT EXISTS feed_items (
    id TEXT PRIMARY KEY,
    feed_id TEXT NOT NULL REFERENCES feeds(id) ON DELETE CASCADE,
    guid TEXT NOT NULL,
    title TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    description_markdown TEXT NOT NULL DEFAULT '',
    content TEXT NOT NULL DEFAULT '',
    content_markdown TEXT NOT NULL DEFAULT '',
    link TEXT NOT NULL DEFAULT '',
    links TEXT NOT NULL DEFAULT '[]',
    published TEXT,
    updated TEXT,
    categories TEXT NOT NULL DEFAULT '[]',
    enclosures TEXT NOT NULL DEFAULT '[]',
    image TEXT NOT NULL DEFAULT 'null',
    extensions TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE(feed_id, guid)
);

CREATE INDEX IF NOT EXISTS idx_feed_items_feed_id ON feed_items(feed_id, id);

-- feed_persons table (authors are scoped to a feed)
CREATE TABLE IF NOT EXISTS feed_persons (
    id TEXT PRIMARY KEY,
    feed_id TEXT NOT NULL REFERENCES feeds(id) ON DELETE CASCADE,
    name TEXT NOT NULL DEFAULT '',
    email TEXT NOT NULL DEFAULT '',
    UNIQUE(feed_id, name, email)
);

-- feed_authors table
CREATE TABLE IF NOT EXISTS feed_authors (
    feed_id TEXT NOT NULL REFERENCES feeds(id) ON DELETE CASCADE,
    person_id TEXT NOT NULL REFERENCES feed_persons(id) ON DELETE CASCADE,
    PRIMARY KEY(feed_id, person_id)
);

-- feed_item_authors table
CREATE TABLE IF NOT EXISTS feed_item_authors (
    item_id TEXT NOT NULL REFERENCES feed_items(id) ON DELETE CASCADE,
    person_id TEXT NOT NULL REFERENCES feed_persons(id) ON DELETE CASCADE,
    PRIMARY KEY(item_id, person_id)
);

CREATE INDEX IF NOT EXISTS idx_feed_item_authors_person ON feed_item_authors(person_id);
"#;
