mod blob;
mod feed;
mod feed_item;
mod person;

pub use blob::Blob;
pub use feed::{Feed, NewFeed};
pub use feed_item::{FeedItem, NewFeedItem};
pub use person::{Person, PersonKey};
