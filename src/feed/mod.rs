mod document;
mod fetcher;
mod opml_import;

pub use document::{
    Enclosure, FeedDocument, FeedExtensions, Image, ItemDocument, ItemExtensions, MediaBlock,
    PersonRef,
};
pub use fetcher::{FeedFetcher, FeedSource};
pub use opml_import::parse_opml_file;
