mod repository;
mod schema;

pub use repository::{PageCursor, PendingWrite, Repository};
