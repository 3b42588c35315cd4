mod converter;

pub use converter::{ContentConverter, LocalConverter, RemoteConverter};
