use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Fetching or parsing an upstream feed failed.
    #[error("Failed to fetch feed {url}: {reason}")]
    UpstreamFetch { url: String, reason: String },

    /// The HTML to Markdown converter was unavailable or rejected the payload.
    #[error("Content conversion failed: {0}")]
    Conversion(String),

    #[error("Persistence error: {0}")]
    Persistence(#[from] tokio_rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn upstream(url: &str, reason: impl ToString) -> Self {
        AppError::UpstreamFetch {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Short tag for logs and exit reporting.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "invalid_input",
            AppError::NotFound(_) => "not_found",
            AppError::UpstreamFetch { .. } => "upstream_fetch",
            AppError::Conversion(_) => "conversion",
            AppError::Persistence(_) => "persistence",
            AppError::Serialization(_) => "serialization",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::Internal(_) => "internal",
        }
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::Persistence(err.into())
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_error_names_the_url() {
        let err = AppError::upstream("https://example.com/feed.xml", "HTTP 503");
        assert_eq!(err.kind(), "upstream_fetch");
        assert_eq!(
            err.to_string(),
            "Failed to fetch feed https://example.com/feed.xml: HTTP 503"
        );
    }

    #[test]
    fn sqlite_errors_are_persistence_errors() {
        let err: AppError = rusqlite::Error::QueryReturnedNoRows.into();
        assert_eq!(err.kind(), "persistence");
    }
}
