use url::Url;

use crate::error::{AppError, Result};
use crate::models::Feed;

use super::FeedService;

impl FeedService {
    /// Resolve a search query into feeds.
    ///
    /// Blank queries return nothing without touching the store. Queries that
    /// start with an HTTP(S) scheme are treated as subscribe links: a stored
    /// feed with that link is returned, otherwise the link is bootstrapped.
    /// Anything else is a title keyword search.
    pub async fn resolve_feeds(&self, query: &str) -> Result<Vec<Feed>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        if has_http_scheme(query) {
            Url::parse(query)
                .map_err(|e| AppError::InvalidInput(format!("invalid feed URL {}: {}", query, e)))?;
            let feed = self.resolve_feed_link(query).await?;
            return Ok(vec![feed]);
        }

        self.repository
            .search_feeds_by_title(query, self.options.case_sensitive_search)
            .await
    }

    pub async fn resolve_feed_link(&self, feed_link: &str) -> Result<Feed> {
        if let Some(feed) = self.repository.find_feed_by_link(feed_link).await? {
            return Ok(feed);
        }
        self.bootstrap(feed_link).await
    }
}

fn has_http_scheme(query: &str) -> bool {
    let lower = query.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::testing::{self, StubConverter, StubSource};

    #[test]
    fn detects_http_schemes() {
        assert!(has_http_scheme("https://example.com/feed.xml"));
        assert!(has_http_scheme("HTTP://example.com/rss"));
        assert!(!has_http_scheme("httpbin news"));
        assert!(!has_http_scheme("rust"));
        assert!(!has_http_scheme("ftp://example.com/feed"));
    }

    #[tokio::test]
    async fn blank_query_touches_nothing() {
        let source = StubSource::new();
        let converter = StubConverter::new();
        let service = testing::service(&source, &converter).await;

        assert!(service.resolve_feeds("").await.unwrap().is_empty());
        assert!(service.resolve_feeds("   \t").await.unwrap().is_empty());
        assert_eq!(source.calls(), 0);
        assert_eq!(service.repository.count_rows("feeds").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unknown_link_is_bootstrapped() {
        let source = StubSource::new();
        let converter = StubConverter::new();
        let link = "https://example.com/feed.xml";
        source.publish(link, testing::document("Example", &[], vec![]));
        let service = testing::service(&source, &converter).await;

        let feeds = service.resolve_feeds(link).await.unwrap();
        assert_eq!(feeds.len(), 1);
        assert_eq!(feeds[0].feed_link, link);
        assert_eq!(feeds[0].title, "Example");
    }

    #[tokio::test]
    async fn known_link_is_not_fetched_again() {
        let source = StubSource::new();
        let converter = StubConverter::new();
        let link = "https://example.com/feed.xml";
        source.publish(link, testing::document("Example", &[], vec![]));
        let service = testing::service(&source, &converter).await;

        let first = service.resolve_feeds(link).await.unwrap();
        let second = service.resolve_feeds(link).await.unwrap();
        assert_eq!(first[0].id, second[0].id);
        assert_eq!(source.calls(), 1);
        assert_eq!(service.repository.count_rows("feeds").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn bootstrap_failure_propagates() {
        let source = StubSource::new();
        let converter = StubConverter::new();
        let service = testing::service(&source, &converter).await;

        let err = service
            .resolve_feeds("https://missing.example.com/feed.xml")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UpstreamFetch { .. }));
        assert_eq!(service.repository.count_rows("feeds").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn malformed_url_is_invalid_input() {
        let source = StubSource::new();
        let converter = StubConverter::new();
        let service = testing::service(&source, &converter).await;

        let err = service.resolve_feeds("http://").await.unwrap_err();
        assert_eq!(err.kind(), "invalid_input");
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn keyword_matches_titles() {
        let source = StubSource::new();
        let converter = StubConverter::new();
        source.publish(
            "https://a.example.com/rss",
            testing::document("Rust Weekly", &[], vec![]),
        );
        source.publish(
            "https://b.example.com/rss",
            testing::document("Cooking with Rust", &[], vec![]),
        );
        source.publish(
            "https://c.example.com/rss",
            testing::document("Go News", &[], vec![]),
        );
        let service = testing::service(&source, &converter).await;
        for link in [
            "https://a.example.com/rss",
            "https://b.example.com/rss",
            "https://c.example.com/rss",
        ] {
            service.resolve_feeds(link).await.unwrap();
        }

        let titles: Vec<String> = service
            .resolve_feeds("Rust")
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.title)
            .collect();
        assert_eq!(titles, vec!["Cooking with Rust", "Rust Weekly"]);

        assert!(service.resolve_feeds("rust").await.unwrap().is_empty());
    }
}
