use std::path::Path;

use opml::{Outline, OPML};

use crate::error::{AppError, Result};

/// Read an OPML file and return every subscribe URL it lists, in document
/// order, without duplicates.
pub fn parse_opml_file(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    parse_opml(&content)
}

pub fn parse_opml(content: &str) -> Result<Vec<String>> {
    let document = OPML::from_str(content)
        .map_err(|e| AppError::InvalidInput(format!("invalid OPML: {}", e)))?;

    let mut urls = Vec::new();
    collect_feed_urls(&document.body.outlines, &mut urls);
    Ok(urls)
}

fn collect_feed_urls(outlines: &[Outline], urls: &mut Vec<String>) {
    for outline in outlines {
        if let Some(url) = outline.xml_url.as_deref().map(str::trim) {
            if !url.is_empty() && !urls.iter().any(|u| u == url) {
                urls.push(url.to_string());
            }
        }
        collect_feed_urls(&outline.outlines, urls);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<opml version="2.0">
  <head><title>Subscriptions</title></head>
  <body>
    <outline text="Tech">
      <outline text="Blog A" type="rss" xmlUrl="https://a.example.com/feed.xml"/>
      <outline text="Blog B" type="rss" xmlUrl="https://b.example.com/atom.xml"/>
    </outline>
    <outline text="Blog A again" type="rss" xmlUrl="https://a.example.com/feed.xml"/>
    <outline text="Just a folder"/>
  </body>
</opml>"#;

    #[test]
    fn collects_nested_urls_once() {
        let urls = parse_opml(OPML).unwrap();
        assert_eq!(
            urls,
            vec![
                "https://a.example.com/feed.xml".to_string(),
                "https://b.example.com/atom.xml".to_string(),
            ]
        );
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subs.opml");
        std::fs::write(&path, OPML).unwrap();
        assert_eq!(parse_opml_file(&path).unwrap().len(), 2);
    }

    #[test]
    fn rejects_malformed_documents() {
        let err = parse_opml("<not-opml/>").unwrap_err();
        assert_eq!(err.kind(), "invalid_input");
    }
}
