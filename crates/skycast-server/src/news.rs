//! Weather news via an RSS search feed (Google News by default).
//!
//! The feed is scraped with a lightweight regex pass rather than a full XML
//! parser; items missing a title or link are skipped.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use regex::Regex;
use reqwest::Client;
use serde::Serialize;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum NewsError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Feed returned status {0}")]
    Status(u16),
    #[error("Feed pattern error: {0}")]
    Pattern(#[from] regex::Error),
    #[error("Invalid feed URL: {0}")]
    InvalidUrl(String),
}

/// One headline from the feed
#[derive(Debug, Clone, Serialize)]
pub struct NewsItem {
    pub title: String,
    pub link: String,
    pub date: String,
    pub source: String,
}

/// RSS feed client
#[derive(Debug, Clone)]
pub struct NewsClient {
    client: Arc<Client>,
    feed_url: Url,
    max_items: usize,
    item_re: Regex,
    title_re: Regex,
    link_re: Regex,
    date_re: Regex,
    source_re: Regex,
}

impl NewsClient {
    pub fn new(feed_url: &str, max_items: usize, timeout: Duration) -> Result<Self, NewsError> {
        let feed_url = Url::parse(feed_url).map_err(|e| NewsError::InvalidUrl(e.to_string()))?;
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client: Arc::new(client),
            feed_url,
            max_items,
            item_re: Regex::new(r"(?s)<item>(.*?)</item>")?,
            title_re: Regex::new(r"(?s)<title>(.*?)</title>")?,
            link_re: Regex::new(r"(?s)<link>(.*?)</link>")?,
            date_re: Regex::new(r"<pubDate>(.*?)</pubDate>")?,
            source_re: Regex::new(r#"<source url=".*?">(.*?)</source>"#)?,
        })
    }

    /// Fetch and extract up to `max_items` headlines
    pub async fn headlines(&self) -> Result<Vec<NewsItem>, NewsError> {
        tracing::debug!(feed = %self.feed_url, "fetching weather news");

        let response = self.client.get(self.feed_url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NewsError::Status(status.as_u16()));
        }

        let xml = response.text().await?;
        let items = self.parse_feed(&xml);
        tracing::info!("Fetched {} news items", items.len());
        Ok(items)
    }

    fn parse_feed(&self, xml: &str) -> Vec<NewsItem> {
        let mut items = Vec::new();

        for captures in self.item_re.captures_iter(xml) {
            if items.len() >= self.max_items {
                break;
            }
            let body = &captures[1];

            let (Some(title), Some(link)) =
                (capture_first(&self.title_re, body), capture_first(&self.link_re, body))
            else {
                continue;
            };

            let date = capture_first(&self.date_re, body)
                .unwrap_or_else(|| Utc::now().to_rfc2822());
            let source = capture_first(&self.source_re, body)
                .unwrap_or_else(|| "Global News".to_string());

            items.push(NewsItem {
                title: strip_cdata(&title),
                link,
                date,
                source,
            });
        }

        items
    }
}

fn capture_first(re: &Regex, text: &str) -> Option<String> {
    re.captures(text).map(|c| c[1].to_string())
}

fn strip_cdata(text: &str) -> String {
    text.replace("<![CDATA[", "").replace("]]>", "")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(max_items: usize) -> NewsClient {
        NewsClient::new(
            "https://news.example.com/rss",
            max_items,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    const FEED: &str = r#"<?xml version="1.0"?>
<rss><channel>
  <item>
    <title><![CDATA[Heatwave breaks records]]></title>
    <link>https://news.example.com/a</link>
    <pubDate>Wed, 05 Aug 2026 10:00:00 GMT</pubDate>
    <source url="https://example.com">Example Times</source>
  </item>
  <item>
    <title>Monsoon arrives early</title>
    <link>https://news.example.com/b</link>
  </item>
  <item>
    <link>https://news.example.com/no-title</link>
  </item>
</channel></rss>"#;

    #[test]
    fn test_parse_extracts_fields_and_strips_cdata() {
        let items = client(6).parse_feed(FEED);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Heatwave breaks records");
        assert_eq!(items[0].link, "https://news.example.com/a");
        assert_eq!(items[0].date, "Wed, 05 Aug 2026 10:00:00 GMT");
        assert_eq!(items[0].source, "Example Times");
    }

    #[test]
    fn test_parse_defaults_missing_source() {
        let items = client(6).parse_feed(FEED);
        assert_eq!(items[1].source, "Global News");
        // Missing pubDate falls back to "now", which is still non-empty
        assert!(!items[1].date.is_empty());
    }

    #[test]
    fn test_parse_skips_items_without_title() {
        let items = client(6).parse_feed(FEED);
        assert!(items.iter().all(|i| !i.title.is_empty()));
    }

    #[test]
    fn test_parse_caps_at_max_items() {
        let items = client(1).parse_feed(FEED);
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_invalid_feed_url_rejected() {
        let err = NewsClient::new("not a url", 6, Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, NewsError::InvalidUrl(_)));
    }
}
