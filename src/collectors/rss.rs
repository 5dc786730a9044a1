//! Multi-feed RSS aggregator.
//!
//! Iterates a `source name → feed URL` map (a default French/international
//! press list is provided), downloads each feed, and normalizes up to
//! `limit_per_feed` entries per feed. A feed that fails to download or parse
//! is logged and skipped; the other feeds still contribute their entries.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map};
use tracing::{info, instrument, warn};

use crate::collectors::Collector;
use crate::document::{
    clean_body, external_id, parse_rfc2822_or_now, title_or_default, DataKind, NormalizedDocument,
};
use crate::error::CollectError;
use crate::http;

const SOURCE_TAG: &str = "rss";

/// The default feed list: `(display name, feed URL)`.
pub fn default_feeds() -> Vec<(String, String)> {
    [
        ("Le Monde", "https://www.lemonde.fr/rss/une.xml"),
        ("Franceinfo", "https://www.francetvinfo.fr/titres.rss"),
        ("20 Minutes", "https://www.20minutes.fr/feeds/rss-une.xml"),
        ("BBC News France", "http://feeds.bbci.co.uk/news/world/europe/rss.xml"),
        ("France 24", "https://www.france24.com/fr/rss"),
        ("RFI", "https://www.rfi.fr/fr/rss"),
    ]
    .into_iter()
    .map(|(name, url)| (name.to_string(), url.to_string()))
    .collect()
}

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    guid: Option<Guid>,
    author: Option<String>,
    #[serde(default)]
    category: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Guid {
    #[serde(rename = "$text")]
    value: Option<String>,
}

pub struct RssCollector {
    client: reqwest::Client,
    feeds: Vec<(String, String)>,
    limit_per_feed: usize,
}

impl RssCollector {
    pub fn new(feeds: Vec<(String, String)>, limit_per_feed: usize) -> Self {
        let feeds = if feeds.is_empty() { default_feeds() } else { feeds };
        Self {
            client: http::default_client(),
            feeds,
            limit_per_feed,
        }
    }
}

fn slug(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// Parse one feed body and normalize up to `limit` entries. Pure; tested on
/// fixture XML.
fn parse_feed(name: &str, xml: &str, limit: usize) -> Result<Vec<NormalizedDocument>, CollectError> {
    let rss: Rss = quick_xml::de::from_str(xml)?;

    let mut documents = Vec::new();
    for item in rss.channel.items.into_iter().take(limit) {
        // Stable entry identity: guid, else link, else title.
        let native = match (
            item.guid.as_ref().and_then(|g| g.value.as_deref()),
            item.link.as_deref(),
            item.title.as_deref(),
        ) {
            (Some(guid), _, _) => guid.to_string(),
            (None, Some(link), _) => link.to_string(),
            (None, None, Some(title)) => title.to_string(),
            (None, None, None) => {
                warn!(feed = name, "skipping entry with no guid, link, or title");
                continue;
            }
        };

        let mut extra = Map::new();
        if let Some(author) = &item.author {
            extra.insert("author".into(), json!(author));
        }
        if let Some(category) = item.category.first() {
            extra.insert("category".into(), json!(category));
        }

        documents.push(NormalizedDocument {
            external_id: external_id(SOURCE_TAG, &format!("{}_{native}", slug(name))),
            title: title_or_default(item.title.as_deref()),
            body_text: clean_body(item.description.as_deref().unwrap_or_default()),
            url: item.link.clone(),
            published_at: parse_rfc2822_or_now(item.pub_date.as_deref()),
            source_name: format!("RSS - {name}"),
            data_kind: DataKind::WebScraping,
            source_specific_fields: extra,
        });
    }
    Ok(documents)
}

#[async_trait]
impl Collector for RssCollector {
    fn name(&self) -> &'static str {
        "RSS"
    }

    #[instrument(level = "info", skip_all, fields(feeds = self.feeds.len()))]
    async fn collect(&self) -> Result<Vec<NormalizedDocument>, CollectError> {
        let mut documents = Vec::new();
        for (name, url) in &self.feeds {
            let result: Result<Vec<NormalizedDocument>, CollectError> = async {
                let xml = self
                    .client
                    .get(url)
                    .send()
                    .await?
                    .error_for_status()?
                    .text()
                    .await?;
                parse_feed(name, &xml, self.limit_per_feed)
            }
            .await;

            match result {
                Ok(mut docs) => {
                    info!(feed = %name, count = docs.len(), "feed collected");
                    documents.append(&mut docs);
                }
                Err(e) => warn!(feed = %name, %url, error = %e, "feed skipped"),
            }
        }

        info!(source = "RSS", count = documents.len(), "collected feed entries");
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Le Monde - Une</title>
    <item>
      <title>Budget : l&#39;Assembl&#233;e adopte le texte</title>
      <link>https://www.lemonde.fr/politique/article/budget.html</link>
      <guid>https://www.lemonde.fr/politique/article/budget.html</guid>
      <description>&lt;p&gt;Le texte a &#233;t&#233; adopt&#233; en premi&#232;re lecture.&lt;/p&gt;</description>
      <pubDate>Tue, 03 Mar 2026 09:00:00 +0100</pubDate>
      <author>redaction@lemonde.fr</author>
      <category>Politique</category>
    </item>
    <item>
      <title>Sans date ni guid</title>
      <link>https://www.lemonde.fr/societe/article/deux.html</link>
      <description>Second article.</description>
    </item>
    <item>
      <title>Troisième</title>
      <link>https://www.lemonde.fr/societe/article/trois.html</link>
      <description>Troisième article.</description>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_feed_normalizes_entries() {
        let docs = parse_feed("Le Monde", FEED, 50).unwrap();
        assert_eq!(docs.len(), 3);
        let first = &docs[0];
        assert_eq!(
            first.external_id,
            "rss_le_monde_https://www.lemonde.fr/politique/article/budget.html"
        );
        assert_eq!(first.title, "Budget : l'Assemblée adopte le texte");
        assert_eq!(first.body_text, "Le texte a été adopté en première lecture.");
        assert_eq!(first.source_name, "RSS - Le Monde");
        assert_eq!(first.data_kind, DataKind::WebScraping);
        assert_eq!(first.published_at.to_rfc3339(), "2026-03-03T08:00:00+00:00");
        assert_eq!(first.source_specific_fields["category"], json!("Politique"));
    }

    #[test]
    fn test_parse_feed_respects_limit() {
        let docs = parse_feed("Le Monde", FEED, 2).unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn test_parse_feed_entry_without_guid_falls_back_to_link() {
        let docs = parse_feed("Le Monde", FEED, 50).unwrap();
        assert_eq!(
            docs[1].external_id,
            "rss_le_monde_https://www.lemonde.fr/societe/article/deux.html"
        );
    }

    #[test]
    fn test_parse_feed_missing_date_falls_back_to_now() {
        let before = chrono::Utc::now();
        let docs = parse_feed("Le Monde", FEED, 50).unwrap();
        assert!(docs[1].published_at >= before);
    }

    #[test]
    fn test_parse_feed_malformed_xml_is_an_error() {
        assert!(parse_feed("Broken", "this is not a feed", 50).is_err());
        assert!(parse_feed("Broken", "<rss><channel><item>", 50).is_err());
    }

    #[test]
    fn test_parse_feed_deterministic_ids() {
        let a = parse_feed("Le Monde", FEED, 50).unwrap();
        let b = parse_feed("Le Monde", FEED, 50).unwrap();
        assert_eq!(a[0].external_id, b[0].external_id);
    }

    #[test]
    fn test_default_feeds_shape() {
        let feeds = default_feeds();
        assert_eq!(feeds.len(), 6);
        assert!(feeds.iter().all(|(_, url)| url.starts_with("http")));
    }
}
