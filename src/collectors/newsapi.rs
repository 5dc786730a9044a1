//! NewsAPI collector.
//!
//! Searches `newsapi.org/v2/everything` for recent articles matching a
//! keyword, optionally restricted to an outlet allowlist and a days-back
//! window. Requires `NEWSAPI_KEY`. A query matching zero remote articles is
//! a successful empty collection, not an error.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::{json, Map, Value};
use tracing::{info, instrument, warn};

use crate::collectors::Collector;
use crate::config::{require, Credentials};
use crate::document::{
    clean_body, external_id, parse_rfc3339_or_now, title_or_default, DataKind, NormalizedDocument,
};
use crate::error::CollectError;
use crate::http;

const API_URL: &str = "https://newsapi.org/v2";
const SOURCE_NAME: &str = "NewsAPI";

pub struct NewsApiCollector {
    client: reqwest::Client,
    api_key: Option<String>,
    query: String,
    /// Comma-separated outlet ids, e.g. `"bbc-news,cnn"`.
    sources: Option<String>,
    days_back: i64,
    page_size: u32,
}

impl NewsApiCollector {
    pub fn new(
        credentials: &Credentials,
        query: impl Into<String>,
        sources: Option<String>,
        days_back: i64,
        page_size: u32,
    ) -> Self {
        Self {
            client: http::default_client(),
            api_key: credentials.newsapi_key.clone(),
            query: query.into(),
            sources,
            days_back,
            page_size,
        }
    }
}

/// Map one raw article to a document. The native id is the last path segment
/// of the article URL, which NewsAPI guarantees per article.
fn map_article(raw: &Value) -> Result<NormalizedDocument, CollectError> {
    let url = raw["url"]
        .as_str()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CollectError::payload("article without url"))?;
    let native_id = url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CollectError::payload("article url has no path segment"))?;

    let mut extra = Map::new();
    if let Some(author) = raw["author"].as_str() {
        extra.insert("author".into(), json!(author));
    }
    if let Some(outlet) = raw["source"]["name"].as_str() {
        extra.insert("outlet".into(), json!(outlet));
    }
    if let Some(image) = raw["urlToImage"].as_str() {
        extra.insert("image_url".into(), json!(image));
    }

    Ok(NormalizedDocument {
        external_id: external_id("newsapi", native_id),
        title: title_or_default(raw["title"].as_str()),
        body_text: clean_body(raw["description"].as_str().unwrap_or_default()),
        url: Some(url.to_string()),
        published_at: parse_rfc3339_or_now(raw["publishedAt"].as_str()),
        source_name: SOURCE_NAME.to_string(),
        data_kind: DataKind::Api,
        source_specific_fields: extra,
    })
}

#[async_trait]
impl Collector for NewsApiCollector {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    #[instrument(level = "info", skip_all, fields(query = %self.query))]
    async fn collect(&self) -> Result<Vec<NormalizedDocument>, CollectError> {
        let api_key = require(&self.api_key, SOURCE_NAME, "NEWSAPI_KEY")?;

        let from_date = (Utc::now() - Duration::days(self.days_back))
            .date_naive()
            .to_string();
        let mut params = vec![
            ("q", self.query.clone()),
            ("from", from_date),
            ("sortBy", "publishedAt".to_string()),
            ("pageSize", self.page_size.to_string()),
            ("apiKey", api_key.to_string()),
        ];
        if let Some(sources) = &self.sources {
            params.push(("sources", sources.clone()));
        }

        let body: Value = self
            .client
            .get(format!("{API_URL}/everything"))
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let articles = body["articles"]
            .as_array()
            .ok_or_else(|| CollectError::payload("response has no articles array"))?;

        let mut documents = Vec::new();
        for article in articles {
            match map_article(article) {
                Ok(doc) => documents.push(doc),
                Err(e) => warn!(source = SOURCE_NAME, error = %e, "skipping malformed article"),
            }
        }

        info!(source = SOURCE_NAME, count = documents.len(), "collected articles");
        Ok(documents)
    }
}
