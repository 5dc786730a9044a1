//! YouTube Data API collector.
//!
//! Fans out over a list of channel ids and fetches each channel's most
//! recent videos through the `search` endpoint. Requires `YOUTUBE_API_KEY`.
//! A channel that errors (deleted, quota, bad id) is logged and skipped; an
//! empty channel list is flagged with a warning and yields nothing.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::{info, instrument, warn};

use crate::collectors::Collector;
use crate::config::{require, Credentials};
use crate::document::{
    clean_body, external_id, parse_rfc3339_or_now, title_or_default, DataKind, NormalizedDocument,
};
use crate::error::CollectError;
use crate::http;

const API_URL: &str = "https://www.googleapis.com/youtube/v3";
const SOURCE_NAME: &str = "YouTube";

pub struct YouTubeCollector {
    client: reqwest::Client,
    api_key: Option<String>,
    channel_ids: Vec<String>,
    max_results: u32,
}

impl YouTubeCollector {
    pub fn new(credentials: &Credentials, channel_ids: Vec<String>, max_results: u32) -> Self {
        Self {
            client: http::default_client(),
            api_key: credentials.youtube_key.clone(),
            channel_ids,
            max_results,
        }
    }

    async fn fetch_channel(
        &self,
        api_key: &str,
        channel_id: &str,
    ) -> Result<Vec<NormalizedDocument>, CollectError> {
        let body: Value = self
            .client
            .get(format!("{API_URL}/search"))
            .query(&[
                ("part", "snippet"),
                ("channelId", channel_id),
                ("maxResults", &self.max_results.to_string()),
                ("order", "date"),
                ("type", "video"),
                ("key", api_key),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let items = body["items"]
            .as_array()
            .ok_or_else(|| CollectError::payload("search response has no items array"))?;

        let mut documents = Vec::new();
        for item in items {
            match map_video(item, channel_id) {
                Ok(doc) => documents.push(doc),
                Err(e) => {
                    warn!(source = SOURCE_NAME, %channel_id, error = %e, "skipping malformed video")
                }
            }
        }
        Ok(documents)
    }
}

/// Map one search result to a document.
fn map_video(raw: &Value, channel_id: &str) -> Result<NormalizedDocument, CollectError> {
    let video_id = raw["id"]["videoId"]
        .as_str()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CollectError::payload("search result without videoId"))?;
    let snippet = raw["snippet"]
        .as_object()
        .ok_or_else(|| CollectError::payload("search result without snippet"))?;

    let mut extra = Map::new();
    if let Some(channel_title) = snippet.get("channelTitle").and_then(Value::as_str) {
        extra.insert("channel_title".into(), json!(channel_title));
    }
    extra.insert("channel_id".into(), json!(channel_id));

    Ok(NormalizedDocument {
        external_id: external_id("youtube", video_id),
        title: title_or_default(snippet.get("title").and_then(Value::as_str)),
        body_text: clean_body(
            snippet
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default(),
        ),
        url: Some(format!("https://www.youtube.com/watch?v={video_id}")),
        published_at: parse_rfc3339_or_now(snippet.get("publishedAt").and_then(Value::as_str)),
        source_name: SOURCE_NAME.to_string(),
        data_kind: DataKind::Api,
        source_specific_fields: extra,
    })
}

#[async_trait]
impl Collector for YouTubeCollector {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    #[instrument(level = "info", skip_all, fields(channels = self.channel_ids.len()))]
    async fn collect(&self) -> Result<Vec<NormalizedDocument>, CollectError> {
        let api_key = require(&self.api_key, SOURCE_NAME, "YOUTUBE_API_KEY")?.to_string();

        // Channel ids have no sensible universal default; an empty target
        // list is almost always a wiring mistake, so say so.
        if self.channel_ids.is_empty() {
            warn!(source = SOURCE_NAME, "no channel ids configured; collecting nothing");
            return Ok(Vec::new());
        }

        let mut documents = Vec::new();
        for channel_id in &self.channel_ids {
            match self.fetch_channel(&api_key, channel_id).await {
                Ok(mut docs) => {
                    info!(source = SOURCE_NAME, %channel_id, count = docs.len(), "channel collected");
                    documents.append(&mut docs);
                }
                Err(e) => warn!(source = SOURCE_NAME, %channel_id, error = %e, "channel skipped"),
            }
        }

        info!(source = SOURCE_NAME, count = documents.len(), "collected videos");
        Ok(documents)
    }
}
