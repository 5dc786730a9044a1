//! Reddit collector.
//!
//! Authenticates with the OAuth client-credentials flow once per collection
//! pass, then fans out over a list of subreddits and fetches each one's hot
//! posts. Requires `REDDIT_CLIENT_ID` and `REDDIT_CLIENT_SECRET`. A failing
//! subreddit (banned, private, typo) is logged and skipped.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Map, Value};
use tracing::{info, instrument, warn};

use crate::collectors::Collector;
use crate::config::{require, Credentials};
use crate::document::{
    clean_body, external_id, from_unix_or_now, title_or_default, DataKind, NormalizedDocument,
};
use crate::error::CollectError;
use crate::http;

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const API_URL: &str = "https://oauth.reddit.com";
const SOURCE_NAME: &str = "Reddit";

/// Default communities when the caller supplies none.
pub const DEFAULT_SUBREDDITS: [&str; 3] = ["france", "Paris", "Lyon"];

pub struct RedditCollector {
    client: reqwest::Client,
    client_id: Option<String>,
    client_secret: Option<String>,
    subreddits: Vec<String>,
    limit: u32,
}

impl RedditCollector {
    pub fn new(credentials: &Credentials, subreddits: Vec<String>, limit: u32) -> Self {
        let subreddits = if subreddits.is_empty() {
            DEFAULT_SUBREDDITS.iter().map(|s| s.to_string()).collect()
        } else {
            subreddits
        };
        Self {
            client: http::default_client(),
            client_id: credentials.reddit_client_id.clone(),
            client_secret: credentials.reddit_client_secret.clone(),
            subreddits,
            limit,
        }
    }

    async fn fetch_token(&self, id: &str, secret: &str) -> Result<String, CollectError> {
        let body: Value = self
            .client
            .post(TOKEN_URL)
            .basic_auth(id, Some(secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        body["access_token"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| CollectError::payload("token response without access_token"))
    }

    async fn fetch_subreddit(
        &self,
        token: &str,
        subreddit: &str,
    ) -> Result<Vec<NormalizedDocument>, CollectError> {
        let body: Value = self
            .client
            .get(format!("{API_URL}/r/{subreddit}/hot"))
            .bearer_auth(token)
            .query(&[("limit", self.limit.to_string())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let children = body["data"]["children"]
            .as_array()
            .ok_or_else(|| CollectError::payload("listing has no children array"))?;

        let mut documents = Vec::new();
        for child in children {
            match map_post(&child["data"], subreddit) {
                Ok(doc) => documents.push(doc),
                Err(e) => {
                    warn!(source = SOURCE_NAME, %subreddit, error = %e, "skipping malformed post")
                }
            }
        }
        Ok(documents)
    }
}

/// Map one post (the `data` object of a listing child) to a document.
fn map_post(raw: &Value, subreddit: &str) -> Result<NormalizedDocument, CollectError> {
    let native_id = raw["id"]
        .as_str()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CollectError::payload("post without id"))?;

    let mut extra = Map::new();
    if let Some(author) = raw["author"].as_str() {
        extra.insert("author".into(), json!(author));
    }
    if let Some(score) = raw["score"].as_i64() {
        extra.insert("score".into(), json!(score));
    }
    if let Some(n) = raw["num_comments"].as_i64() {
        extra.insert("num_comments".into(), json!(n));
    }
    extra.insert("subreddit".into(), json!(subreddit));

    Ok(NormalizedDocument {
        external_id: external_id("reddit", native_id),
        title: title_or_default(raw["title"].as_str()),
        body_text: clean_body(raw["selftext"].as_str().unwrap_or_default()),
        url: raw["permalink"]
            .as_str()
            .map(|p| format!("https://reddit.com{p}")),
        published_at: raw["created_utc"]
            .as_f64()
            .map(|secs| from_unix_or_now(secs as i64))
            .unwrap_or_else(Utc::now),
        source_name: SOURCE_NAME.to_string(),
        data_kind: DataKind::Api,
        source_specific_fields: extra,
    })
}

#[async_trait]
impl Collector for RedditCollector {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    #[instrument(level = "info", skip_all, fields(subreddits = self.subreddits.len()))]
    async fn collect(&self) -> Result<Vec<NormalizedDocument>, CollectError> {
        let id = require(&self.client_id, SOURCE_NAME, "REDDIT_CLIENT_ID")?.to_string();
        let secret = require(&self.client_secret, SOURCE_NAME, "REDDIT_CLIENT_SECRET")?.to_string();

        let token = self.fetch_token(&id, &secret).await?;

        let mut documents = Vec::new();
        for subreddit in &self.subreddits {
            match self.fetch_subreddit(&token, subreddit).await {
                Ok(mut docs) => {
                    info!(source = SOURCE_NAME, %subreddit, count = docs.len(), "subreddit collected");
                    documents.append(&mut docs);
                }
                Err(e) => warn!(source = SOURCE_NAME, %subreddit, error = %e, "subreddit skipped"),
            }
        }

        info!(source = SOURCE_NAME, count = documents.len(), "collected posts");
        Ok(documents)
    }
}
