//! Trustpilot review scraper.
//!
//! Scrapes the public review page of each configured company slug and
//! normalizes up to `max_reviews` reviews per company. This is HTML
//! scraping, not an API: page fetches to the host go through the politeness
//! gate, and the selectors below encode the site's current markup — they are
//! an extraction rule subject to change, not a stable contract.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use scraper::{Html, Selector};
use serde_json::{json, Map};
use tracing::{info, instrument, warn};

use crate::collectors::Collector;
use crate::document::{clean_body, external_id, DataKind, NormalizedDocument};
use crate::error::CollectError;
use crate::http::{self, PolitenessGate};

const BASE_URL: &str = "https://fr.trustpilot.com";
const SOURCE_NAME: &str = "Trustpilot";

/// Default company slugs when the caller supplies none.
pub const DEFAULT_COMPANIES: [&str; 3] = ["sncf", "edf", "orange-france"];

pub struct TrustpilotCollector {
    client: reqwest::Client,
    gate: Arc<PolitenessGate>,
    companies: Vec<String>,
    max_reviews: usize,
}

impl TrustpilotCollector {
    pub fn new(gate: Arc<PolitenessGate>, companies: Vec<String>, max_reviews: usize) -> Self {
        let companies = if companies.is_empty() {
            DEFAULT_COMPANIES.iter().map(|c| c.to_string()).collect()
        } else {
            companies
        };
        Self {
            client: http::default_client(),
            gate,
            companies,
            max_reviews,
        }
    }
}

/// Extract up to `max` reviews from a company page. Pure; tested on fixture
/// HTML. The review index within the page is part of the document identity,
/// so re-parsing the same page yields the same ids.
fn parse_reviews(company: &str, page_url: &str, html: &str, max: usize) -> Vec<NormalizedDocument> {
    let document = Html::parse_document(html);
    let review_selector = Selector::parse("article.review").unwrap();
    let title_selector = Selector::parse("h2.review-title").unwrap();
    let text_selector = Selector::parse("p.review-text").unwrap();
    let rating_selector = Selector::parse("div.star-rating").unwrap();

    let mut documents = Vec::new();
    for (idx, review) in document.select(&review_selector).take(max).enumerate() {
        let title = review
            .select(&title_selector)
            .next()
            .map(|e| e.text().collect::<Vec<_>>().join(" ").trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "Avis".to_string());
        let text = review
            .select(&text_selector)
            .next()
            .map(|e| e.text().collect::<Vec<_>>().join(" "))
            .unwrap_or_default();

        let mut extra = Map::new();
        extra.insert("company".into(), json!(company));
        if let Some(rating) = review
            .select(&rating_selector)
            .next()
            .and_then(|e| e.value().attr("data-rating"))
        {
            extra.insert("rating".into(), json!(rating));
        }

        documents.push(NormalizedDocument {
            external_id: external_id("trustpilot", &format!("{company}_{idx}")),
            title,
            body_text: clean_body(&text),
            url: Some(page_url.to_string()),
            // The page shows relative dates; collection time is the best
            // canonical timestamp available.
            published_at: Utc::now(),
            source_name: SOURCE_NAME.to_string(),
            data_kind: DataKind::WebScraping,
            source_specific_fields: extra,
        });
    }
    documents
}

#[async_trait]
impl Collector for TrustpilotCollector {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    #[instrument(level = "info", skip_all, fields(companies = self.companies.len()))]
    async fn collect(&self) -> Result<Vec<NormalizedDocument>, CollectError> {
        let mut documents = Vec::new();
        for company in &self.companies {
            let page_url = format!("{BASE_URL}/review/{company}");
            self.gate.wait(&page_url).await;

            let result: Result<String, CollectError> = async {
                Ok(self
                    .client
                    .get(&page_url)
                    .send()
                    .await?
                    .error_for_status()?
                    .text()
                    .await?)
            }
            .await;

            match result {
                Ok(html) => {
                    let mut docs = parse_reviews(company, &page_url, &html, self.max_reviews);
                    info!(source = SOURCE_NAME, %company, count = docs.len(), "company scraped");
                    documents.append(&mut docs);
                }
                Err(e) => warn!(source = SOURCE_NAME, %company, error = %e, "company skipped"),
            }
        }

        info!(source = SOURCE_NAME, count = documents.len(), "collected reviews");
        Ok(documents)
    }
}
