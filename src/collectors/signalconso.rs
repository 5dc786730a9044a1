//! SignalConso consumer-complaint collector.
//!
//! Fetches recent public reports from `signal.conso.gouv.fr`. Single
//! endpoint, no fan-out, no credential: a fetch failure surfaces as the
//! collector's error and the orchestrator records a zero-count run.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::{info, instrument, warn};

use crate::collectors::Collector;
use crate::document::{
    clean_body, external_id, parse_rfc3339_or_now, DataKind, NormalizedDocument,
};
use crate::error::CollectError;
use crate::http;

const API_URL: &str = "https://signal.conso.gouv.fr/api/reports";
const SOURCE_NAME: &str = "SignalConso";

pub struct SignalConsoCollector {
    client: reqwest::Client,
    limit: u32,
}

impl SignalConsoCollector {
    pub fn new(limit: u32) -> Self {
        Self {
            client: http::default_client(),
            limit,
        }
    }
}

/// Map one raw report to a document.
fn map_report(raw: &Value) -> Result<NormalizedDocument, CollectError> {
    let native_id = raw["id"]
        .as_str()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CollectError::payload("report without id"))?;
    let category = raw["category"].as_str().unwrap_or("Inconnu");

    let mut extra = Map::new();
    extra.insert("category".into(), json!(category));
    if let Some(company) = raw["company"]["name"].as_str() {
        extra.insert("company".into(), json!(company));
    }
    if let Some(status) = raw["status"].as_str() {
        extra.insert("status".into(), json!(status));
    }

    Ok(NormalizedDocument {
        external_id: external_id("signalconso", native_id),
        title: format!("Signalement {category}"),
        body_text: clean_body(raw["description"].as_str().unwrap_or_default()),
        url: Some(format!("https://signal.conso.gouv.fr/report/{native_id}")),
        published_at: parse_rfc3339_or_now(raw["creationDate"].as_str()),
        source_name: SOURCE_NAME.to_string(),
        data_kind: DataKind::Api,
        source_specific_fields: extra,
    })
}

#[async_trait]
impl Collector for SignalConsoCollector {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    #[instrument(level = "info", skip_all, fields(limit = self.limit))]
    async fn collect(&self) -> Result<Vec<NormalizedDocument>, CollectError> {
        let body: Value = self
            .client
            .get(API_URL)
            .query(&[
                ("limit", self.limit.to_string()),
                ("offset", "0".to_string()),
                ("sortBy", "creationDate".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let reports = body["reports"]
            .as_array()
            .ok_or_else(|| CollectError::payload("response has no reports array"))?;

        let mut documents = Vec::new();
        for report in reports {
            match map_report(report) {
                Ok(doc) => documents.push(doc),
                Err(e) => warn!(source = SOURCE_NAME, error = %e, "skipping malformed report"),
            }
        }

        info!(source = SOURCE_NAME, count = documents.len(), "collected reports");
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Value {
        json!({
            "id": "d1b2c3",
            "category": "Démarchage abusif",
            "description": "Appels répétés malgré inscription à Bloctel.",
            "creationDate": "2026-02-28T16:20:00+01:00",
            "company": { "name": "Exemple SARL" },
            "status": "TraitementEnCours"
        })
    }

    #[test]
    fn test_map_report_full_record() {
        let doc = map_report(&fixture()).unwrap();
        assert_eq!(doc.external_id, "signalconso_d1b2c3");
        assert_eq!(doc.title, "Signalement Démarchage abusif");
        assert_eq!(doc.url.as_deref(), Some("https://signal.conso.gouv.fr/report/d1b2c3"));
        assert_eq!(doc.published_at.to_rfc3339(), "2026-02-28T15:20:00+00:00");
        assert_eq!(doc.source_specific_fields["company"], json!("Exemple SARL"));
        assert_eq!(doc.data_kind, DataKind::Api);
    }

    #[test]
    fn test_map_report_unknown_category_default() {
        let doc = map_report(&json!({ "id": "x1" })).unwrap();
        assert_eq!(doc.title, "Signalement Inconnu");
        assert_eq!(doc.body_text, "");
    }

    #[test]
    fn test_map_report_without_id_is_an_error() {
        assert!(map_report(&json!({ "category": "Autre" })).is_err());
    }
}
