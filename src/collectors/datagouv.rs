//! data.gouv.fr open-data catalog collector.
//!
//! Queries the official catalog API (`/api/1/datasets/`) for recent datasets
//! matching a keyword and normalizes the dataset metadata. No credential is
//! required.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::{info, instrument, warn};

use crate::collectors::Collector;
use crate::document::{
    clean_body, external_id, parse_rfc3339_or_now, title_or_default, DataKind, NormalizedDocument,
};
use crate::error::CollectError;
use crate::http;

const API_URL: &str = "https://www.data.gouv.fr/api/1";
const SOURCE_NAME: &str = "Data.gouv.fr";

pub struct DataGouvCollector {
    client: reqwest::Client,
    query: String,
    page_size: u32,
}

impl DataGouvCollector {
    pub fn new(query: impl Into<String>, page_size: u32) -> Self {
        Self {
            client: http::default_client(),
            query: query.into(),
            page_size,
        }
    }
}

/// Map one raw dataset record to a document. Pure; tested on fixtures.
fn map_dataset(raw: &Value) -> Result<NormalizedDocument, CollectError> {
    let native_id = raw["id"]
        .as_str()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CollectError::payload("dataset without id"))?;

    let mut extra = Map::new();
    if let Some(org) = raw["organization"]["name"].as_str() {
        extra.insert("organization".into(), json!(org));
    }
    if let Some(resources) = raw["resources"].as_array() {
        extra.insert("resource_count".into(), json!(resources.len()));
    }
    if let Some(freq) = raw["frequency"].as_str() {
        extra.insert("frequency".into(), json!(freq));
    }
    if let Some(tags) = raw["tags"].as_array() {
        extra.insert("tags".into(), Value::Array(tags.clone()));
    }

    Ok(NormalizedDocument {
        external_id: external_id("datagouv", native_id),
        title: title_or_default(raw["title"].as_str()),
        body_text: clean_body(raw["description"].as_str().unwrap_or_default()),
        url: raw["page"].as_str().map(String::from),
        published_at: parse_rfc3339_or_now(raw["created_at"].as_str()),
        source_name: SOURCE_NAME.to_string(),
        data_kind: DataKind::Api,
        source_specific_fields: extra,
    })
}

#[async_trait]
impl Collector for DataGouvCollector {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    #[instrument(level = "info", skip_all, fields(query = %self.query))]
    async fn collect(&self) -> Result<Vec<NormalizedDocument>, CollectError> {
        let body: Value = self
            .client
            .get(format!("{API_URL}/datasets/"))
            .query(&[
                ("q", self.query.as_str()),
                ("page_size", &self.page_size.to_string()),
                ("sort", "-created"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let datasets = body["data"]
            .as_array()
            .ok_or_else(|| CollectError::payload("datasets response has no data array"))?;

        let mut documents = Vec::new();
        for dataset in datasets {
            match map_dataset(dataset) {
                Ok(doc) => documents.push(doc),
                Err(e) => warn!(source = SOURCE_NAME, error = %e, "skipping malformed dataset"),
            }
        }

        info!(source = SOURCE_NAME, count = documents.len(), "collected datasets");
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Value {
        json!({
            "id": "5f4c9e",
            "title": "Qualité de l'air en Île-de-France",
            "description": "Mesures horaires des stations de surveillance.",
            "page": "https://www.data.gouv.fr/fr/datasets/qualite-air",
            "created_at": "2026-02-10T09:15:00+00:00",
            "organization": { "name": "Airparif" },
            "resources": [{}, {}, {}],
            "frequency": "hourly",
            "tags": ["air", "pollution"]
        })
    }

    #[test]
    fn test_map_dataset_full_record() {
        let doc = map_dataset(&fixture()).unwrap();
        assert_eq!(doc.external_id, "datagouv_5f4c9e");
        assert_eq!(doc.title, "Qualité de l'air en Île-de-France");
        assert_eq!(doc.url.as_deref(), Some("https://www.data.gouv.fr/fr/datasets/qualite-air"));
        assert_eq!(doc.data_kind, DataKind::Api);
        assert_eq!(doc.source_specific_fields["organization"], json!("Airparif"));
        assert_eq!(doc.source_specific_fields["resource_count"], json!(3));
        assert_eq!(doc.source_specific_fields["tags"], json!(["air", "pollution"]));
    }

    #[test]
    fn test_map_dataset_missing_optionals_default() {
        let doc = map_dataset(&json!({ "id": "abc" })).unwrap();
        assert_eq!(doc.title, "Untitled");
        assert_eq!(doc.body_text, "");
        assert_eq!(doc.url, None);
        assert!(doc.source_specific_fields.is_empty());
    }

    #[test]
    fn test_map_dataset_without_id_is_an_error() {
        assert!(map_dataset(&json!({ "title": "no id" })).is_err());
    }

    #[test]
    fn test_map_dataset_deterministic_id() {
        let a = map_dataset(&fixture()).unwrap();
        let b = map_dataset(&fixture()).unwrap();
        assert_eq!(a.external_id, b.external_id);
    }
}
