//! OpenWeatherMap collector.
//!
//! Fans out over a list of `"City,CountryCode"` identifiers and fetches the
//! current conditions for each. One unreachable or unknown city is logged
//! and skipped; the remaining cities still produce documents. Requires
//! `OWM_API_KEY`.
//!
//! The document id is `owm_<city-id>_<dt>`, where `dt` is the measurement
//! timestamp from the payload, so mapping the same reading twice yields the
//! same id.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::{info, instrument, warn};

use crate::collectors::Collector;
use crate::config::{require, Credentials};
use crate::document::{external_id, from_unix_or_now, DataKind, NormalizedDocument};
use crate::error::CollectError;
use crate::http;

const API_URL: &str = "https://api.openweathermap.org/data/2.5";
const SOURCE_NAME: &str = "OpenWeatherMap";

/// Default target cities when the caller supplies none.
pub const DEFAULT_CITIES: [&str; 5] =
    ["Paris,FR", "Lyon,FR", "Marseille,FR", "Toulouse,FR", "Nice,FR"];

pub struct OpenWeatherCollector {
    client: reqwest::Client,
    api_key: Option<String>,
    cities: Vec<String>,
}

impl OpenWeatherCollector {
    pub fn new(credentials: &Credentials, cities: Vec<String>) -> Self {
        let cities = if cities.is_empty() {
            DEFAULT_CITIES.iter().map(|c| c.to_string()).collect()
        } else {
            cities
        };
        Self {
            client: http::default_client(),
            api_key: credentials.openweather_key.clone(),
            cities,
        }
    }
}

/// Map one current-conditions payload to a document.
fn map_reading(raw: &Value) -> Result<NormalizedDocument, CollectError> {
    let city_id = raw["id"]
        .as_i64()
        .ok_or_else(|| CollectError::payload("reading without city id"))?;
    let city = raw["name"]
        .as_str()
        .ok_or_else(|| CollectError::payload("reading without city name"))?;
    let main = raw["main"]
        .as_object()
        .ok_or_else(|| CollectError::payload("reading without main block"))?;
    let temp = main
        .get("temp")
        .and_then(Value::as_f64)
        .ok_or_else(|| CollectError::payload("reading without temperature"))?;
    let description = raw["weather"][0]["description"].as_str().unwrap_or("n/a");
    let measured_at = raw["dt"]
        .as_i64()
        .ok_or_else(|| CollectError::payload("reading without dt timestamp"))?;

    let mut extra = Map::new();
    extra.insert("city".into(), json!(city));
    if let Some(country) = raw["sys"]["country"].as_str() {
        extra.insert("country".into(), json!(country));
    }
    extra.insert("temperature".into(), json!(temp));
    if let Some(feels) = main.get("feels_like").and_then(Value::as_f64) {
        extra.insert("feels_like".into(), json!(feels));
    }
    if let Some(humidity) = main.get("humidity").and_then(Value::as_f64) {
        extra.insert("humidity".into(), json!(humidity));
    }
    if let Some(pressure) = main.get("pressure").and_then(Value::as_f64) {
        extra.insert("pressure".into(), json!(pressure));
    }
    if let Some(wind) = raw["wind"]["speed"].as_f64() {
        extra.insert("wind_speed".into(), json!(wind));
    }
    extra.insert("description".into(), json!(description));

    Ok(NormalizedDocument {
        external_id: external_id("owm", &format!("{city_id}_{measured_at}")),
        title: format!("Météo {city}"),
        body_text: format!("{description} - {temp}°C"),
        url: None,
        published_at: from_unix_or_now(measured_at),
        source_name: SOURCE_NAME.to_string(),
        data_kind: DataKind::Api,
        source_specific_fields: extra,
    })
}

#[async_trait]
impl Collector for OpenWeatherCollector {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    #[instrument(level = "info", skip_all, fields(cities = self.cities.len()))]
    async fn collect(&self) -> Result<Vec<NormalizedDocument>, CollectError> {
        let api_key = require(&self.api_key, SOURCE_NAME, "OWM_API_KEY")?;

        let mut documents = Vec::new();
        for city in &self.cities {
            let result = async {
                let raw: Value = self
                    .client
                    .get(format!("{API_URL}/weather"))
                    .query(&[
                        ("q", city.as_str()),
                        ("appid", api_key),
                        ("units", "metric"),
                        ("lang", "fr"),
                    ])
                    .send()
                    .await?
                    .error_for_status()?
                    .json()
                    .await?;
                map_reading(&raw)
            }
            .await;

            match result {
                Ok(doc) => documents.push(doc),
                Err(e) => warn!(source = SOURCE_NAME, %city, error = %e, "city skipped"),
            }
        }

        info!(source = SOURCE_NAME, count = documents.len(), "collected weather readings");
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paris_fixture() -> Value {
        json!({
            "id": 2988507,
            "name": "Paris",
            "dt": 1767258000,
            "sys": { "country": "FR" },
            "main": { "temp": 12.5, "feels_like": 11.2, "humidity": 71.0, "pressure": 1015.0 },
            "wind": { "speed": 4.6 },
            "weather": [{ "description": "ciel dégagé" }]
        })
    }

    #[test]
    fn test_map_reading_paris() {
        let doc = map_reading(&paris_fixture()).unwrap();
        assert_eq!(doc.external_id, "owm_2988507_1767258000");
        assert_eq!(doc.title, "Météo Paris");
        assert_eq!(doc.body_text, "ciel dégagé - 12.5°C");
        assert_eq!(doc.published_at.timestamp(), 1767258000);
        assert_eq!(doc.source_specific_fields["temperature"], json!(12.5));
        assert_eq!(doc.source_specific_fields["humidity"], json!(71.0));
        assert_eq!(doc.source_specific_fields["country"], json!("FR"));
    }

    #[test]
    fn test_map_reading_deterministic_id() {
        let a = map_reading(&paris_fixture()).unwrap();
        let b = map_reading(&paris_fixture()).unwrap();
        assert_eq!(a.external_id, b.external_id);
    }

    #[test]
    fn test_map_reading_garbage_payload_is_an_error() {
        // Shape an unknown-city error response takes.
        let err = map_reading(&json!({ "cod": "404", "message": "city not found" }));
        assert!(err.is_err());
    }

    #[test]
    fn test_map_reading_missing_wind_still_maps() {
        let mut raw = paris_fixture();
        raw.as_object_mut().unwrap().remove("wind");
        let doc = map_reading(&raw).unwrap();
        assert!(!doc.source_specific_fields.contains_key("wind_speed"));
    }

    #[tokio::test]
    async fn test_collect_without_key_fails_before_network() {
        let collector = OpenWeatherCollector::new(&Credentials::default(), vec![]);
        let err = collector.collect().await.unwrap_err();
        assert!(matches!(
            err,
            CollectError::MissingCredential { collector: "OpenWeatherMap", key: "OWM_API_KEY" }
        ));
    }

    #[test]
    fn test_default_cities_applied() {
        let collector = OpenWeatherCollector::new(&Credentials::default(), vec![]);
        assert_eq!(collector.cities.len(), DEFAULT_CITIES.len());
    }
}
