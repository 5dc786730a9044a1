//! Credential configuration for collectors that need one.
//!
//! Credentials are gathered by the caller (CLI flags or environment) into an
//! explicit [`Credentials`] value and handed to each collector at
//! construction. Nothing here reads the environment on its own, which keeps
//! credential substitution trivial in tests.

use crate::error::CollectError;

/// API credentials for the collectors that require them. Every field is
/// optional; a collector whose credential is absent fails loudly the moment
/// its `collect` is invoked, before any network call.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    /// NewsAPI key (`NEWSAPI_KEY`).
    pub newsapi_key: Option<String>,
    /// OpenWeatherMap key (`OWM_API_KEY`).
    pub openweather_key: Option<String>,
    /// Reddit OAuth client id (`REDDIT_CLIENT_ID`).
    pub reddit_client_id: Option<String>,
    /// Reddit OAuth client secret (`REDDIT_CLIENT_SECRET`).
    pub reddit_client_secret: Option<String>,
    /// YouTube Data API key (`YOUTUBE_API_KEY`).
    pub youtube_key: Option<String>,
}

/// Resolve an optional credential into a value or a diagnosable
/// [`CollectError::MissingCredential`] naming the collector and the key.
pub fn require<'a>(
    value: &'a Option<String>,
    collector: &'static str,
    key: &'static str,
) -> Result<&'a str, CollectError> {
    match value.as_deref() {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(CollectError::MissingCredential { collector, key }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_present() {
        let v = Some("secret".to_string());
        assert_eq!(require(&v, "NewsAPI", "NEWSAPI_KEY").unwrap(), "secret");
    }

    #[test]
    fn test_require_absent_is_attributable() {
        let v: Option<String> = None;
        let err = require(&v, "NewsAPI", "NEWSAPI_KEY").unwrap_err();
        assert!(matches!(
            err,
            CollectError::MissingCredential { collector: "NewsAPI", key: "NEWSAPI_KEY" }
        ));
    }

    #[test]
    fn test_require_empty_string_counts_as_absent() {
        let v = Some(String::new());
        assert!(require(&v, "YouTube", "YOUTUBE_API_KEY").is_err());
    }
}
