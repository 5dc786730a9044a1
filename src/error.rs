//! Error taxonomy for the collection layer.
//!
//! Collectors return `Result<Vec<NormalizedDocument>, CollectError>`; the
//! orchestrator consumes the `Err` arm and turns it into a zero-count
//! outcome, so no error here ever crosses the orchestrator boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollectError {
    /// A required credential was not configured. Raised before any network
    /// call is attempted — an operator error, not a transient fault.
    #[error("{collector} requires the {key} credential, which is not configured")]
    MissingCredential {
        collector: &'static str,
        key: &'static str,
    },

    /// Transport-level failure: connection error, timeout, or non-2xx status.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A feed could not be deserialized as RSS XML.
    #[error("feed parse failed: {0}")]
    Feed(#[from] quick_xml::DeError),

    /// A payload did not have the shape the mapper expects.
    #[error("unexpected payload shape: {0}")]
    Payload(String),
}

impl CollectError {
    pub fn payload(msg: impl Into<String>) -> Self {
        CollectError::Payload(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_names_collector_and_key() {
        let e = CollectError::MissingCredential {
            collector: "NewsAPI",
            key: "NEWSAPI_KEY",
        };
        let msg = e.to_string();
        assert!(msg.contains("NewsAPI"));
        assert!(msg.contains("NEWSAPI_KEY"));
    }

    #[test]
    fn test_payload_message() {
        let e = CollectError::payload("articles is not an array");
        assert!(e.to_string().contains("articles is not an array"));
    }
}
