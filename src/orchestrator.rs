//! Collection orchestrator: runs a configured set of collectors and
//! aggregates their output into one batch.
//!
//! Collectors share no mutable state and their failure domains are already
//! isolated, so independent collectors run concurrently on a bounded pool.
//! A collector's total failure shrinks the batch and shows up in the run
//! report as a zero-count outcome; it never aborts the run. No retry happens
//! here — a failed source is simply absent until the next scheduled run.

use futures::stream::{self, StreamExt};
use itertools::Itertools;
use serde::Serialize;
use tracing::{error, info, instrument};

use crate::collectors::Collector;
use crate::document::NormalizedDocument;

/// Upper bound on collectors running at once.
pub const DEFAULT_PARALLELISM: usize = 4;

/// Per-source result of one run, the operator-facing signal for
/// "0 documents from source X".
#[derive(Debug, Clone, Serialize)]
pub struct SourceOutcome {
    pub source: &'static str,
    pub count: usize,
    /// Populated when the collector as a whole failed (missing credential,
    /// unreachable endpoint). Sub-target failures never surface here.
    pub error: Option<String>,
}

/// Everything one collection run produced.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub documents: Vec<NormalizedDocument>,
    pub outcomes: Vec<SourceOutcome>,
}

impl RunReport {
    pub fn total(&self) -> usize {
        self.documents.len()
    }
}

pub struct Orchestrator {
    collectors: Vec<Box<dyn Collector>>,
    parallelism: usize,
}

impl Orchestrator {
    pub fn new(collectors: Vec<Box<dyn Collector>>) -> Self {
        Self {
            collectors,
            parallelism: DEFAULT_PARALLELISM,
        }
    }

    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    /// Run every collector and concatenate the results.
    ///
    /// Never fails: each collector's `Err` is logged and recorded as a
    /// zero-count [`SourceOutcome`]. Documents are deduplicated within each
    /// source by `external_id`; cross-source dedup is the persistence
    /// layer's job.
    #[instrument(level = "info", skip_all, fields(collectors = self.collectors.len()))]
    pub async fn run(&self) -> RunReport {
        let results: Vec<(&'static str, Result<Vec<NormalizedDocument>, _>)> =
            stream::iter(self.collectors.iter())
                .map(|collector| async move { (collector.name(), collector.collect().await) })
                .buffer_unordered(self.parallelism)
                .collect()
                .await;

        let mut documents = Vec::new();
        let mut outcomes = Vec::new();
        for (source, result) in results {
            match result {
                Ok(docs) => {
                    let docs: Vec<NormalizedDocument> = docs
                        .into_iter()
                        .unique_by(|d| d.external_id.clone())
                        .collect();
                    info!(%source, count = docs.len(), "source collected");
                    outcomes.push(SourceOutcome {
                        source,
                        count: docs.len(),
                        error: None,
                    });
                    documents.extend(docs);
                }
                Err(e) => {
                    error!(%source, error = %e, "source failed; contributing 0 documents");
                    outcomes.push(SourceOutcome {
                        source,
                        count: 0,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        info!(total = documents.len(), sources = outcomes.len(), "run complete");
        RunReport { documents, outcomes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DataKind, NormalizedDocument};
    use crate::error::CollectError;
    use async_trait::async_trait;
    use chrono::Utc;

    fn doc(id: &str) -> NormalizedDocument {
        NormalizedDocument {
            external_id: id.to_string(),
            title: "t".into(),
            body_text: String::new(),
            url: None,
            published_at: Utc::now(),
            source_name: "Stub".into(),
            data_kind: DataKind::Api,
            source_specific_fields: Default::default(),
        }
    }

    struct HealthySource {
        name: &'static str,
        ids: Vec<&'static str>,
    }

    #[async_trait]
    impl Collector for HealthySource {
        fn name(&self) -> &'static str {
            self.name
        }
        async fn collect(&self) -> Result<Vec<NormalizedDocument>, CollectError> {
            Ok(self.ids.iter().map(|id| doc(id)).collect())
        }
    }

    struct BrokenSource;

    #[async_trait]
    impl Collector for BrokenSource {
        fn name(&self) -> &'static str {
            "Broken"
        }
        async fn collect(&self) -> Result<Vec<NormalizedDocument>, CollectError> {
            Err(CollectError::MissingCredential {
                collector: "Broken",
                key: "BROKEN_KEY",
            })
        }
    }

    #[tokio::test]
    async fn test_run_aggregates_all_sources() {
        let orchestrator = Orchestrator::new(vec![
            Box::new(HealthySource { name: "A", ids: vec!["a_1", "a_2"] }),
            Box::new(HealthySource { name: "B", ids: vec!["b_1"] }),
        ]);
        let report = orchestrator.run().await;
        assert_eq!(report.total(), 3);
        assert!(report.outcomes.iter().all(|o| o.error.is_none()));
    }

    #[tokio::test]
    async fn test_run_isolates_a_failing_source() {
        let orchestrator = Orchestrator::new(vec![
            Box::new(HealthySource { name: "A", ids: vec!["a_1"] }),
            Box::new(BrokenSource),
            Box::new(HealthySource { name: "B", ids: vec!["b_1", "b_2"] }),
        ]);
        let report = orchestrator.run().await;
        assert_eq!(report.total(), 3);

        let broken = report.outcomes.iter().find(|o| o.source == "Broken").unwrap();
        assert_eq!(broken.count, 0);
        assert!(broken.error.as_deref().unwrap().contains("BROKEN_KEY"));
    }

    #[tokio::test]
    async fn test_run_dedups_within_a_source() {
        let orchestrator = Orchestrator::new(vec![Box::new(HealthySource {
            name: "A",
            ids: vec!["a_1", "a_1", "a_2"],
        })]);
        let report = orchestrator.run().await;
        assert_eq!(report.total(), 2);
        assert_eq!(report.outcomes[0].count, 2);
    }

    #[tokio::test]
    async fn test_run_with_no_collectors_is_empty() {
        let report = Orchestrator::new(vec![]).run().await;
        assert_eq!(report.total(), 0);
        assert!(report.outcomes.is_empty());
    }
}
