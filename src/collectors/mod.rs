//! Source collectors: one adapter per external system.
//!
//! Every collector satisfies the same contract: fetch raw records from one
//! remote source and map them into [`NormalizedDocument`]s. The variants
//! differ only in fetch strategy, pagination semantics, field extraction,
//! and whether they need a credential:
//!
//! | Source | Module | Method | Credential |
//! |--------|--------|--------|------------|
//! | data.gouv.fr | [`datagouv`] | paginated API query | — |
//! | NewsAPI | [`newsapi`] | paginated API query | `NEWSAPI_KEY` |
//! | OpenWeatherMap | [`openweather`] | per-city fan-out | `OWM_API_KEY` |
//! | Reddit | [`reddit`] | per-subreddit fan-out | `REDDIT_CLIENT_ID`/`SECRET` |
//! | RSS feeds | [`rss`] | per-feed fan-out | — |
//! | SignalConso | [`signalconso`] | single API query | — |
//! | Trustpilot | [`trustpilot`] | per-company page scrape | — |
//! | vie-publique.fr | [`viepublique`] | RSS index + page scrape | — |
//! | YouTube | [`youtube`] | per-channel fan-out | `YOUTUBE_API_KEY` |
//!
//! # Failure isolation
//!
//! Fan-out collectors catch every per-sub-target failure (HTTP error,
//! timeout, malformed payload), log it with the sub-target identity, and
//! move on; partial success is the normal outcome. Single-endpoint
//! collectors return `Err` on fetch failure and let the orchestrator absorb
//! it. A malformed individual record is skipped at record granularity.
//!
//! # Politeness
//!
//! The two HTML-scraping collectors ([`trustpilot`], [`viepublique`]) route
//! every page fetch through a [`PolitenessGate`](crate::http::PolitenessGate);
//! API collectors make no artificial delay.

use async_trait::async_trait;

use crate::document::NormalizedDocument;
use crate::error::CollectError;

pub mod datagouv;
pub mod newsapi;
pub mod openweather;
pub mod reddit;
pub mod rss;
pub mod signalconso;
pub mod trustpilot;
pub mod viepublique;
pub mod youtube;

/// The single capability every source adapter exposes.
///
/// Parameters and credentials are fixed at construction; `collect` performs
/// one collection pass and owns all of its error handling except for the
/// configuration and total-failure cases described on [`CollectError`].
#[async_trait]
pub trait Collector: Send + Sync {
    /// Short human-readable source name used in logs and run reports.
    fn name(&self) -> &'static str;

    /// Fetch and normalize one batch of documents.
    async fn collect(&self) -> Result<Vec<NormalizedDocument>, CollectError>;
}
