//! # civicpulse
//!
//! Multi-source collection and normalization of public data. Nine source
//! collectors (open-data catalog, news API, weather API, Reddit, RSS feeds,
//! consumer complaints, review scraping, government news, YouTube) each map
//! their remote payloads into one shared [`NormalizedDocument`] schema; the
//! [`Orchestrator`] runs a configured set of them, isolates failures per
//! source and per sub-target, and hands the aggregated batch to the caller.
//!
//! This crate persists nothing and schedules nothing: callers supply
//! configuration and own whatever happens to the documents afterwards.
//! Downstream storage is expected to deduplicate on `external_id`.

pub mod cli;
pub mod collectors;
pub mod config;
pub mod document;
pub mod error;
pub mod http;
pub mod orchestrator;

pub use collectors::Collector;
pub use config::Credentials;
pub use document::{DataKind, NormalizedDocument};
pub use error::CollectError;
pub use orchestrator::{Orchestrator, RunReport, SourceOutcome};
