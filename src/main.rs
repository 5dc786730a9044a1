//! Collection binary: wire configuration into collectors, run one pass,
//! report per-source counts, optionally write the batch as JSON.

use std::error::Error;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

use civicpulse::cli::Cli;
use civicpulse::collectors::{
    datagouv::DataGouvCollector, newsapi::NewsApiCollector, openweather::OpenWeatherCollector,
    reddit::RedditCollector, rss::RssCollector, signalconso::SignalConsoCollector,
    trustpilot::TrustpilotCollector, viepublique::ViePubliqueCollector, youtube::YouTubeCollector,
};
use civicpulse::http::PolitenessGate;
use civicpulse::{Collector, Credentials, Orchestrator};

/// All known source names, in run order.
const ALL_SOURCES: [&str; 9] = [
    "datagouv",
    "newsapi",
    "openweather",
    "reddit",
    "rss",
    "signalconso",
    "trustpilot",
    "viepublique",
    "youtube",
];

fn build_collectors(args: &Cli, credentials: &Credentials) -> Vec<Box<dyn Collector>> {
    let enabled: Vec<String> = match &args.sources {
        Some(list) => list.iter().map(|s| s.to_lowercase()).collect(),
        None => ALL_SOURCES.iter().map(|s| s.to_string()).collect(),
    };
    let gate = Arc::new(PolitenessGate::new());

    let mut collectors: Vec<Box<dyn Collector>> = Vec::new();
    for source in &enabled {
        match source.as_str() {
            "datagouv" => collectors.push(Box::new(DataGouvCollector::new(
                args.query.clone(),
                args.page_size,
            ))),
            "newsapi" => collectors.push(Box::new(NewsApiCollector::new(
                credentials,
                args.query.clone(),
                args.news_sources.clone(),
                args.days_back,
                args.page_size,
            ))),
            "openweather" => collectors.push(Box::new(OpenWeatherCollector::new(
                credentials,
                args.cities.clone(),
            ))),
            "reddit" => collectors.push(Box::new(RedditCollector::new(
                credentials,
                args.subreddits.clone(),
                args.post_limit,
            ))),
            "rss" => collectors.push(Box::new(RssCollector::new(vec![], args.limit_per_feed))),
            "signalconso" => collectors.push(Box::new(SignalConsoCollector::new(args.limit))),
            "trustpilot" => collectors.push(Box::new(TrustpilotCollector::new(
                Arc::clone(&gate),
                args.companies.clone(),
                args.max_reviews,
            ))),
            "viepublique" => collectors.push(Box::new(ViePubliqueCollector::new(
                Arc::clone(&gate),
                args.limit as usize,
            ))),
            "youtube" => collectors.push(Box::new(YouTubeCollector::new(
                credentials,
                args.channels.clone(),
                args.max_videos,
            ))),
            other => warn!(source = %other, "unknown source name; ignoring"),
        }
    }
    collectors
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("civicpulse starting up");

    let args = Cli::parse();
    let credentials = Credentials {
        newsapi_key: args.newsapi_key.clone(),
        openweather_key: args.owm_api_key.clone(),
        reddit_client_id: args.reddit_client_id.clone(),
        reddit_client_secret: args.reddit_client_secret.clone(),
        youtube_key: args.youtube_api_key.clone(),
    };

    let collectors = build_collectors(&args, &credentials);
    info!(count = collectors.len(), "collectors configured");

    let report = Orchestrator::new(collectors).run().await;

    for outcome in &report.outcomes {
        match &outcome.error {
            None => info!(source = outcome.source, count = outcome.count, "source done"),
            Some(reason) => {
                error!(source = outcome.source, %reason, "source contributed 0 documents")
            }
        }
    }
    info!(total = report.total(), "batch assembled");

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&report)?;
        if let Err(e) = tokio::fs::write(path, json).await {
            error!(%path, error = %e, "failed writing batch file");
            return Err(e.into());
        }
        info!(%path, "wrote batch file");
    }

    let elapsed = start_time.elapsed();
    info!(secs = elapsed.as_secs(), millis = elapsed.subsec_millis(), "execution complete");
    Ok(())
}
