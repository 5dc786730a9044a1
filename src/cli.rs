//! Command-line interface for the collection binary.
//!
//! Credentials come from the environment (or flags) and are handed to the
//! collectors through an explicit [`Credentials`](crate::config::Credentials)
//! value; nothing reads the environment after startup.

use clap::Parser;

/// Collect documents from the configured public-data sources and print (or
/// write) the normalized batch.
///
/// # Examples
///
/// ```sh
/// # Run every source with defaults, write the batch to a file
/// civicpulse --output ./batch.json
///
/// # Run only the keyless sources
/// civicpulse --sources datagouv,rss,signalconso
///
/// # Weather for specific cities
/// civicpulse --sources openweather --cities "Paris,FR" --cities "Lille,FR"
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Comma-separated list of sources to run (datagouv, newsapi,
    /// openweather, reddit, rss, signalconso, trustpilot, viepublique,
    /// youtube). Default: all of them.
    #[arg(long, value_delimiter = ',')]
    pub sources: Option<Vec<String>>,

    /// Optional path for the JSON batch file; omit to only log counts
    #[arg(short, long)]
    pub output: Option<String>,

    /// Search keyword for the data.gouv.fr and NewsAPI queries
    #[arg(long, default_value = "France")]
    pub query: String,

    /// Result page size for the catalog and news queries
    #[arg(long, default_value_t = 100)]
    pub page_size: u32,

    /// NewsAPI: comma-separated outlet allowlist (e.g. "bbc-news,cnn")
    #[arg(long)]
    pub news_sources: Option<String>,

    /// NewsAPI: how many days back to search
    #[arg(long, default_value_t = 7)]
    pub days_back: i64,

    /// OpenWeatherMap: "City,CountryCode" targets (repeatable)
    #[arg(long)]
    pub cities: Vec<String>,

    /// Reddit: subreddit names (repeatable)
    #[arg(long)]
    pub subreddits: Vec<String>,

    /// Reddit: posts per subreddit
    #[arg(long, default_value_t = 100)]
    pub post_limit: u32,

    /// RSS: entries per feed
    #[arg(long, default_value_t = 50)]
    pub limit_per_feed: usize,

    /// SignalConso / vie-publique.fr: result limit
    #[arg(long, default_value_t = 100)]
    pub limit: u32,

    /// Trustpilot: company slugs (repeatable)
    #[arg(long)]
    pub companies: Vec<String>,

    /// Trustpilot: reviews per company
    #[arg(long, default_value_t = 50)]
    pub max_reviews: usize,

    /// YouTube: channel ids (repeatable)
    #[arg(long)]
    pub channels: Vec<String>,

    /// YouTube: videos per channel
    #[arg(long, default_value_t = 50)]
    pub max_videos: u32,

    /// NewsAPI key
    #[arg(long, env = "NEWSAPI_KEY", hide_env_values = true)]
    pub newsapi_key: Option<String>,

    /// OpenWeatherMap key
    #[arg(long, env = "OWM_API_KEY", hide_env_values = true)]
    pub owm_api_key: Option<String>,

    /// Reddit OAuth client id
    #[arg(long, env = "REDDIT_CLIENT_ID", hide_env_values = true)]
    pub reddit_client_id: Option<String>,

    /// Reddit OAuth client secret
    #[arg(long, env = "REDDIT_CLIENT_SECRET", hide_env_values = true)]
    pub reddit_client_secret: Option<String>,

    /// YouTube Data API key
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    pub youtube_api_key: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["civicpulse"]);
        assert_eq!(cli.query, "France");
        assert_eq!(cli.page_size, 100);
        assert_eq!(cli.limit_per_feed, 50);
        assert!(cli.sources.is_none());
        assert!(cli.output.is_none());
    }

    #[test]
    fn test_cli_source_list_is_split_on_commas() {
        let cli = Cli::parse_from(["civicpulse", "--sources", "rss,datagouv"]);
        assert_eq!(cli.sources.unwrap(), vec!["rss", "datagouv"]);
    }

    #[test]
    fn test_cli_repeatable_targets() {
        let cli = Cli::parse_from([
            "civicpulse",
            "--cities",
            "Paris,FR",
            "--cities",
            "Lille,FR",
            "--companies",
            "sncf",
        ]);
        assert_eq!(cli.cities, vec!["Paris,FR", "Lille,FR"]);
        assert_eq!(cli.companies, vec!["sncf"]);
    }
}
