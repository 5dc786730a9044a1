//! Shared HTTP plumbing: the default client and the per-host politeness gate.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::debug;
use url::Url;

/// Timeout applied to every outbound request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Minimum pause between sequential scraping requests to the same host.
pub const POLITENESS_DELAY: Duration = Duration::from_secs(2);

const USER_AGENT: &str = concat!("civicpulse/", env!("CARGO_PKG_VERSION"));

/// Build the client every collector uses: explicit timeout, crate user agent.
///
/// A call that exceeds [`REQUEST_TIMEOUT`] surfaces as a plain request error
/// and is handled like any other fetch failure.
pub fn default_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .expect("reqwest client construction")
}

/// Per-host minimum-interval gate for scraping collectors.
///
/// Scrapers call [`PolitenessGate::wait`] before each page fetch; the gate
/// sleeps until at least [`POLITENESS_DELAY`] has passed since the previous
/// request to the same host. Requests to different hosts never wait on each
/// other, so this is not a global lock. API-based collectors do not use the
/// gate at all and rely on the remote service's own rate limits.
#[derive(Debug, Default)]
pub struct PolitenessGate {
    last_request: Mutex<HashMap<String, Instant>>,
}

impl PolitenessGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until a request to `url`'s host is polite, then record it.
    pub async fn wait(&self, url: &str) {
        let Some(host) = Url::parse(url).ok().and_then(|u| u.host_str().map(String::from))
        else {
            return;
        };

        loop {
            let wait_for = {
                let mut last = self.last_request.lock().await;
                match last.get(&host) {
                    Some(prev) => {
                        let elapsed = prev.elapsed();
                        if elapsed >= POLITENESS_DELAY {
                            last.insert(host.clone(), Instant::now());
                            None
                        } else {
                            Some(POLITENESS_DELAY - elapsed)
                        }
                    }
                    None => {
                        last.insert(host.clone(), Instant::now());
                        None
                    }
                }
            };
            match wait_for {
                None => return,
                Some(d) => {
                    debug!(%host, delay_ms = d.as_millis() as u64, "politeness gate waiting");
                    sleep(d).await;
                }
            }
        }
    }
}
