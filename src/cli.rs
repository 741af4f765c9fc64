//! Plumbing shared by the binaries: logging, HTTP client, output helpers.

use crate::config::HttpConfig;
use anyhow::{Context, Result};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Log to stderr so reports on stdout stay clean. `RUST_LOG` overrides.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("scripts=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub fn http_client(config: &HttpConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_s))
        .pool_max_idle_per_host(4)
        .build()
        .context("failed to build HTTP client")
}

/// Client for long transfers: only connecting is bounded, the body may
/// take as long as it needs.
pub fn upload_client(config: &HttpConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(Duration::from_secs(config.timeout_s))
        .build()
        .context("failed to build HTTP client")
}

/// Replace every argument equal to `from` with `to`. Lets a binary keep a
/// multi-letter single-dash flag such as `-hq` that clap cannot express.
pub fn rewrite_flag<I>(args: I, from: &str, to: &str) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    args.into_iter()
        .map(|a| if a == from { to.to_string() } else { a })
        .collect()
}

/// Cut `text` to at most `max` characters, never splitting a char.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
