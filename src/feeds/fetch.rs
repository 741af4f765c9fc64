use super::{FeedEntry, Subscription};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use reqwest::Client;

const ACCEPT_FEEDS: &str = "application/rss+xml, application/atom+xml, application/xml, text/xml, */*";

/// Download one subscription and parse its entries.
pub async fn fetch_entries(client: &Client, sub: &Subscription) -> Result<Vec<FeedEntry>> {
    let resp = client
        .get(&sub.url)
        .header(reqwest::header::ACCEPT, ACCEPT_FEEDS)
        .send()
        .await
        .with_context(|| format!("GET {} failed", sub.url))?;
    let status = resp.status();
    if !status.is_success() {
        anyhow::bail!("GET {} failed ({})", sub.url, status);
    }
    let body = resp.bytes().await.context("failed to read feed body")?;
    parse_feed(&body, &sub.title)
}

/// Parse RSS 2.0 or Atom. Entries are named after the feed's own title,
/// or `fallback_name` when it has none.
pub fn parse_feed(body: &[u8], fallback_name: &str) -> Result<Vec<FeedEntry>> {
    let rss_err = match rss::Channel::read_from(body) {
        Ok(channel) => return Ok(from_rss(&channel, fallback_name)),
        Err(e) => e,
    };
    match atom_syndication::Feed::read_from(body) {
        Ok(feed) => Ok(from_atom(&feed, fallback_name)),
        Err(atom_err) => anyhow::bail!("neither RSS ({}) nor Atom ({})", rss_err, atom_err),
    }
}

fn feed_name(own: &str, fallback: &str) -> String {
    let own = own.trim();
    if own.is_empty() { fallback.to_string() } else { own.to_string() }
}

fn from_rss(channel: &rss::Channel, fallback_name: &str) -> Vec<FeedEntry> {
    let feed = feed_name(channel.title(), fallback_name);
    channel
        .items()
        .iter()
        .map(|item| {
            let published = item.pub_date().and_then(parse_date).or_else(|| {
                item.dublin_core_ext()
                    .and_then(|dc| dc.dates().first())
                    .and_then(|d| parse_date(d))
            });
            let link = item
                .link()
                .map(str::to_string)
                .or_else(|| item.guid().filter(|g| g.is_permalink()).map(|g| g.value().to_string()))
                .unwrap_or_default();
            FeedEntry {
                title: item.title().unwrap_or("(untitled)").trim().to_string(),
                link,
                feed: feed.clone(),
                published,
            }
        })
        .collect()
}

fn from_atom(atom: &atom_syndication::Feed, fallback_name: &str) -> Vec<FeedEntry> {
    let feed = feed_name(&atom.title().value, fallback_name);
    atom.entries()
        .iter()
        .map(|entry| {
            let link = entry
                .links()
                .iter()
                .find(|l| l.rel() == "alternate")
                .or_else(|| entry.links().first())
                .map(|l| l.href().to_string())
                .unwrap_or_default();
            let published = entry.published().unwrap_or_else(|| entry.updated());
            let title = entry.title().value.trim();
            FeedEntry {
                title: if title.is_empty() { "(untitled)".to_string() } else { title.to_string() },
                link,
                feed: feed.clone(),
                published: Some(published.with_timezone(&Utc)),
            }
        })
        .collect()
}

/// Publish dates seen in the wild: RFC 822/2822, RFC 3339, and bare
/// `YYYY-MM-DD[ HH:MM:SS]` taken as UTC.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|n| n.and_utc())
}
