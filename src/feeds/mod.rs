pub mod fetch;
pub mod opml;

use crate::cli::truncate_chars;
use crate::dates;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use reqwest::Client;
use std::fmt;

/// One `xmlUrl` outline of a subscription list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub title: String,
    pub url: String,
    pub website: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub feed: String,
    pub published: Option<DateTime<Utc>>,
}

/// Result of reading every subscription for one day.
#[derive(Debug, Default)]
pub struct DayDigest {
    pub entries: Vec<FeedEntry>,
    /// Subscriptions that could not be fetched or parsed.
    pub failed: Vec<String>,
}

/// Fetch subscriptions one after another and keep the entries published on
/// `day` in `tz`, oldest first. A broken feed is logged and skipped.
pub async fn read_day<Tz: TimeZone>(client: &Client, subs: &[Subscription], day: NaiveDate, tz: &Tz) -> DayDigest {
    let mut all = Vec::new();
    let mut failed = Vec::new();

    for sub in subs {
        match fetch::fetch_entries(client, sub).await {
            Ok(entries) => {
                tracing::debug!(feed = %sub.title, count = entries.len(), "fetched feed");
                all.extend(entries);
            }
            Err(e) => {
                tracing::warn!(feed = %sub.title, url = %sub.url, error = %format!("{:#}", e), "feed skipped");
                failed.push(sub.title.clone());
            }
        }
    }

    DayDigest {
        entries: dates::on_day(all, day, tz, |e| e.published),
        failed,
    }
}

pub fn render_subscriptions(subs: &[Subscription]) -> String {
    SubscriptionList(subs).to_string()
}

struct SubscriptionList<'a>(&'a [Subscription]);

impl fmt::Display for SubscriptionList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No feeds found in the subscription file.");
        }
        writeln!(f, "Found {} feeds:", self.0.len())?;
        writeln!(f, "{}", "-".repeat(50))?;
        for (i, sub) in self.0.iter().enumerate() {
            writeln!(f, "{:3}. {}", i + 1, sub.title)?;
            writeln!(f, "     URL: {}", sub.url)?;
            if let Some(site) = &sub.website {
                writeln!(f, "     Site: {}", site)?;
            }
            if let Some(desc) = &sub.description {
                writeln!(f, "     Description: {}", desc)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// `HH:MM [feed] title` plus the link on the next line.
pub fn render_entries<Tz: TimeZone>(entries: &[FeedEntry], tz: &Tz) -> String
where
    Tz::Offset: fmt::Display,
{
    EntryList { entries, tz }.to_string()
}

struct EntryList<'a, Tz: TimeZone> {
    entries: &'a [FeedEntry],
    tz: &'a Tz,
}

impl<Tz: TimeZone> fmt::Display for EntryList<'_, Tz>
where
    Tz::Offset: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in self.entries {
            let time = entry
                .published
                .map(|p| p.with_timezone(self.tz).format("%H:%M").to_string())
                .unwrap_or_else(|| "--:--".to_string());
            writeln!(f, "{} [{}] {}", time, truncate_chars(&entry.feed, 30), entry.title)?;
            if !entry.link.is_empty() {
                writeln!(f, "      {}", entry.link)?;
            }
        }
        Ok(())
    }
}
