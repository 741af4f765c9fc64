pub mod credentials;
pub mod rest;
pub mod types;

use crate::dates;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone};
use regex::Regex;
use scraper::Html;
use std::sync::OnceLock;
use types::Status;

pub const PAGE_LIMIT: usize = 40;
/// Stop paging the home timeline after this many statuses.
pub const MAX_FETCHED: usize = 1000;

#[async_trait]
pub trait TimelineSource: Send + Sync {
    /// One page of the home timeline, newest first, older than `max_id`.
    async fn home_page(&self, max_id: Option<&str>, limit: usize) -> Result<Vec<Status>>;
}

/// Trimmed status text, or an error when nothing is left to post.
pub fn validate_message(raw: &str) -> Result<&str> {
    let text = raw.trim();
    if text.is_empty() {
        anyhow::bail!("message cannot be empty");
    }
    Ok(text)
}

/// Home timeline statuses created on `day` in `tz`, oldest first.
///
/// Pages backwards until a page ends before `day`, the timeline runs out,
/// or `MAX_FETCHED` statuses have been seen.
pub async fn statuses_on_day<Tz: TimeZone>(
    source: &dyn TimelineSource,
    day: NaiveDate,
    tz: &Tz,
) -> Result<Vec<Status>> {
    let mut seen: Vec<Status> = Vec::new();
    let mut max_id: Option<String> = None;

    loop {
        let page = source.home_page(max_id.as_deref(), PAGE_LIMIT).await?;
        let Some(oldest) = page.last() else { break };
        max_id = Some(oldest.id.clone());
        let reached_older = oldest.created_at.with_timezone(tz).date_naive() < day;
        tracing::debug!(count = page.len(), max_id = ?max_id, "fetched timeline page");

        seen.extend(page);
        if reached_older || seen.len() >= MAX_FETCHED {
            break;
        }
    }

    Ok(dates::on_day(seen, day, tz, |s| Some(s.created_at)))
}

fn block_break_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<br\s*/?>|</p>").expect("static regex"))
}

/// Status HTML to a single line of plain text, entities decoded.
pub fn strip_html(content: &str) -> String {
    let spaced = block_break_re().replace_all(content, " ");
    let fragment = Html::parse_fragment(&spaced);
    let text: String = fragment.root_element().text().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `HH:MM @acct: text`, with boosts attributed to the original author.
pub fn render_status<Tz: TimeZone>(status: &Status, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let time = status.created_at.with_timezone(tz).format("%H:%M");
    let (prefix, shown) = match &status.reblog {
        Some(inner) => (format!("boosted @{}: ", inner.account.acct), inner.as_ref()),
        None => (String::new(), status),
    };
    let text = strip_html(&shown.content);
    let text = if text.is_empty() { "[media/no text]".to_string() } else { text };
    format!("{} @{}: {}{}", time, status.account.acct, prefix, text)
}
