//! Per-commit line statistics and their totals.

use crate::cli::truncate_chars;
use crate::github::types::CommitDetail;
use crate::github::CommitSource;
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::fmt;

const RULE_WIDTH: usize = 80;
const MESSAGE_WIDTH: usize = 40;

#[derive(Debug, Clone, PartialEq)]
pub struct CommitRecord {
    pub sha: String,
    pub date: Option<DateTime<Utc>>,
    pub additions: u64,
    pub deletions: u64,
    /// Length of the commit's `files` list. GitHub caps that list at 300
    /// entries, so larger commits are undercounted.
    pub files_changed: u64,
    /// Files in the repository at this commit, when requested and available.
    pub tree_files: Option<usize>,
    /// First line of the commit message.
    pub message: String,
}

impl CommitRecord {
    pub fn from_detail(detail: &CommitDetail) -> Self {
        let stats = detail.stats.clone().unwrap_or_default();
        Self {
            sha: detail.sha.clone(),
            date: detail.commit.author.as_ref().map(|a| a.date),
            additions: stats.additions,
            deletions: stats.deletions,
            files_changed: detail.files.len() as u64,
            tree_files: None,
            message: detail.commit.message.lines().next().unwrap_or("").to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitTotals {
    pub additions: u64,
    pub deletions: u64,
    pub files_changed: u64,
}

impl CommitTotals {
    pub fn from_records(records: &[CommitRecord]) -> Self {
        records.iter().fold(Self::default(), |acc, r| Self {
            additions: acc.additions + r.additions,
            deletions: acc.deletions + r.deletions,
            files_changed: acc.files_changed + r.files_changed,
        })
    }

    pub fn net(&self) -> i64 {
        self.additions as i64 - self.deletions as i64
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CollectOptions {
    pub max_commits: Option<usize>,
    pub tree_files: bool,
}

/// Fetch details for every commit, one request at a time, in listing order.
pub async fn collect_records(source: &dyn CommitSource, options: CollectOptions) -> Result<Vec<CommitRecord>> {
    let mut commits = source.list_commits(options.max_commits).await?;
    if let Some(max) = options.max_commits {
        commits.truncate(max);
    }
    tracing::info!(count = commits.len(), "collecting commit stats");

    let mut records = Vec::with_capacity(commits.len());
    for summary in &commits {
        let detail = source.commit_detail(&summary.sha).await?;
        let mut record = CommitRecord::from_detail(&detail);
        if options.tree_files {
            record.tree_files = source.tree_file_count(&summary.sha).await;
        }
        records.push(record);
    }
    Ok(records)
}

/// Table of commits followed by totals.
pub fn render_report(records: &[CommitRecord], show_tree_files: bool) -> String {
    Report { records, show_tree_files }.to_string()
}

struct Report<'a> {
    records: &'a [CommitRecord],
    show_tree_files: bool,
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let totals = CommitTotals::from_records(self.records);

        writeln!(f, "{}", "=".repeat(RULE_WIDTH))?;
        write!(f, "{:<10} {:<19} {:>8} {:>8} {:>6} ", "SHA", "Date", "Added", "Removed", "Files")?;
        if self.show_tree_files {
            write!(f, "{:>6} ", "Tree")?;
        }
        writeln!(f, "Message")?;
        writeln!(f, "{}", "-".repeat(RULE_WIDTH))?;

        for r in self.records {
            let date = r
                .date
                .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string());
            write!(
                f,
                "{:<10} {:<19} {:>8} {:>8} {:>6} ",
                truncate_chars(&r.sha, 7),
                date,
                r.additions,
                r.deletions,
                r.files_changed
            )?;
            if self.show_tree_files {
                let tree = r.tree_files.map(|n| n.to_string()).unwrap_or_else(|| "N/A".to_string());
                write!(f, "{:>6} ", tree)?;
            }
            writeln!(f, "{}", truncate_chars(&r.message, MESSAGE_WIDTH))?;
        }

        writeln!(f, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(f, "Commits:        {}", self.records.len())?;
        writeln!(f, "Lines added:    {}", totals.additions)?;
        writeln!(f, "Lines removed:  {}", totals.deletions)?;
        writeln!(f, "Files changed:  {}", totals.files_changed)?;
        writeln!(f, "Net change:     {:+}", totals.net())
    }
}
