pub mod rest;
pub mod types;

use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;
use std::future::Future;
use std::sync::OnceLock;
use types::{CommitDetail, CommitSummary};

/// Largest page the commits endpoint returns.
pub const MAX_PER_PAGE: usize = 100;

/// Where commit data comes from. `rest::GithubRest` talks to the API; tests
/// substitute an in-memory source.
#[async_trait]
pub trait CommitSource: Send + Sync {
    /// Commits newest first, at most `limit` of them when given.
    async fn list_commits(&self, limit: Option<usize>) -> Result<Vec<CommitSummary>>;
    async fn commit_detail(&self, sha: &str) -> Result<CommitDetail>;
    /// Files in the repository tree at `sha`. `None` when unavailable
    /// (large repositories hit the recursive tree limit).
    async fn tree_file_count(&self, sha: &str) -> Option<usize>;
}

/// Drive a page-numbered listing. `fetch_page(page, per_page)` is called
/// with pages counted from 1 until a page comes back short (or empty) or
/// `limit` items have been collected. With a limit below one full page,
/// only that many items are requested.
pub async fn paginate<T, F, Fut>(limit: Option<usize>, mut fetch_page: F) -> Result<Vec<T>>
where
    F: FnMut(u32, usize) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    let per_page = limit.map_or(MAX_PER_PAGE, |l| l.min(MAX_PER_PAGE));
    let mut all = Vec::new();
    if per_page == 0 {
        return Ok(all);
    }

    let mut page = 1;
    loop {
        let batch = fetch_page(page, per_page).await?;
        let short = batch.len() < per_page;
        tracing::debug!(page, count = batch.len(), "fetched page");
        all.extend(batch);
        if let Some(limit) = limit {
            if all.len() >= limit {
                all.truncate(limit);
                break;
            }
        }
        if short {
            break;
        }
        page += 1;
    }
    Ok(all)
}

/// Owner and repository name, as in `owner/repo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

fn repo_url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"github\.com[/:]([^/\s]+)/([^/\s?#]+)").expect("static regex"))
}

/// Extract owner and repository from a GitHub URL. Accepts https and ssh
/// forms, a trailing `.git`, and extra path segments.
pub fn parse_repo_url(url: &str) -> Result<RepoRef> {
    let caps = repo_url_re()
        .captures(url)
        .ok_or_else(|| anyhow::anyhow!("not a GitHub repository URL: {}", url))?;
    let owner = caps[1].to_string();
    let name = caps[2].trim_end_matches(".git").to_string();
    if name.is_empty() {
        anyhow::bail!("not a GitHub repository URL: {}", url);
    }
    Ok(RepoRef { owner, name })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(owner: &str, name: &str) -> RepoRef {
        RepoRef {
            owner: owner.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_parse_repo_url_variants() {
        assert_eq!(parse_repo_url("https://github.com/rust-lang/rust").unwrap(), repo("rust-lang", "rust"));
        assert_eq!(parse_repo_url("https://github.com/rust-lang/rust.git").unwrap(), repo("rust-lang", "rust"));
        assert_eq!(
            parse_repo_url("https://github.com/rust-lang/rust/tree/master/src").unwrap(),
            repo("rust-lang", "rust")
        );
        assert_eq!(parse_repo_url("git@github.com:owner/repo.git").unwrap(), repo("owner", "repo"));
        assert_eq!(parse_repo_url("github.com/owner/repo?tab=readme").unwrap(), repo("owner", "repo"));
    }

    /// Serves `total` numbered items and records every page request.
    async fn run_pages(total: usize, limit: Option<usize>) -> (Vec<usize>, Vec<(u32, usize)>) {
        let mut calls = Vec::new();
        let items = paginate(limit, |page, per_page| {
            calls.push((page, per_page));
            let start = (page as usize - 1) * per_page;
            let batch: Vec<usize> = (start..total.min(start + per_page)).collect();
            async move { Ok(batch) }
        })
        .await
        .unwrap();
        (items, calls)
    }

    #[tokio::test]
    async fn test_paginate_stops_on_short_page() {
        let (items, calls) = run_pages(250, None).await;
        assert_eq!(items.len(), 250);
        assert_eq!(calls, vec![(1, 100), (2, 100), (3, 100)]);
    }

    #[tokio::test]
    async fn test_paginate_stops_on_empty_page() {
        let (items, calls) = run_pages(200, None).await;
        assert_eq!(items.len(), 200);
        assert_eq!(calls.len(), 3);
        let (items, calls) = run_pages(0, None).await;
        assert!(items.is_empty());
        assert_eq!(calls, vec![(1, 100)]);
    }

    #[tokio::test]
    async fn test_paginate_limit_shrinks_and_stops() {
        let (items, calls) = run_pages(5000, Some(10)).await;
        assert_eq!(items, (0..10).collect::<Vec<_>>());
        assert_eq!(calls, vec![(1, 10)]);

        let (items, calls) = run_pages(5000, Some(150)).await;
        assert_eq!(items.len(), 150);
        assert_eq!(calls, vec![(1, 100), (2, 100)]);

        let (items, calls) = run_pages(5000, Some(0)).await;
        assert!(items.is_empty());
        assert!(calls.is_empty());
    }

    #[test]
    fn test_parse_repo_url_rejects_others() {
        assert!(parse_repo_url("https://gitlab.com/owner/repo").is_err());
        assert!(parse_repo_url("https://github.com/owner").is_err());
    }

    #[test]
    fn test_repo_display() {
        assert_eq!(repo("a", "b").to_string(), "a/b");
    }
}
