use super::types::*;
use super::{CommitSource, RepoRef};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;

pub struct GithubRest {
    client: Client,
    token: String,
    base_url: String,
    repo: RepoRef,
}

impl GithubRest {
    pub fn new(client: Client, token: String, base_url: &str, repo: RepoRef) -> Self {
        Self {
            client,
            token,
            base_url: base_url.trim_end_matches('/').to_string(),
            repo,
        }
    }

    fn repo_url(&self, path: &str) -> String {
        format!("{}/repos/{}/{}{}", self.base_url, self.repo.owner, self.repo.name, path)
    }

    /// Authenticated GET request.
    async fn get_authed<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let resp = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;
        let status = resp.status();
        if status.as_u16() == 401 {
            anyhow::bail!("GitHub rejected the token (401 Unauthorized)");
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("GET {} failed ({}): {}", url, status, body);
        }
        resp.json().await.context("failed to parse GitHub response")
    }
}

#[async_trait]
impl CommitSource for GithubRest {
    /// Commits on the default branch, newest first.
    async fn list_commits(&self, limit: Option<usize>) -> Result<Vec<CommitSummary>> {
        let base = self.repo_url("/commits");
        super::paginate(limit, |page, per_page| {
            let url = format!("{}?per_page={}&page={}", base, per_page, page);
            async move { self.get_authed::<Vec<CommitSummary>>(&url).await }
        })
        .await
    }

    async fn commit_detail(&self, sha: &str) -> Result<CommitDetail> {
        let url = self.repo_url(&format!("/commits/{}", sha));
        self.get_authed(&url).await
    }

    async fn tree_file_count(&self, sha: &str) -> Option<usize> {
        let url = self.repo_url(&format!("/git/trees/{}?recursive=1", sha));
        match self.get_authed::<Tree>(&url).await {
            Ok(tree) => {
                if tree.truncated {
                    tracing::warn!(sha, "tree listing truncated by GitHub, file count unavailable");
                    return None;
                }
                Some(tree.file_count())
            }
            Err(e) => {
                tracing::warn!(sha, error = %e, "tree fetch failed");
                None
            }
        }
    }
}
