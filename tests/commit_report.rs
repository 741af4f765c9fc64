// Commit collection and totals against an in-memory commit source

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use async_trait::async_trait;
    use scripts::github::types::{CommitDetail, CommitSummary};
    use scripts::github::{self, CommitSource};
    use scripts::report::{self, CollectOptions, CommitTotals};
    use std::sync::Mutex;

    struct FakeRepo {
        details: Vec<(&'static str, u64, u64, usize)>,
        detail_calls: Mutex<Vec<String>>,
        page_calls: Mutex<Vec<(u32, usize)>>,
    }

    impl FakeRepo {
        fn new(details: Vec<(&'static str, u64, u64, usize)>) -> Self {
            Self {
                details,
                detail_calls: Mutex::new(Vec::new()),
                page_calls: Mutex::new(Vec::new()),
            }
        }
    }

    /// A long history with no stats, for counting listing requests.
    struct LongHistory {
        commits: usize,
        page_calls: Mutex<Vec<(u32, usize)>>,
    }

    #[async_trait]
    impl CommitSource for LongHistory {
        async fn list_commits(&self, limit: Option<usize>) -> Result<Vec<CommitSummary>> {
            github::paginate(limit, |page, per_page| {
                self.page_calls.lock().unwrap().push((page, per_page));
                let start = (page as usize - 1) * per_page;
                let batch: Vec<_> = (start..self.commits.min(start + per_page))
                    .map(|i| CommitSummary { sha: format!("sha{}", i) })
                    .collect();
                async move { Ok(batch) }
            })
            .await
        }

        async fn commit_detail(&self, sha: &str) -> Result<CommitDetail> {
            let json = serde_json::json!({"sha": sha, "commit": {"author": null, "message": "m"}});
            Ok(serde_json::from_value(json)?)
        }

        async fn tree_file_count(&self, _sha: &str) -> Option<usize> {
            None
        }
    }

    #[async_trait]
    impl CommitSource for FakeRepo {
        async fn list_commits(&self, limit: Option<usize>) -> Result<Vec<CommitSummary>> {
            github::paginate(limit, |page, per_page| {
                self.page_calls.lock().unwrap().push((page, per_page));
                let start = ((page as usize - 1) * per_page).min(self.details.len());
                let end = self.details.len().min(start + per_page);
                let batch: Vec<_> = self.details[start..end]
                    .iter()
                    .map(|(sha, ..)| CommitSummary { sha: sha.to_string() })
                    .collect();
                async move { Ok(batch) }
            })
            .await
        }

        async fn commit_detail(&self, sha: &str) -> Result<CommitDetail> {
            self.detail_calls.lock().unwrap().push(sha.to_string());
            let (_, add, del, files) = self
                .details
                .iter()
                .find(|(s, ..)| *s == sha)
                .copied()
                .ok_or_else(|| anyhow::anyhow!("unknown commit {}", sha))?;
            let files: Vec<_> = (0..files).map(|i| serde_json::json!({"filename": format!("f{}.rs", i)})).collect();
            let json = serde_json::json!({
                "sha": sha,
                "commit": {
                    "author": {"name": "dev", "date": "2024-04-01T12:00:00Z"},
                    "message": format!("change {}\n\nbody", sha)
                },
                "stats": {"additions": add, "deletions": del},
                "files": files
            });
            Ok(serde_json::from_value(json)?)
        }

        async fn tree_file_count(&self, sha: &str) -> Option<usize> {
            // Pretend the newest commit's tree came back truncated.
            if sha == "c3" {
                None
            } else {
                Some(100)
            }
        }
    }

    #[tokio::test]
    async fn test_collect_records_in_listing_order() {
        let repo = FakeRepo::new(vec![("c3", 30, 5, 3), ("c2", 20, 10, 2), ("c1", 1, 0, 1)]);
        let records = report::collect_records(&repo, CollectOptions::default()).await.unwrap();

        let shas: Vec<_> = records.iter().map(|r| r.sha.as_str()).collect();
        assert_eq!(shas, vec!["c3", "c2", "c1"]);
        assert_eq!(records[0].message, "change c3");
        assert!(records.iter().all(|r| r.tree_files.is_none()));

        let totals = CommitTotals::from_records(&records);
        assert_eq!(totals.additions, 51);
        assert_eq!(totals.deletions, 15);
        assert_eq!(totals.files_changed, 6);
        assert_eq!(totals.net(), 36);
    }

    #[tokio::test]
    async fn test_max_commits_limits_detail_requests() {
        let repo = FakeRepo::new(vec![("c3", 30, 5, 3), ("c2", 20, 10, 2), ("c1", 1, 0, 1)]);
        let options = CollectOptions {
            max_commits: Some(2),
            tree_files: false,
        };
        let records = report::collect_records(&repo, options).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(*repo.detail_calls.lock().unwrap(), vec!["c3", "c2"]);
        assert_eq!(*repo.page_calls.lock().unwrap(), vec![(1, 2)]);
    }

    #[tokio::test]
    async fn test_max_commits_requests_one_small_page() {
        let repo = LongHistory {
            commits: 5_000,
            page_calls: Mutex::new(Vec::new()),
        };
        let options = CollectOptions {
            max_commits: Some(10),
            tree_files: false,
        };
        let records = report::collect_records(&repo, options).await.unwrap();
        assert_eq!(records.len(), 10);
        assert_eq!(records[0].sha, "sha0");
        assert_eq!(*repo.page_calls.lock().unwrap(), vec![(1, 10)]);
    }

    #[tokio::test]
    async fn test_full_history_pages_until_short_page() {
        let repo = LongHistory {
            commits: 230,
            page_calls: Mutex::new(Vec::new()),
        };
        let records = report::collect_records(&repo, CollectOptions::default()).await.unwrap();
        assert_eq!(records.len(), 230);
        assert_eq!(*repo.page_calls.lock().unwrap(), vec![(1, 100), (2, 100), (3, 100)]);
    }

    #[tokio::test]
    async fn test_tree_files_unavailable_renders_na() {
        let repo = FakeRepo::new(vec![("c3", 30, 5, 3), ("c2", 20, 10, 2)]);
        let options = CollectOptions {
            max_commits: None,
            tree_files: true,
        };
        let records = report::collect_records(&repo, options).await.unwrap();
        assert_eq!(records[0].tree_files, None);
        assert_eq!(records[1].tree_files, Some(100));

        let out = report::render_report(&records, true);
        assert!(out.contains("N/A"));
        assert!(out.contains("Commits:        2"));
        assert!(out.contains("Net change:     +40"));
    }

    #[tokio::test]
    async fn test_empty_repository() {
        let repo = FakeRepo::new(vec![]);
        let records = report::collect_records(&repo, CollectOptions::default()).await.unwrap();
        assert!(records.is_empty());
        let out = report::render_report(&records, false);
        assert!(out.contains("Lines added:    0"));
        assert!(out.contains("Net change:     +0"));
    }
}
