use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Flattened commit shape used by the analytics endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub author: Option<String>,
    pub message: String,
    pub date: DateTime<Utc>,
    pub url: String,
}

/// Flattened pull request shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub state: String,
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
}

// Raw wire shapes from the GitHub REST API.

#[derive(Debug, Deserialize)]
pub struct CommitItem {
    pub sha: String,
    pub commit: CommitDetail,
    pub author: Option<GithubUser>,
    pub html_url: String,
}

#[derive(Debug, Deserialize)]
pub struct CommitDetail {
    pub message: String,
    pub author: GitAuthor,
}

#[derive(Debug, Deserialize)]
pub struct GitAuthor {
    pub name: Option<String>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct GithubUser {
    pub login: String,
}

impl From<CommitItem> for Commit {
    fn from(item: CommitItem) -> Self {
        // Prefer the GitHub account login; fall back to the git author name
        let author = item
            .author
            .map(|u| u.login)
            .or(item.commit.author.name);
        Self {
            sha: item.sha,
            author,
            message: item.commit.message,
            date: item.commit.author.date,
            url: item.html_url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PullItem {
    pub number: u64,
    pub state: String,
    pub user: Option<GithubUser>,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
}

impl From<PullItem> for PullRequest {
    fn from(item: PullItem) -> Self {
        Self {
            number: item.number,
            state: item.state,
            author: item.user.map(|u| u.login),
            created_at: item.created_at,
            merged_at: item.merged_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimit {
    pub rate: RateLimitWindow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitWindow {
    pub limit: u64,
    pub remaining: u64,
    pub reset: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_prefers_account_login() {
        let json = r#"{
            "sha": "abc123",
            "commit": {
                "message": "Fix velocity rounding",
                "author": {"name": "Alice Local", "date": "2026-08-01T12:00:00Z"}
            },
            "author": {"login": "alice"},
            "html_url": "https://github.com/acme/sprint/commit/abc123"
        }"#;
        let item: CommitItem = serde_json::from_str(json).expect("should deserialize");
        let commit: Commit = item.into();
        assert_eq!(commit.author.as_deref(), Some("alice"));
        assert_eq!(commit.sha, "abc123");
    }

    #[test]
    fn commit_falls_back_to_git_author_name() {
        let json = r#"{
            "sha": "def456",
            "commit": {
                "message": "Bump deps",
                "author": {"name": "Bob Offline", "date": "2026-08-02T09:30:00Z"}
            },
            "author": null,
            "html_url": "https://github.com/acme/sprint/commit/def456"
        }"#;
        let item: CommitItem = serde_json::from_str(json).expect("should deserialize");
        let commit: Commit = item.into();
        assert_eq!(commit.author.as_deref(), Some("Bob Offline"));
    }

    #[test]
    fn pull_request_flattens() {
        let json = r#"{
            "number": 12,
            "state": "closed",
            "user": {"login": "alice"},
            "created_at": "2026-08-01T10:00:00Z",
            "merged_at": "2026-08-03T15:00:00Z"
        }"#;
        let item: PullItem = serde_json::from_str(json).expect("should deserialize");
        let pr: PullRequest = item.into();
        assert_eq!(pr.number, 12);
        assert_eq!(pr.author.as_deref(), Some("alice"));
        assert!(pr.merged_at.is_some());
    }

    #[test]
    fn unmerged_pull_request() {
        let json = r#"{
            "number": 13,
            "state": "open",
            "user": null,
            "created_at": "2026-08-10T10:00:00Z",
            "merged_at": null
        }"#;
        let item: PullItem = serde_json::from_str(json).expect("should deserialize");
        let pr: PullRequest = item.into();
        assert!(pr.author.is_none());
        assert!(pr.merged_at.is_none());
    }
}
