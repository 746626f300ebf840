use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use sprintdeck_common::error::{SprintdeckError, SprintdeckResult};
use sprintdeck_config::env::{get_var, get_var_or};

use super::models::{Commit, CommitItem, PullItem, PullRequest, RateLimit};

const PER_PAGE: usize = 100;
const MAX_PAGES: usize = 10;

#[derive(Debug, Clone)]
pub struct GithubClientConfig {
    pub base_url: String,
    pub owner: String,
    pub repo: String,
    pub token: String,
    pub max_retries: u32,
    pub timeout_secs: u64,
}

impl GithubClientConfig {
    pub fn from_env() -> SprintdeckResult<Self> {
        let owner = get_var("GITHUB_OWNER")?;
        let repo = get_var("GITHUB_REPO")?;
        let token = get_var("GITHUB_TOKEN")?;
        let base_url = get_var_or("GITHUB_BASE_URL", "https://api.github.com");

        let max_retries = get_var_or("GITHUB_MAX_RETRIES", "3")
            .parse()
            .map_err(|e| SprintdeckError::Config(format!("invalid GITHUB_MAX_RETRIES: {e}")))?;
        let timeout_secs = get_var_or("GITHUB_TIMEOUT_SECS", "30")
            .parse()
            .map_err(|e| SprintdeckError::Config(format!("invalid GITHUB_TIMEOUT_SECS: {e}")))?;

        Ok(Self {
            base_url,
            owner,
            repo,
            token,
            max_retries,
            timeout_secs,
        })
    }
}

#[derive(Clone)]
pub struct GithubClient {
    client: Client,
    config: GithubClientConfig,
}

impl GithubClient {
    pub fn new(config: GithubClientConfig) -> SprintdeckResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("sprintdeck"));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| SprintdeckError::Internal(format!("github client build failed: {e}")))?;
        Ok(Self { client, config })
    }

    /// For testing: point the client at a specific base URL (e.g., wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.config.base_url = base_url.to_string();
        self
    }

    pub fn owner(&self) -> &str {
        &self.config.owner
    }

    pub fn repo(&self) -> &str {
        &self.config.repo
    }

    /// Fetch commits of the configured repo, newest first, paginated with a
    /// page cap. A failure after the first page returns partial results.
    pub async fn fetch_commits(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> SprintdeckResult<Vec<Commit>> {
        let since_param = since
            .map(|s| format!("&since={}", s.to_rfc3339_opts(SecondsFormat::Secs, true)))
            .unwrap_or_default();

        let mut all = Vec::new();

        for page in 1..=MAX_PAGES {
            let url = format!(
                "{}/repos/{}/{}/commits?per_page={PER_PAGE}&page={page}{since_param}",
                self.config.base_url, self.config.owner, self.config.repo
            );

            let items: Vec<CommitItem> = match self.get_json(&url).await {
                Ok(items) => items,
                Err(e) if page > 1 => {
                    tracing::warn!(
                        error = %e,
                        page,
                        "commit pagination failed, returning partial results"
                    );
                    return Ok(all);
                }
                Err(e) => return Err(e),
            };

            let page_len = items.len();
            all.extend(items.into_iter().map(Commit::from));

            if page_len < PER_PAGE {
                break;
            }
        }

        Ok(all)
    }

    /// Fetch pull requests in all states, paginated with a page cap.
    pub async fn fetch_pull_requests(&self) -> SprintdeckResult<Vec<PullRequest>> {
        let mut all = Vec::new();

        for page in 1..=MAX_PAGES {
            let url = format!(
                "{}/repos/{}/{}/pulls?state=all&per_page={PER_PAGE}&page={page}",
                self.config.base_url, self.config.owner, self.config.repo
            );

            let items: Vec<PullItem> = match self.get_json(&url).await {
                Ok(items) => items,
                Err(e) if page > 1 => {
                    tracing::warn!(
                        error = %e,
                        page,
                        "pull request pagination failed, returning partial results"
                    );
                    return Ok(all);
                }
                Err(e) => return Err(e),
            };

            let page_len = items.len();
            all.extend(items.into_iter().map(PullRequest::from));

            if page_len < PER_PAGE {
                break;
            }
        }

        Ok(all)
    }

    /// Reachability probe used by the tool-health endpoint.
    pub async fn rate_limit(&self) -> SprintdeckResult<RateLimit> {
        let url = format!("{}/rate_limit", self.config.base_url);
        self.get_json(&url).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> SprintdeckResult<T> {
        let mut last_error = String::new();

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let backoff_secs = std::cmp::min(1u64 << attempt.min(5), 30);
                tracing::warn!(attempt, backoff_secs, "retrying github request after backoff");
                tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
            }

            let response = match self
                .client
                .get(url)
                .bearer_auth(&self.config.token)
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(e) => {
                    last_error = e.to_string();
                    if e.is_timeout() || e.is_connect() {
                        continue;
                    }
                    return Err(SprintdeckError::UpstreamUnavailable(e.to_string()));
                }
            };

            let status = response.status();

            if status.is_success() {
                return response.json::<T>().await.map_err(|e| {
                    SprintdeckError::Internal(format!("invalid JSON from github: {e}"))
                });
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                if let Some(retry_after) = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                {
                    let wait = std::cmp::min(retry_after, 60);
                    tracing::warn!(wait, "github rate-limited, waiting Retry-After");
                    tokio::time::sleep(Duration::from_secs(wait)).await;
                }
                last_error = "429 Too Many Requests".to_string();
                continue;
            }

            if status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                last_error = format!("{status}: {body}");
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            return Err(SprintdeckError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        Err(SprintdeckError::UpstreamUnavailable(format!(
            "max retries exceeded after {} attempts: {last_error}",
            self.config.max_retries + 1
        )))
    }
}
