use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use sprintdeck_common::error::{SprintdeckError, SprintdeckResult};
use sprintdeck_config::env::{get_var, get_var_or};

use super::models::{Issue, IssuePage, Sprint, SprintPage, SprintState};

const MAX_RESULTS: usize = 50;
const MAX_PAGES: usize = 10;

#[derive(Debug, Clone)]
pub struct JiraClientConfig {
    pub base_url: String,
    pub email: String,
    pub api_token: String,
    pub board_id: u64,
    pub max_retries: u32,
    pub timeout_secs: u64,
}

impl JiraClientConfig {
    /// Load Jira config from environment. The service proxies Jira on every
    /// analytics path, so missing credentials fail startup instead of being
    /// skipped.
    pub fn from_env() -> SprintdeckResult<Self> {
        let base_url = get_var("JIRA_BASE_URL")?;
        let email = get_var("JIRA_EMAIL")?;
        let api_token = get_var("JIRA_API_TOKEN")?;
        let board_id = get_var("JIRA_BOARD_ID")?
            .parse()
            .map_err(|e| SprintdeckError::Config(format!("invalid JIRA_BOARD_ID: {e}")))?;

        let max_retries = get_var_or("JIRA_MAX_RETRIES", "3")
            .parse()
            .map_err(|e| SprintdeckError::Config(format!("invalid JIRA_MAX_RETRIES: {e}")))?;
        let timeout_secs = get_var_or("JIRA_TIMEOUT_SECS", "30")
            .parse()
            .map_err(|e| SprintdeckError::Config(format!("invalid JIRA_TIMEOUT_SECS: {e}")))?;

        Ok(Self {
            base_url,
            email,
            api_token,
            board_id,
            max_retries,
            timeout_secs,
        })
    }
}

#[derive(Clone)]
pub struct JiraClient {
    client: Client,
    config: JiraClientConfig,
}

impl JiraClient {
    pub fn new(config: JiraClientConfig) -> SprintdeckResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SprintdeckError::Internal(format!("jira client build failed: {e}")))?;
        Ok(Self { client, config })
    }

    /// For testing: point the client at a specific base URL (e.g., wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.config.base_url = base_url.to_string();
        self
    }

    pub fn default_board(&self) -> u64 {
        self.config.board_id
    }

    /// Fetch the board's sprints in the given state, paginated.
    ///
    /// A failure after the first page stops pagination and returns what was
    /// fetched so far; only a failure on the first page is an error.
    pub async fn fetch_sprints(
        &self,
        board_id: u64,
        state: SprintState,
    ) -> SprintdeckResult<Vec<Sprint>> {
        let mut start_at = 0;
        let mut all = Vec::new();

        for page_idx in 0..MAX_PAGES {
            let url = format!(
                "{}/rest/agile/1.0/board/{board_id}/sprint?state={}&startAt={start_at}&maxResults={MAX_RESULTS}",
                self.config.base_url,
                state.as_str()
            );

            let page: SprintPage = match self.get_json(&url).await {
                Ok(page) => page,
                Err(e) if page_idx > 0 => {
                    tracing::warn!(
                        error = %e,
                        page = page_idx,
                        board_id,
                        "sprint pagination failed, returning partial results"
                    );
                    return Ok(all);
                }
                Err(e) => return Err(e),
            };

            let page_len = page.values.len();
            all.extend(page.values);

            if page.is_last || page_len < MAX_RESULTS {
                break;
            }
            start_at += MAX_RESULTS;
        }

        Ok(all)
    }

    /// Fetch all issues of a sprint with the fields analytics needs.
    pub async fn fetch_sprint_issues(&self, sprint_id: i64) -> SprintdeckResult<Vec<Issue>> {
        let mut start_at = 0;
        let mut all: Vec<Issue> = Vec::new();

        for page_idx in 0..MAX_PAGES {
            let url = format!(
                "{}/rest/agile/1.0/sprint/{sprint_id}/issue?startAt={start_at}&maxResults={MAX_RESULTS}&fields=status,assignee,issuetype,customfield_10016",
                self.config.base_url
            );

            let page: IssuePage = match self.get_json(&url).await {
                Ok(page) => page,
                Err(e) if page_idx > 0 => {
                    tracing::warn!(
                        error = %e,
                        page = page_idx,
                        sprint_id,
                        "issue pagination failed, returning partial results"
                    );
                    return Ok(all);
                }
                Err(e) => return Err(e),
            };

            let page_len = page.issues.len();
            all.extend(page.issues.into_iter().map(Issue::from));

            if page_len < MAX_RESULTS {
                break;
            }
            start_at += MAX_RESULTS;
        }

        Ok(all)
    }

    /// Reachability probe used by the tool-health endpoint.
    pub async fn server_info(&self) -> SprintdeckResult<serde_json::Value> {
        let url = format!("{}/rest/api/3/serverInfo", self.config.base_url);
        self.get_json(&url).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> SprintdeckResult<T> {
        let mut last_error = String::new();

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let backoff_secs = std::cmp::min(1u64 << attempt.min(5), 30);
                tracing::warn!(attempt, backoff_secs, "retrying jira request after backoff");
                tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
            }

            let response = match self
                .client
                .get(url)
                .basic_auth(&self.config.email, Some(&self.config.api_token))
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
                    SprintdeckError::Internal(format!("invalid JSON from jira: {e}"))
                });
            }

            // Honor Retry-After header for 429
            if status == StatusCode::TOO_MANY_REQUESTS {
                if let Some(retry_after) = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                {
                    let wait = std::cmp::min(retry_after, 60);
                    tracing::warn!(wait, "jira rate-limited, waiting Retry-After");
                    tokio::time::sleep(Duration::from_secs(wait)).await;
                }
                last_error = "429 Too Many Requests".to_string();
                continue;
            }

            // Retry on 5xx
            if status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                last_error = format!("{status}: {body}");
                continue;
            }

            // Fail fast on 4xx (except 429 handled above)
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
