use std::time::{Duration, Instant};

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use sprintdeck_common::error::SprintdeckError;

use crate::analytics::compute::{bucket_by_month, member_stats, parse_period, period_cutoff};
use crate::analytics::responses::{
    CommitTrendsResponse, ProbeResult, TeamPerformanceResponse, ToolHealthResponse, UpstreamProbes,
};
use crate::error::ApiError;
use crate::jira::models::SprintState;
use crate::AppState;

const TRENDS_TTL: Duration = Duration::from_secs(15 * 60);
const TEAM_TTL: Duration = Duration::from_secs(10 * 60);
const HEALTH_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Deserialize)]
pub struct TrendParams {
    pub period: Option<String>,
}

pub async fn commit_trends(
    State(state): State<AppState>,
    Query(params): Query<TrendParams>,
) -> Result<Json<CommitTrendsResponse>, ApiError> {
    let period = params.period.as_deref().unwrap_or("6m").to_string();
    let months = parse_period(&period)?;

    let owner = state.github.owner().to_string();
    let repo = state.github.repo().to_string();
    let key = format!("commit-trends:v4:{owner}:{repo}:{period}");
    if let Some(cached) = state.cache.get(&key).await {
        let resp: CommitTrendsResponse = serde_json::from_value((*cached).clone())?;
        return Ok(Json(resp));
    }

    let now = Utc::now();
    let since = period_cutoff(now, months);
    let commits = state.github.fetch_commits(Some(since)).await?;
    let pulls = state.github.fetch_pull_requests().await?;

    let data = bucket_by_month(&commits, &pulls, months, now);
    let resp = CommitTrendsResponse {
        owner,
        repo,
        period,
        data,
    };

    // The window always yields month rows; only cache when there was real
    // activity behind them, so a transient empty fetch is not pinned
    if !commits.is_empty() || !pulls.is_empty() {
        state
            .cache
            .set(key, serde_json::to_value(&resp)?, TRENDS_TTL)
            .await;
    }
    Ok(Json(resp))
}

#[derive(Debug, Deserialize)]
pub struct TeamParams {
    pub board: Option<u64>,
}

pub async fn team_performance(
    State(state): State<AppState>,
    Query(params): Query<TeamParams>,
) -> Result<Json<TeamPerformanceResponse>, ApiError> {
    let board = params.board.unwrap_or_else(|| state.jira.default_board());

    let key = format!(
        "team-performance:v3:{board}:{}:{}",
        state.github.owner(),
        state.github.repo()
    );
    if let Some(cached) = state.cache.get(&key).await {
        let resp: TeamPerformanceResponse = serde_json::from_value((*cached).clone())?;
        return Ok(Json(resp));
    }

    let active = state.jira.fetch_sprints(board, SprintState::Active).await?;
    let sprint = active
        .into_iter()
        .last()
        .ok_or_else(|| SprintdeckError::NotFound(format!("no active sprint for board {board}")))?;

    let issues = state.jira.fetch_sprint_issues(sprint.id).await?;
    let since = sprint
        .start_date
        .unwrap_or_else(|| Utc::now() - chrono::Duration::days(30));
    let commits = state.github.fetch_commits(Some(since)).await?;

    let data = member_stats(&issues, &commits);
    let resp = TeamPerformanceResponse {
        board,
        sprint_id: sprint.id,
        sprint_name: sprint.name,
        data,
    };

    if !resp.data.is_empty() {
        state
            .cache
            .set(key, serde_json::to_value(&resp)?, TEAM_TTL)
            .await;
    }
    Ok(Json(resp))
}

pub async fn tool_health(
    State(state): State<AppState>,
) -> Result<Json<ToolHealthResponse>, ApiError> {
    let key = format!(
        "tool-health:v1:{}:{}",
        state.github.owner(),
        state.github.repo()
    );

    let probes = if let Some(cached) = state.cache.get(&key).await {
        serde_json::from_value::<UpstreamProbes>((*cached).clone())?
    } else {
        let jira = probe_jira(&state).await;
        let github = probe_github(&state).await;
        let probes = UpstreamProbes { jira, github };

        // Only healthy probe results are worth remembering; failures should
        // be re-checked on the next request
        if probes.jira.status == "ok" && probes.github.status == "ok" {
            state
                .cache
                .set(key, serde_json::to_value(&probes)?, HEALTH_TTL)
                .await;
        }
        probes
    };

    // Cache statistics are always reported fresh
    let cache = state.cache.stats().await;
    Ok(Json(ToolHealthResponse {
        jira: probes.jira,
        github: probes.github,
        cache,
    }))
}

async fn probe_jira(state: &AppState) -> ProbeResult {
    let start = Instant::now();
    match state.jira.server_info().await {
        Ok(_) => ProbeResult {
            status: "ok".to_string(),
            latency_ms: start.elapsed().as_millis() as u64,
            detail: None,
        },
        Err(e) => ProbeResult {
            status: "error".to_string(),
            latency_ms: start.elapsed().as_millis() as u64,
            detail: Some(e.to_string()),
        },
    }
}

async fn probe_github(state: &AppState) -> ProbeResult {
    let start = Instant::now();
    match state.github.rate_limit().await {
        Ok(rl) => ProbeResult {
            status: "ok".to_string(),
            latency_ms: start.elapsed().as_millis() as u64,
            detail: Some(format!(
                "rate limit {}/{} remaining",
                rl.rate.remaining, rl.rate.limit
            )),
        },
        Err(e) => ProbeResult {
            status: "error".to_string(),
            latency_ms: start.elapsed().as_millis() as u64,
            detail: Some(e.to_string()),
        },
    }
}
