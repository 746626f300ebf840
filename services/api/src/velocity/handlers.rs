use std::time::Duration;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use sprintdeck_common::error::SprintdeckError;

use crate::error::ApiError;
use crate::jira::models::SprintState;
use crate::velocity::compute::{average_velocity, build_velocity_point};
use crate::velocity::responses::{SprintListResponse, VelocityResponse};
use crate::AppState;

const VELOCITY_TTL: Duration = Duration::from_secs(30 * 60);
const SPRINTS_TTL: Duration = Duration::from_secs(10 * 60);

const MAX_SPRINT_WINDOW: usize = 20;

#[derive(Debug, Deserialize)]
pub struct VelocityParams {
    pub board: Option<u64>,
    pub sprints: Option<usize>,
}

pub async fn get_velocity(
    State(state): State<AppState>,
    Query(params): Query<VelocityParams>,
) -> Result<Json<VelocityResponse>, ApiError> {
    let board = params.board.unwrap_or_else(|| state.jira.default_board());
    let count = params.sprints.unwrap_or(6);
    if count == 0 || count > MAX_SPRINT_WINDOW {
        return Err(SprintdeckError::Validation(format!(
            "sprints must be between 1 and {MAX_SPRINT_WINDOW}, got {count}"
        ))
        .into());
    }

    let key = format!("velocity:v2:{board}:{count}");
    if let Some(cached) = state.cache.get(&key).await {
        let resp: VelocityResponse = serde_json::from_value((*cached).clone())?;
        return Ok(Json(resp));
    }

    let sprints = state.jira.fetch_sprints(board, SprintState::Closed).await?;
    // Jira returns sprints oldest-first; the window is the most recent ones
    let start = sprints.len().saturating_sub(count);
    let recent = &sprints[start..];

    let mut data = Vec::with_capacity(recent.len());
    for sprint in recent {
        let issues = state.jira.fetch_sprint_issues(sprint.id).await?;
        data.push(build_velocity_point(sprint, &issues));
    }

    let average = average_velocity(&data);
    let resp = VelocityResponse {
        board,
        data,
        average_velocity: average,
    };

    if !resp.data.is_empty() {
        state
            .cache
            .set(key, serde_json::to_value(&resp)?, VELOCITY_TTL)
            .await;
    }
    Ok(Json(resp))
}

#[derive(Debug, Deserialize)]
pub struct SprintsParams {
    pub board: Option<u64>,
    pub state: Option<String>,
}

pub async fn list_sprints(
    State(state): State<AppState>,
    Query(params): Query<SprintsParams>,
) -> Result<Json<SprintListResponse>, ApiError> {
    let board = params.board.unwrap_or_else(|| state.jira.default_board());
    let sprint_state: SprintState = params.state.as_deref().unwrap_or("active").parse()?;

    let key = format!("sprints:v1:{board}:{}", sprint_state.as_str());
    if let Some(cached) = state.cache.get(&key).await {
        let resp: SprintListResponse = serde_json::from_value((*cached).clone())?;
        return Ok(Json(resp));
    }

    let data = state.jira.fetch_sprints(board, sprint_state).await?;
    let count = data.len();
    let resp = SprintListResponse { board, data, count };

    if !resp.data.is_empty() {
        state
            .cache
            .set(key, serde_json::to_value(&resp)?, SPRINTS_TTL)
            .await;
    }
    Ok(Json(resp))
}
