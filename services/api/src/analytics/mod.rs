pub mod compute;
pub mod handlers;
pub mod responses;

use axum::routing::get;
use axum::Router;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/analytics/commit-trends", get(handlers::commit_trends))
        .route(
            "/api/analytics/team-performance",
            get(handlers::team_performance),
        )
        .route("/api/analytics/tool-health", get(handlers::tool_health))
}
