pub mod handlers;

use axum::routing::{get, post};
use axum::Router;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/export/sprint-report",
            post(handlers::export_sprint_report),
        )
        .route(
            "/api/export/velocity-report",
            get(handlers::export_velocity_report),
        )
}
