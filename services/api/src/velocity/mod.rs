pub mod compute;
pub mod handlers;
pub mod responses;

use axum::routing::get;
use axum::Router;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/velocity", get(handlers::get_velocity))
        .route("/api/velocity/sprints", get(handlers::list_sprints))
}
