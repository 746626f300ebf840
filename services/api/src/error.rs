use std::sync::OnceLock;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sprintdeck_common::error::SprintdeckError;

static DEV_MODE: OnceLock<bool> = OnceLock::new();

/// Error responses carry a `detail` field only in development mode.
pub fn set_dev_mode(enabled: bool) {
    let _ = DEV_MODE.set(enabled);
}

fn dev_mode() -> bool {
    *DEV_MODE.get().unwrap_or(&false)
}

pub struct ApiError(pub SprintdeckError);

impl From<SprintdeckError> for ApiError {
    fn from(err: SprintdeckError) -> Self {
        Self(err)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            SprintdeckError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            SprintdeckError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            // 4xx from an upstream passes through unchanged; upstream 5xx
            // and unreachable upstreams are a bad gateway from our side.
            SprintdeckError::Upstream { status, body } if (400..500).contains(status) => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                body.clone(),
            ),
            SprintdeckError::Upstream { .. } | SprintdeckError::UpstreamUnavailable(_) => {
                (StatusCode::BAD_GATEWAY, self.0.to_string())
            }
            other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
        };

        let mut body = serde_json::json!({ "error": message });
        if dev_mode() {
            body["detail"] = serde_json::Value::String(format!("{:?}", self.0));
        }
        (status, Json(body)).into_response()
    }
}
