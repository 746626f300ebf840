use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

// PDF generation was removed; the routes stay so old frontends get a clear
// answer instead of a 404.

pub async fn export_sprint_report() -> impl IntoResponse {
    not_implemented()
}

pub async fn export_velocity_report() -> impl IntoResponse {
    not_implemented()
}

fn not_implemented() -> impl IntoResponse {
    (
        StatusCode::NOT_IMPLEMENTED,
        Json(serde_json::json!({ "error": "PDF export has been removed" })),
    )
}
