use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// GET /
pub async fn get_index() -> Response {
    Json(json!({
        "message": "Attendance API Running",
        "status": "active",
    }))
    .into_response()
}
