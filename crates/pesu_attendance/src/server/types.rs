use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// An error returned to API callers as `{"success": false, "error": ...}`.
#[derive(Debug)]
pub struct ApiErrorType {
    status: StatusCode,
    error: String,
}

impl<T> From<(StatusCode, T)> for ApiErrorType
where
    T: Into<String>,
{
    fn from((status, error): (StatusCode, T)) -> Self {
        Self {
            status,
            error: error.into(),
        }
    }
}

impl IntoResponse for ApiErrorType {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({
                "success": false,
                "error": self.error,
            })),
        )
            .into_response()
    }
}
