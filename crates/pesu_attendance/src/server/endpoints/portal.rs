//! API endpoints that log into the portal and return the scraped data.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::portal::{collect_report, Credentials, PortalReport, ReportFailure};
use crate::server::types::ApiErrorType;
use crate::types::AppState;

/// Body of `/api/login` and `/api/refresh`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
struct ScrapeResponse {
    success: bool,
    #[serde(flatten)]
    report: PortalReport,
}

/// POST /api/login
///
/// Logs in and returns attendance, semesters, calendar and timetable.
pub async fn post_login(
    State(s): State<Arc<AppState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    info!("POST /api/login");
    scrape(&s, body).await
}

/// POST /api/refresh
///
/// Same as `/api/login`; there is no server-side session to refresh.
pub async fn post_refresh(
    State(s): State<Arc<AppState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    info!("POST /api/refresh");
    scrape(&s, body).await
}

async fn scrape(state: &AppState, body: Result<Json<LoginRequest>, JsonRejection>) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(e) => {
            warn!("Rejected request body: {}", e);
            return ApiErrorType::from((StatusCode::BAD_REQUEST, "Invalid request body"))
                .into_response();
        }
    };

    let credentials = match (request.username, request.password) {
        (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
            Credentials::new(username, password)
        }
        _ => {
            let message = "Username and password required";
            return ApiErrorType::from((StatusCode::BAD_REQUEST, message)).into_response();
        }
    };

    match collect_report(&state.client, &credentials).await {
        Ok(report) => (
            StatusCode::OK,
            Json(ScrapeResponse {
                success: true,
                report,
            }),
        )
            .into_response(),
        Err(e @ ReportFailure::Login(_)) => {
            ApiErrorType::from((StatusCode::UNAUTHORIZED, e.to_string())).into_response()
        }
        Err(e @ ReportFailure::Profile(_)) => {
            ApiErrorType::from((StatusCode::INTERNAL_SERVER_ERROR, e.to_string())).into_response()
        }
    }
}
