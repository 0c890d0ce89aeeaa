//! Sequences one full scrape: login, dashboard, then the three data pages.
//!
//! Login and dashboard failures end the run. Attendance, calendar and
//! timetable failures are logged and replaced with empty values, so a
//! partial report is still a successful one.

use super::client::PortalClient;
use super::error::PortalError;
use super::types::{CourseAttendance, Credentials, Semester, Timetable, UserKey};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;
use thiserror::Error;
use tracing::{error, info, warn};

/// Everything scraped for one student in one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortalReport {
    pub student_name: String,
    pub attendance: Vec<CourseAttendance>,
    pub semesters: Vec<Semester>,
    pub selected_batch_id: Option<String>,
    pub calendar: Value,
    pub timetable: Timetable,
    pub fetched_at: String,
}

/// The stages whose failure aborts the whole run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReportFailure {
    #[error("{0}")]
    Login(PortalError),

    #[error("Failed to fetch user data: {0}")]
    Profile(PortalError),
}

impl ReportFailure {
    pub fn source_error(&self) -> &PortalError {
        match self {
            ReportFailure::Login(e) | ReportFailure::Profile(e) => e,
        }
    }
}

/// Logs in with `credentials` and scrapes the current semester's data.
pub async fn collect_report(
    client: &PortalClient,
    credentials: &Credentials,
) -> Result<PortalReport, ReportFailure> {
    let user = UserKey::from_username(&credentials.username);
    let correlation_id = scrape_id(&user, Utc::now());
    let start = Instant::now();

    info!(correlation_id = %correlation_id, user = %user, "Starting portal scrape");

    let session = client.login(credentials).await.map_err(|e| {
        error!(correlation_id = %correlation_id, error = %e, kind = e.kind(), "Login failed");
        ReportFailure::Login(e)
    })?;

    let profile = session
        .fetch_profile(&credentials.username)
        .await
        .map_err(|e| {
            error!(
                correlation_id = %correlation_id,
                error = %e,
                kind = e.kind(),
                "Dashboard failed"
            );
            ReportFailure::Profile(e)
        })?;

    let selected_batch_id = profile.current_batch_id().map(str::to_string);

    let attendance = session
        .fetch_attendance(selected_batch_id.as_deref(), &profile.csrf_token)
        .await
        .unwrap_or_else(|e| {
            log_partial_failure(&correlation_id, "attendance", &e);
            Vec::new()
        });

    let calendar = session
        .fetch_calendar(&profile.csrf_token)
        .await
        .unwrap_or_else(|e| {
            log_partial_failure(&correlation_id, "calendar", &e);
            Value::Array(Vec::new())
        });

    let timetable = session
        .fetch_timetable(&profile.csrf_token)
        .await
        .unwrap_or_else(|e| {
            log_partial_failure(&correlation_id, "timetable", &e);
            Timetable::new()
        });

    info!(
        correlation_id = %correlation_id,
        duration_ms = start.elapsed().as_millis() as u64,
        courses = attendance.len(),
        subjects = timetable.len(),
        "Portal scrape completed"
    );

    Ok(PortalReport {
        student_name: profile.student_name,
        attendance,
        semesters: profile.semesters,
        selected_batch_id,
        calendar,
        timetable,
        fetched_at: Utc::now().to_rfc3339(),
    })
}

fn log_partial_failure(correlation_id: &str, stage: &str, error: &PortalError) {
    warn!(
        correlation_id = %correlation_id,
        stage = stage,
        error = %error,
        kind = error.kind(),
        "Fetch failed, continuing with empty data"
    );
}

/// Tags every log line of one scrape: `<user key>-<start time>-<nonce>`.
///
/// The nonce keeps two scrapes for the same user in the same second apart.
fn scrape_id(user: &UserKey, started_at: DateTime<Utc>) -> String {
    let nonce: u16 = rand::thread_rng().gen();
    format!("{}-{}-{:04x}", user, started_at.format("%Y%m%dT%H%M%S"), nonce)
}
