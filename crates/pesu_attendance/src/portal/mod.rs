/// PESU Academy scraping module
mod attendance;
mod calendar;
mod client;
mod config;
mod error;
mod extract;
mod login;
mod profile;
mod report;
mod timetable;
mod types;

pub use attendance::AttendanceExtractor;
pub use calendar::CalendarExtractor;
pub use client::{PortalClient, PortalSession};
pub use config::{AttendanceForm, PortalConfig, PortalPaths, ScrapeMarkers, ScriptMarker};
pub use error::PortalError;
pub use extract::PageExtractor;
pub use login::{classify_login_response, LoginPageExtractor};
pub use profile::{title_case, DashboardExtractor, DashboardPage};
pub use report::{collect_report, PortalReport, ReportFailure};
pub use timetable::TimetableExtractor;
pub use types::*;
