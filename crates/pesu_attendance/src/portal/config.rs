//! Remote-contract configuration for the portal.
//!
//! Everything the portal dictates (URLs, form values, header values, script
//! markers) lives here as one immutable value. The defaults match PESU Academy;
//! tests point `base_url` at a mock server instead.

use super::error::PortalError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Base URL for PESU Academy.
const PESU_BASE_URL: &str = "https://www.pesuacademy.com/Academy";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Top-level portal configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Base URL every path below is appended to
    pub base_url: String,
    /// User agent string sent on every request
    pub user_agent: String,
    /// Value of the `x-requested-with` header sent on every request
    pub requested_with: String,
    /// Per-call timeout, in seconds
    pub timeout_secs: u64,
    /// Connect timeout, in seconds
    pub connect_timeout_secs: u64,
    pub paths: PortalPaths,
    pub attendance_form: AttendanceForm,
    pub markers: ScrapeMarkers,
}

/// Endpoint paths, relative to `base_url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalPaths {
    pub login_page: String,
    pub auth: String,
    pub dashboard: String,
    pub attendance: String,
    pub attendance_referer: String,
    pub calendar: String,
    pub timetable: String,
}

/// Fixed values posted alongside the batch id when asking for attendance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttendanceForm {
    pub controller_mode: String,
    pub action_type: String,
    pub menu_id: String,
}

/// A piece of inline script text surrounding an embedded JSON literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptMarker {
    pub prefix: String,
    pub suffix: String,
}

impl ScriptMarker {
    fn new(prefix: &str, suffix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
        }
    }
}

/// Marker strings used to locate data inside returned pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeMarkers {
    /// Any of these in the login response body means the password was wrong
    pub bad_credentials: Vec<String>,
    pub calendar: ScriptMarker,
    pub timetable_slots: ScriptMarker,
    pub timetable_schedule: ScriptMarker,
    /// Prefix of schedule keys that carry a day/slot pair
    pub schedule_key_prefix: String,
    /// Prefix stripped from the subject info in schedule values
    pub subject_prefix: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: PESU_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            requested_with: "XMLHttpRequest".to_string(),
            timeout_secs: 10,
            connect_timeout_secs: 10,
            paths: PortalPaths::default(),
            attendance_form: AttendanceForm::default(),
            markers: ScrapeMarkers::default(),
        }
    }
}

impl Default for PortalPaths {
    fn default() -> Self {
        Self {
            login_page: "/".to_string(),
            auth: "/j_spring_security_check".to_string(),
            dashboard: "/s/studentProfilePESU".to_string(),
            attendance: "/s/studentProfilePESUAdmin".to_string(),
            attendance_referer: "/s/studentProfilePESU".to_string(),
            calendar: "/s/studentProfilePESUAdmin?menuId=668&controllerMode=6413&actionType=5"
                .to_string(),
            timetable: "/s/studentProfilePESUAdmin?menuId=669&controllerMode=6415&actionType=5"
                .to_string(),
        }
    }
}

impl Default for AttendanceForm {
    fn default() -> Self {
        Self {
            controller_mode: "6415".to_string(),
            action_type: "8".to_string(),
            menu_id: "660".to_string(),
        }
    }
}

impl Default for ScrapeMarkers {
    fn default() -> Self {
        Self {
            bad_credentials: vec![
                "Bad credentials".to_string(),
                "Invalid username or password".to_string(),
            ],
            calendar: ScriptMarker::new("var obj = JSON.parse('", "');"),
            timetable_slots: ScriptMarker::new("var timeTableTemplateDetailsJson=", ";"),
            timetable_schedule: ScriptMarker::new("var timeTableJson=", ";"),
            schedule_key_prefix: "ttDivText_".to_string(),
            subject_prefix: "ttSubject&&".to_string(),
        }
    }
}

impl PortalConfig {
    /// Loads a configuration from a JSON file. Missing keys keep their defaults.
    pub fn load_from_file(path: &Path) -> Result<Self, PortalError> {
        let content = fs::read_to_string(path).map_err(|e| PortalError::Config {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;

        serde_json::from_str(&content).map_err(|e| PortalError::Config {
            message: format!("cannot parse {}: {}", path.display(), e),
        })
    }

    /// Returns a copy of the default configuration rooted at another base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    pub fn login_page_url(&self) -> String {
        self.url(&self.paths.login_page)
    }

    pub fn auth_url(&self) -> String {
        self.url(&self.paths.auth)
    }

    pub fn dashboard_url(&self) -> String {
        self.url(&self.paths.dashboard)
    }

    pub fn attendance_url(&self) -> String {
        self.url(&self.paths.attendance)
    }

    pub fn attendance_referer_url(&self) -> String {
        self.url(&self.paths.attendance_referer)
    }

    pub fn calendar_url(&self) -> String {
        self.url(&self.paths.calendar)
    }

    pub fn timetable_url(&self) -> String {
        self.url(&self.paths.timetable)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
