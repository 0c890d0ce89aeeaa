/// Types for scraped portal data
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Username/password pair, alive only for the duration of one request.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The `_csrf` value from the login form. Only ever sent with the login POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginToken(String);

impl LoginToken {
    pub(crate) fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The CSRF token scraped from the dashboard after login. Sent on every data
/// request; it is not the same value as the [`LoginToken`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A semester (batch) as listed in the dashboard's select control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Semester {
    pub id: String,
    pub name: String,
}

/// Everything scraped from the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    /// In the order the portal lists them; the first one is the current semester
    pub semesters: Vec<Semester>,
    pub student_name: String,
    pub csrf_token: CsrfToken,
}

impl Profile {
    /// Id of the semester attendance should default to.
    pub fn current_batch_id(&self) -> Option<&str> {
        self.semesters.first().map(|s| s.id.as_str())
    }
}

/// Attendance for one course in the selected semester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseAttendance {
    pub code: String,
    pub name: String,
    pub attended: u32,
    pub total: u32,
    pub percentage: u32,
}

/// One subject's weekly schedule.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubjectSchedule {
    pub name: String,
    /// Weekday name -> time ranges ("09:00 - 10:00"), in encounter order
    pub schedule: IndexMap<String, Vec<String>>,
}

/// Subject code -> schedule, in encounter order.
pub type Timetable = IndexMap<String, SubjectSchedule>;

/// A username hashed for log output, so raw usernames never reach the logs.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct UserKey(String);

impl UserKey {
    pub fn from_username(username: &str) -> Self {
        let digest = Sha256::digest(username.as_bytes());
        Self(digest[..8].iter().map(|b| format!("{:02x}", b)).collect())
    }
}

impl fmt::Display for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
