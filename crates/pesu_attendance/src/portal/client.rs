//! HTTP client for the portal.
//!
//! Replays the portal's navigation flow:
//! 1. GET the login page for the login CSRF token and the first cookie
//! 2. POST the credentials to the Spring Security endpoint
//! 3. GET the dashboard for the data CSRF token, semesters and display name
//! 4. POST/GET the attendance, calendar and timetable pages with that token
//!
//! Every login creates a fresh cookie jar; nothing is shared between sessions.

use super::attendance::{
    AttendanceExtractor, FIELD_ACTION_TYPE, FIELD_BATCH_CLASS_ID, FIELD_CONTROLLER_MODE,
    FIELD_MENU_ID,
};
use super::calendar::CalendarExtractor;
use super::config::PortalConfig;
use super::error::PortalError;
use super::extract::PageExtractor;
use super::login::{classify_login_response, LoginPageExtractor};
use super::profile::DashboardExtractor;
use super::timetable::TimetableExtractor;
use super::types::{CourseAttendance, Credentials, CsrfToken, Profile, Timetable, UserKey};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, REFERER};
use reqwest::redirect::Policy;
use reqwest::{Client, Response};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

/// Form field names of the login POST.
const FIELD_USERNAME: &str = "j_username";
const FIELD_PASSWORD: &str = "j_password";
const FIELD_LOGIN_CSRF: &str = "_csrf";

/// Header carrying the data CSRF token on post-login requests.
const CSRF_HEADER: &str = "x-csrf-token";
const REQUESTED_WITH_HEADER: &str = "x-requested-with";

/// Cookie jar for one login that also records whether the portal ever issued
/// a cookie, on any host or path, including responses that were redirected.
#[derive(Debug, Default)]
struct SessionJar {
    jar: Jar,
    issued: AtomicBool,
}

impl SessionJar {
    fn has_issued_cookies(&self) -> bool {
        self.issued.load(Ordering::Relaxed)
    }
}

impl CookieStore for SessionJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        let mut cookie_headers = cookie_headers.peekable();
        if cookie_headers.peek().is_some() {
            self.issued.store(true, Ordering::Relaxed);
        }
        self.jar.set_cookies(&mut cookie_headers, url);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        self.jar.cookies(url)
    }
}

/// Extractors whose patterns are compiled from the configured markers.
#[derive(Debug, Clone)]
struct CompiledExtractors {
    calendar: CalendarExtractor,
    timetable: TimetableExtractor,
}

/// Entry point to the portal. Cheap to clone; holds no session state.
#[derive(Debug, Clone)]
pub struct PortalClient {
    config: Arc<PortalConfig>,
    extractors: Arc<CompiledExtractors>,
}

impl PortalClient {
    /// Creates a client for the given configuration.
    ///
    /// Fails if the configuration's base URL or markers are unusable.
    pub fn new(config: Arc<PortalConfig>) -> Result<Self, PortalError> {
        Url::parse(&config.login_page_url())?;

        let extractors = CompiledExtractors {
            calendar: CalendarExtractor::new(&config.markers.calendar)?,
            timetable: TimetableExtractor::new(&config.markers)?,
        };

        Ok(Self {
            config,
            extractors: Arc::new(extractors),
        })
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    /// Builds an HTTP client bound to `jar` with the browser-like header set.
    fn build_http_client(&self, jar: Arc<SessionJar>) -> Result<Client, PortalError> {
        let mut headers = HeaderMap::new();
        let requested_with = HeaderValue::from_str(&self.config.requested_with)
            .map_err(|e| PortalError::config(format!("invalid x-requested-with value: {e}")))?;
        headers.insert(HeaderName::from_static(REQUESTED_WITH_HEADER), requested_with);

        Client::builder()
            .cookie_provider(jar)
            .default_headers(headers)
            .user_agent(&self.config.user_agent)
            .redirect(Policy::limited(10))
            .connect_timeout(self.config.connect_timeout())
            .timeout(self.config.timeout())
            .build()
            .map_err(|e| PortalError::config(format!("Failed to build HTTP client: {e}")))
    }

    /// Logs into the portal and returns the authenticated session.
    ///
    /// Single attempt: network failures come back as `Timeout`/`Connection`
    /// and are never retried here.
    pub async fn login(&self, credentials: &Credentials) -> Result<PortalSession, PortalError> {
        let user = UserKey::from_username(&credentials.username);
        let start = Instant::now();
        let jar = Arc::new(SessionJar::default());
        let http = self.build_http_client(jar.clone())?;

        // Step 1: login page
        let login_url = self.config.login_page_url();
        info!(user = %user, url = %login_url, "Fetching login page");

        let page = http
            .get(&login_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let login_token = LoginPageExtractor.extract(&page)?;

        // Step 2: credentials
        debug!(user = %user, "Submitting credentials");
        let response = http
            .post(self.config.auth_url())
            .header(REFERER, &login_url)
            .form(&[
                (FIELD_USERNAME, credentials.username.as_str()),
                (FIELD_PASSWORD, credentials.password.as_str()),
                (FIELD_LOGIN_CSRF, login_token.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let final_url = response.url().to_string();
        let body = response.text().await?;
        let has_cookies = jar.has_issued_cookies();

        if let Err(e) =
            classify_login_response(&self.config.markers, &body, &final_url, has_cookies)
        {
            warn!(user = %user, error = %e, kind = e.kind(), "Login rejected");
            return Err(e);
        }

        info!(
            user = %user,
            duration_ms = start.elapsed().as_millis() as u64,
            "Logged in"
        );

        Ok(PortalSession {
            http,
            config: self.config.clone(),
            extractors: self.extractors.clone(),
            user,
        })
    }
}

/// An authenticated session: the cookie-bearing client from one login.
///
/// Dropped at the end of the request that created it.
pub struct PortalSession {
    http: Client,
    config: Arc<PortalConfig>,
    extractors: Arc<CompiledExtractors>,
    user: UserKey,
}

impl PortalSession {
    /// Fetches the dashboard and pulls the data CSRF token, the semesters and
    /// the student's display name (falling back to `username`).
    pub async fn fetch_profile(&self, username: &str) -> Result<Profile, PortalError> {
        let url = self.config.dashboard_url();
        info!(user = %self.user, url = %url, "Fetching dashboard");

        let response = self.http.get(&url).send().await?.error_for_status()?;
        self.check_session_valid(&response)?;

        let body = response.text().await?;
        let page = DashboardExtractor.extract(&body)?;

        info!(
            user = %self.user,
            semesters = page.semesters.len(),
            "Parsed dashboard"
        );

        Ok(Profile {
            semesters: page.semesters,
            student_name: page.student_name.unwrap_or_else(|| username.to_string()),
            csrf_token: page.csrf_token,
        })
    }

    /// Fetches attendance for one semester.
    ///
    /// Without a batch id there is nothing to ask for: returns an empty list
    /// and makes no request.
    pub async fn fetch_attendance(
        &self,
        batch_id: Option<&str>,
        csrf_token: &CsrfToken,
    ) -> Result<Vec<CourseAttendance>, PortalError> {
        let Some(batch_id) = batch_id.filter(|id| !id.is_empty()) else {
            debug!(user = %self.user, "No semester selected, skipping attendance");
            return Ok(Vec::new());
        };

        let form = &self.config.attendance_form;
        let url = self.config.attendance_url();
        info!(user = %self.user, url = %url, batch_id = %batch_id, "Fetching attendance");

        let response = self
            .http
            .post(&url)
            .header(CSRF_HEADER, csrf_token.as_str())
            .header(REFERER, self.config.attendance_referer_url())
            .form(&[
                (FIELD_CONTROLLER_MODE, form.controller_mode.as_str()),
                (FIELD_ACTION_TYPE, form.action_type.as_str()),
                (FIELD_BATCH_CLASS_ID, batch_id),
                (FIELD_MENU_ID, form.menu_id.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;
        self.check_session_valid(&response)?;

        let records = AttendanceExtractor.extract(&response.text().await?)?;
        info!(user = %self.user, courses = records.len(), "Parsed attendance");

        Ok(records)
    }

    /// Fetches the academic calendar as the raw JSON the page embeds.
    pub async fn fetch_calendar(&self, csrf_token: &CsrfToken) -> Result<Value, PortalError> {
        let body = self
            .get_data_page(&self.config.calendar_url(), csrf_token)
            .await?;
        self.extractors.calendar.extract(&body)
    }

    /// Fetches the timetable, grouped by subject.
    pub async fn fetch_timetable(&self, csrf_token: &CsrfToken) -> Result<Timetable, PortalError> {
        let body = self
            .get_data_page(&self.config.timetable_url(), csrf_token)
            .await?;
        let timetable = self.extractors.timetable.extract(&body)?;
        info!(user = %self.user, subjects = timetable.len(), "Parsed timetable");

        Ok(timetable)
    }

    /// GETs a post-login page with the data CSRF token and the attendance referer.
    async fn get_data_page(
        &self,
        url: &str,
        csrf_token: &CsrfToken,
    ) -> Result<String, PortalError> {
        info!(user = %self.user, url = %url, "Fetching page");

        let response = self
            .http
            .get(url)
            .header(CSRF_HEADER, csrf_token.as_str())
            .header(REFERER, self.config.attendance_referer_url())
            .send()
            .await?
            .error_for_status()?;
        self.check_session_valid(&response)?;

        Ok(response.text().await?)
    }

    /// The portal never answers an expired session with an error status; it
    /// redirects to the login page. The final URL is the only signal.
    fn check_session_valid(&self, response: &Response) -> Result<(), PortalError> {
        let url = response.url().as_str();

        if url.to_lowercase().contains("login") || url == self.config.login_page_url() {
            warn!(user = %self.user, url = %url, "Session expired - redirected to login");
            return Err(PortalError::SessionExpired {
                redirect_url: url.to_string(),
            });
        }

        Ok(())
    }
}
