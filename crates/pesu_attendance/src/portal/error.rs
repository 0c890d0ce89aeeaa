//! Error types for the portal scraping pipeline.

use thiserror::Error;

/// Errors that can occur while talking to (or scraping) the portal.
///
/// The `Display` output is what ends up in API responses, so every message is
/// phrased for the end user.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PortalError {
    /// The portal rejected the username/password pair
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Login went through without an error marker, but no session came out of it
    #[error("Login failed. {message}")]
    LoginFailed { message: String },

    /// The portal bounced us back to its login page
    #[error("Session expired or login failed. Please try logging in again.")]
    SessionExpired { redirect_url: String },

    /// An expected HTML element or script marker was not found
    #[error("{message}")]
    ScrapeStructure { message: String },

    /// The marker was there, but its content could not be decoded
    #[error("Malformed data: {message}")]
    MalformedData { message: String },

    /// The request exceeded the per-call timeout
    #[error("Connection timeout. Please try again.")]
    Timeout,

    /// The portal could not be reached at all
    #[error("Unable to connect to PESU Academy. Please check your internet connection.")]
    Connection { message: String },

    /// The injected configuration is unusable (bad URL, bad marker)
    #[error("Invalid portal configuration: {message}")]
    Config { message: String },

    /// Anything else (unexpected status codes, body decoding failures)
    #[error("Unexpected error: {message}")]
    Unknown { message: String },
}

impl PortalError {
    /// Returns true if a caller may sensibly try the same request again.
    ///
    /// Nothing in this crate retries; this only informs the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PortalError::Timeout | PortalError::Connection { .. })
    }

    /// Returns true if this error means the whole login has to be redone.
    pub fn needs_reauth(&self) -> bool {
        matches!(
            self,
            PortalError::SessionExpired { .. }
                | PortalError::LoginFailed { .. }
                | PortalError::InvalidCredentials
        )
    }

    /// Short machine-readable name of the error kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PortalError::InvalidCredentials => "invalid_credentials",
            PortalError::LoginFailed { .. } => "login_failed",
            PortalError::SessionExpired { .. } => "session_expired",
            PortalError::ScrapeStructure { .. } => "scrape_structure",
            PortalError::MalformedData { .. } => "malformed_data",
            PortalError::Timeout => "timeout",
            PortalError::Connection { .. } => "connection",
            PortalError::Config { .. } => "config",
            PortalError::Unknown { .. } => "unknown",
        }
    }

    pub(crate) fn structure(message: impl Into<String>) -> Self {
        PortalError::ScrapeStructure {
            message: message.into(),
        }
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        PortalError::MalformedData {
            message: message.into(),
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        PortalError::Config {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for PortalError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PortalError::Timeout
        } else if err.is_connect() {
            PortalError::Connection {
                message: err.to_string(),
            }
        } else if let Some(status) = err.status() {
            PortalError::Unknown {
                message: format!("portal returned status {status}"),
            }
        } else {
            PortalError::Unknown {
                message: err.to_string(),
            }
        }
    }
}

impl From<url::ParseError> for PortalError {
    fn from(err: url::ParseError) -> Self {
        PortalError::Config {
            message: err.to_string(),
        }
    }
}

impl From<regex::Error> for PortalError {
    fn from(err: regex::Error) -> Self {
        PortalError::Config {
            message: err.to_string(),
        }
    }
}
