//! Login form parsing and login response classification.

use super::config::ScrapeMarkers;
use super::error::PortalError;
use super::extract::PageExtractor;
use super::types::LoginToken;
use scraper::{Html, Selector};
use std::sync::LazyLock;

static LOGIN_CSRF_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("input[name='_csrf']").unwrap());

const LOGIN_CSRF_NOT_FOUND: &str =
    "Could not find login CSRF token. The website may be down or changed.";

/// Pulls the `_csrf` hidden field out of the login page.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoginPageExtractor;

impl PageExtractor for LoginPageExtractor {
    type Output = LoginToken;

    fn extract(&self, body: &str) -> Result<LoginToken, PortalError> {
        let document = Html::parse_document(body);

        let input = document
            .select(&LOGIN_CSRF_SELECTOR)
            .next()
            .ok_or_else(|| PortalError::structure(LOGIN_CSRF_NOT_FOUND))?;

        match input.value().attr("value") {
            Some(value) if !value.is_empty() => Ok(LoginToken::new(value)),
            _ => Err(PortalError::structure("Login CSRF token is empty.")),
        }
    }
}

/// Decides whether the response to the credentials POST means we are logged in.
///
/// - `body`: the body after redirects were followed
/// - `final_url`: where the redirects ended up
/// - `has_cookies`: whether the cookie jar holds anything for the portal
pub fn classify_login_response(
    markers: &ScrapeMarkers,
    body: &str,
    final_url: &str,
    has_cookies: bool,
) -> Result<(), PortalError> {
    if markers
        .bad_credentials
        .iter()
        .any(|marker| body.contains(marker.as_str()))
    {
        return Err(PortalError::InvalidCredentials);
    }

    let url = final_url.to_lowercase();
    if url.contains("login") && url.contains("error") {
        return Err(PortalError::LoginFailed {
            message: "Please check your credentials.".to_string(),
        });
    }

    if !has_cookies {
        return Err(PortalError::LoginFailed {
            message: "No session created.".to_string(),
        });
    }

    Ok(())
}
