//! Dashboard parsing: the data CSRF token, the semester list and the student's name.

use super::error::PortalError;
use super::extract::{element_text, PageExtractor};
use super::types::{CsrfToken, Semester};
use scraper::{Html, Selector};
use std::sync::LazyLock;

// Tried in order, first hit wins
static CSRF_INPUT_SELECTORS: LazyLock<[Selector; 2]> = LazyLock::new(|| {
    [
        Selector::parse("input[name='csrf']").unwrap(),
        Selector::parse("input#csrf").unwrap(),
    ]
});
static CSRF_META_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta[name='csrf-token']").unwrap());
static BATCH_SELECT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("select#batchId").unwrap());
static ANY_SELECT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("select").unwrap());
static OPTION_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("option").unwrap());
static NAME_SELECTORS: LazyLock<[Selector; 2]> = LazyLock::new(|| {
    [
        Selector::parse("span.app-name-font").unwrap(),
        Selector::parse("span.student-name").unwrap(),
    ]
});

/// Dashboard contents before the username fallback is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardPage {
    pub csrf_token: CsrfToken,
    pub semesters: Vec<Semester>,
    /// Already title-cased; `None` when the page has no name element
    pub student_name: Option<String>,
}

/// Extraction strategy for the post-login dashboard.
#[derive(Debug, Default, Clone, Copy)]
pub struct DashboardExtractor;

impl PageExtractor for DashboardExtractor {
    type Output = DashboardPage;

    fn extract(&self, body: &str) -> Result<DashboardPage, PortalError> {
        let document = Html::parse_document(body);

        Ok(DashboardPage {
            csrf_token: parse_csrf_token(&document)?,
            semesters: parse_semesters(&document),
            student_name: parse_student_name(&document),
        })
    }
}

const CSRF_NOT_FOUND: &str = "Could not find CSRF token. The website structure may have changed.";

/// Finds the data CSRF token in an input field, or failing that a meta tag.
fn parse_csrf_token(document: &Html) -> Result<CsrfToken, PortalError> {
    let from_input = CSRF_INPUT_SELECTORS
        .iter()
        .find_map(|selector| document.select(selector).next())
        .map(|input| input.value().attr("value").unwrap_or_default());

    let token = match from_input {
        Some(value) => value,
        None => document
            .select(&CSRF_META_SELECTOR)
            .next()
            .map(|meta| meta.value().attr("content").unwrap_or_default())
            .ok_or_else(|| PortalError::structure(CSRF_NOT_FOUND))?,
    };

    if token.is_empty() {
        return Err(PortalError::structure("CSRF token is empty. Login may have failed."));
    }

    Ok(CsrfToken::new(token))
}

/// Collects the semester options, skipping placeholders without a value.
fn parse_semesters(document: &Html) -> Vec<Semester> {
    let select = document
        .select(&BATCH_SELECT_SELECTOR)
        .next()
        .or_else(|| document.select(&ANY_SELECT_SELECTOR).next());

    let Some(select) = select else {
        return Vec::new();
    };

    select
        .select(&OPTION_SELECTOR)
        .filter_map(|option| {
            let value = option.value().attr("value")?;
            if value.trim().is_empty() {
                return None;
            }

            Some(Semester {
                id: value.trim_matches('"').to_string(),
                name: element_text(&option),
            })
        })
        .collect()
}

fn parse_student_name(document: &Html) -> Option<String> {
    NAME_SELECTORS
        .iter()
        .find_map(|selector| document.select(selector).next())
        .map(|span| title_case(&element_text(&span)))
}

/// Upper-cases the first letter of every run of letters and lower-cases the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_is_letter = false;

    for c in text.chars() {
        if previous_is_letter {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        previous_is_letter = c.is_alphabetic();
    }

    out
}
