//! Shared pieces for the per-page extraction strategies.
//!
//! Each page type the portal serves gets its own [`PageExtractor`]. When the
//! portal changes a page's markup, only that page's extractor has to change.

use super::config::ScriptMarker;
use super::error::PortalError;
use regex::Regex;
use scraper::ElementRef;

/// Turns the body of one kind of portal page into structured data.
pub trait PageExtractor {
    type Output;

    fn extract(&self, body: &str) -> Result<Self::Output, PortalError>;
}

/// All text below an element, trimmed.
pub(crate) fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Finds the literal sitting between a script marker's prefix and suffix.
///
/// The match is the shortest one and may span lines.
#[derive(Debug, Clone)]
pub(crate) struct ScriptLiteral {
    regex: Regex,
}

impl ScriptLiteral {
    pub(crate) fn new(marker: &ScriptMarker) -> Result<Self, PortalError> {
        let pattern = format!(
            "(?s){}(.*?){}",
            regex::escape(&marker.prefix),
            regex::escape(&marker.suffix)
        );

        Ok(Self {
            regex: Regex::new(&pattern)?,
        })
    }

    pub(crate) fn find<'h>(&self, body: &'h str) -> Option<&'h str> {
        self.regex
            .captures(body)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}
