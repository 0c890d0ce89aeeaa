//! Calendar page parsing. The events live in a JSON string handed to
//! `JSON.parse` inside an inline script.

use super::config::ScriptMarker;
use super::error::PortalError;
use super::extract::{PageExtractor, ScriptLiteral};
use serde_json::Value;

const CALENDAR_NOT_FOUND: &str =
    "Could not find calendar data. The website structure may have changed.";

/// Extraction strategy for the academic calendar page.
#[derive(Debug, Clone)]
pub struct CalendarExtractor {
    literal: ScriptLiteral,
}

impl CalendarExtractor {
    pub fn new(marker: &ScriptMarker) -> Result<Self, PortalError> {
        Ok(Self {
            literal: ScriptLiteral::new(marker)?,
        })
    }
}

impl PageExtractor for CalendarExtractor {
    type Output = Value;

    fn extract(&self, body: &str) -> Result<Value, PortalError> {
        let raw = self
            .literal
            .find(body)
            .ok_or_else(|| PortalError::structure(CALENDAR_NOT_FOUND))?;

        serde_json::from_str(raw).map_err(|e| PortalError::malformed(format!("calendar JSON: {e}")))
    }
}
