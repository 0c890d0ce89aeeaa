//! Attendance table parsing.

use super::error::PortalError;
use super::extract::{element_text, PageExtractor};
use super::types::CourseAttendance;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

/// Form field names of the attendance POST.
pub const FIELD_CONTROLLER_MODE: &str = "controllerMode";
pub const FIELD_ACTION_TYPE: &str = "actionType";
pub const FIELD_BATCH_CLASS_ID: &str = "batchClassId";
pub const FIELD_MENU_ID: &str = "menuId";

static ROW_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static CELL_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());

/// Extraction strategy for the attendance summary table.
///
/// Never fails: rows that don't look like `code | name | a/b | pct` are left out.
#[derive(Debug, Default, Clone, Copy)]
pub struct AttendanceExtractor;

impl PageExtractor for AttendanceExtractor {
    type Output = Vec<CourseAttendance>;

    fn extract(&self, body: &str) -> Result<Vec<CourseAttendance>, PortalError> {
        let document = Html::parse_document(body);

        Ok(document
            .select(&ROW_SELECTOR)
            .filter_map(|row| parse_attendance_row(&row))
            .collect())
    }
}

/// Parses a single table row, or `None` if it isn't a course row.
fn parse_attendance_row(row: &ElementRef) -> Option<CourseAttendance> {
    let cells: Vec<String> = row
        .select(&CELL_SELECTOR)
        .map(|cell| element_text(&cell))
        .collect();

    let [code, name, ratio, percentage] = cells.as_slice() else {
        return None;
    };

    let (attended, total) = parse_ratio(ratio)?;
    let percentage = percentage.parse().ok()?;

    Some(CourseAttendance {
        code: code.clone(),
        name: name.clone(),
        attended,
        total,
        percentage,
    })
}

/// Parses `"42/50"` into `(42, 50)`. Anything but exactly two integers is rejected.
fn parse_ratio(text: &str) -> Option<(u32, u32)> {
    let mut parts = text.split('/');
    let attended = parts.next()?.trim().parse().ok()?;
    let total = parts.next()?.trim().parse().ok()?;

    if parts.next().is_some() {
        return None;
    }

    Some((attended, total))
}
