//! Timetable page parsing.
//!
//! The page embeds two script variables:
//! 1. a slot template, an array of `{orderedBy, startTime, endTime}`
//! 2. a sparse schedule object keyed `ttDivText_<day>_<slot>`, each value an
//!    array whose head is `ttSubject&&<code>-<name>`
//!
//! The schedule is inverted into subject code -> weekday -> time ranges.

use super::config::ScrapeMarkers;
use super::error::PortalError;
use super::extract::{PageExtractor, ScriptLiteral};
use super::types::{SubjectSchedule, Timetable};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Day index 1..=6 maps onto these. There is no Sunday.
const WEEKDAYS: [&str; 6] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

const TIMETABLE_NOT_FOUND: &str =
    "Could not find timetable data. The website structure may have changed.";

/// Reads one slot template entry as `(orderedBy, "start - end")`.
///
/// Entries without an integer order or without string times (break rows)
/// yield `None`.
fn slot_time(slot: &Value) -> Option<(i64, String)> {
    let ordered_by = slot.get("orderedBy")?.as_i64()?;
    let start = slot.get("startTime")?.as_str()?;
    let end = slot.get("endTime")?.as_str()?;
    Some((ordered_by, format!("{start} - {end}")))
}

/// Extraction strategy for the timetable page.
#[derive(Debug, Clone)]
pub struct TimetableExtractor {
    slots: ScriptLiteral,
    schedule: ScriptLiteral,
    key_prefix: String,
    subject_prefix: String,
}

impl TimetableExtractor {
    pub fn new(markers: &ScrapeMarkers) -> Result<Self, PortalError> {
        Ok(Self {
            slots: ScriptLiteral::new(&markers.timetable_slots)?,
            schedule: ScriptLiteral::new(&markers.timetable_schedule)?,
            key_prefix: markers.schedule_key_prefix.clone(),
            subject_prefix: markers.subject_prefix.clone(),
        })
    }

    /// Parses `<prefix><day>_<slot>` into `(day, slot)`.
    fn parse_key(&self, key: &str) -> Option<(usize, i64)> {
        let rest = key.strip_prefix(&self.key_prefix)?;
        let mut parts = rest.split('_');
        let day = parts.next()?.parse().ok()?;
        let slot = parts.next()?.parse().ok()?;
        Some((day, slot))
    }

    /// Splits the subject info at the head of a schedule value into `(code, name)`.
    fn parse_subject(&self, value: &Value) -> Option<(String, String)> {
        let info = value.as_array()?.first()?.as_str()?;
        let info = info.replace(&self.subject_prefix, "");

        Some(match info.split_once('-') {
            Some((code, name)) => (code.to_string(), name.to_string()),
            None => (info, String::new()),
        })
    }
}

impl PageExtractor for TimetableExtractor {
    type Output = Timetable;

    fn extract(&self, body: &str) -> Result<Timetable, PortalError> {
        let (Some(raw_slots), Some(raw_schedule)) =
            (self.slots.find(body), self.schedule.find(body))
        else {
            return Err(PortalError::structure(TIMETABLE_NOT_FOUND));
        };

        let slots: Vec<Value> = serde_json::from_str(raw_slots)
            .map_err(|e| PortalError::malformed(format!("timetable slots JSON: {e}")))?;
        let schedule: IndexMap<String, Value> = serde_json::from_str(raw_schedule)
            .map_err(|e| PortalError::malformed(format!("timetable schedule JSON: {e}")))?;

        let slot_times: HashMap<i64, String> = slots
            .iter()
            .filter_map(|slot| {
                let time = slot_time(slot);
                if time.is_none() {
                    debug!(slot = %slot, "Skipping timetable slot without order or times");
                }
                time
            })
            .collect();

        let mut timetable = Timetable::new();

        for (key, value) in &schedule {
            let Some((day, slot)) = self.parse_key(key) else {
                continue;
            };

            let Some(day_name) = day.checked_sub(1).and_then(|i| WEEKDAYS.get(i)) else {
                continue;
            };

            let Some(class_time) = slot_times.get(&slot) else {
                continue;
            };

            let Some((code, name)) = self.parse_subject(value) else {
                debug!(key = %key, "Skipping timetable entry without subject info");
                continue;
            };

            timetable
                .entry(code)
                .or_insert_with(|| SubjectSchedule {
                    name,
                    schedule: IndexMap::new(),
                })
                .schedule
                .entry(day_name.to_string())
                .or_default()
                .push(class_time.clone());
        }

        Ok(timetable)
    }
}
