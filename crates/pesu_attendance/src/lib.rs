//! Scrapes attendance, calendar and timetable data from PESU Academy and
//! serves it as a small JSON API.

pub mod portal;
pub mod server;
pub mod types;
