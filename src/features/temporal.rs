//! Calendar handling for game dates

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::{HoopsError, Result};

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parse a game date; a time component, if present, is dropped
pub fn parse_game_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(input, fmt) {
            return Ok(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, fmt) {
            return Ok(dt.date());
        }
    }
    Err(HoopsError::InvalidDate(input.to_string()))
}

/// Weekday code, Monday = 0 .. Sunday = 6
pub fn day_code(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_monday() as u8
}

/// ISO representation used in listings and the web form
pub fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
