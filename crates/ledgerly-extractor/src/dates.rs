//! Date parsing for model output
//!
//! Formats are tried in order and the first match wins. Four-digit-year
//! formats only accept years in [`MIN_YEAR`, `MAX_YEAR`]; chrono's `%Y`
//! happily reads "25" as year 25, so without the bound a two-digit year
//! would never reach the `%y` fallbacks.

use chrono::{Datelike, NaiveDate};

/// Earliest year accepted from a four-digit-year format
pub const MIN_YEAR: i32 = 1900;

/// Latest year accepted from a four-digit-year format
pub const MAX_YEAR: i32 = 2100;

const FOUR_DIGIT_YEAR_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%Y/%m/%d",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];

const TWO_DIGIT_YEAR_FORMATS: &[&str] = &["%m/%d/%y", "%m-%d-%y"];

/// Parse a statement date, returning `None` when no format matches
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    let four_digit = FOUR_DIGIT_YEAR_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .find(|d| (MIN_YEAR..=MAX_YEAR).contains(&d.year()));

    four_digit.or_else(|| {
        TWO_DIGIT_YEAR_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
    })
}
