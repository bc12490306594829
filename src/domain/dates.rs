//! Date parsing for user input and photo file names

use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum DateError {
    #[error("Unrecognized date: '{0}' (try YYYY-MM-DD)")]
    Unparseable(String),
}

/// Accepted input formats, tried in order
const INPUT_FORMATS: [&str; 9] = [
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%d-%m-%Y",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%d %b %Y",
];

/// Parses a date written in any of the accepted formats
pub fn parse_date(input: &str) -> Result<NaiveDate, DateError> {
    let trimmed = input.trim();
    INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| DateError::Unparseable(input.to_string()))
}

#[derive(Clone, Copy)]
enum FieldOrder {
    YearFirst,
    DayFirst,
}

fn filename_patterns() -> &'static [(Regex, FieldOrder)] {
    static PATTERNS: OnceLock<Vec<(Regex, FieldOrder)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            (r"([0-9]{4})([0-9]{2})([0-9]{2})", FieldOrder::YearFirst),
            (r"([0-9]{4})-([0-9]{2})-([0-9]{2})", FieldOrder::YearFirst),
            (r"([0-9]{4})_([0-9]{2})_([0-9]{2})", FieldOrder::YearFirst),
            (r"([0-9]{2})-([0-9]{2})-([0-9]{4})", FieldOrder::DayFirst),
            (r"([0-9]{2})_([0-9]{2})_([0-9]{4})", FieldOrder::DayFirst),
        ]
        .into_iter()
        .filter_map(|(pattern, order)| Regex::new(pattern).ok().map(|re| (re, order)))
        .collect()
    })
}

/// Finds a date embedded in a file name such as `IMG_20260115.jpg`.
///
/// Each pattern is tried once, at its first match; dates outside
/// 2000..=2100 are ignored.
pub fn date_from_filename(name: &str) -> Option<NaiveDate> {
    filename_patterns().iter().find_map(|(re, order)| {
        let caps = re.captures(name)?;
        let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());

        let (year, month, day) = match order {
            FieldOrder::YearFirst => (field(1)?, field(2)?, field(3)?),
            FieldOrder::DayFirst => (field(3)?, field(2)?, field(1)?),
        };

        NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)
            .filter(|d| (2000..=2100).contains(&d.year()))
    })
}
