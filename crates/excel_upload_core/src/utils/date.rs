//! Serde helpers for the backend's `YYYY-MM-DD` dates.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn format(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse(s: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
}

/// Deserialize NaiveDate from "YYYY-MM-DD" string. Used with
/// `#[serde(deserialize_with = "crate::utils::date::deserialize")]`.
pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse(&s).map_err(serde::de::Error::custom)
}
