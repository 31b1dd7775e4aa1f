//! Best-effort normalization of the dates typed into the editorial sheet.
//!
//! Two shapes are recognised: numeric `DD/MM/YYYY`, and the French long form
//! `[weekday] day month-name year` (e.g. `jeudi 12 février 2026`). Anything
//! else is passed through untouched so a single odd cell never stops a run.

use chrono::NaiveDate;
use std::fmt;

const CANONICAL_FORMAT: &str = "%Y-%m-%d";

/// Outcome of [`parse_date`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedDate {
    Canonical(NaiveDate),
    /// The input could not be read as a date and is kept verbatim
    Passthrough(String),
}

impl NormalizedDate {
    pub fn is_canonical(&self) -> bool {
        matches!(self, NormalizedDate::Canonical(_))
    }

    pub fn into_string(self) -> String {
        match self {
            NormalizedDate::Canonical(date) => date.format(CANONICAL_FORMAT).to_string(),
            NormalizedDate::Passthrough(raw) => raw,
        }
    }
}

impl fmt::Display for NormalizedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizedDate::Canonical(date) => write!(f, "{}", date.format(CANONICAL_FORMAT)),
            NormalizedDate::Passthrough(raw) => f.write_str(raw),
        }
    }
}

/// Normalize `raw` to `YYYY-MM-DD`, or return it unchanged.
pub fn normalize(raw: &str) -> String {
    parse_date(raw).into_string()
}

pub fn parse_date(raw: &str) -> NormalizedDate {
    parse_numeric(raw)
        .or_else(|| parse_textual(raw))
        .map(NormalizedDate::Canonical)
        .unwrap_or_else(|| NormalizedDate::Passthrough(raw.to_string()))
}

/// Strict `DD/MM/YYYY`; day and month may omit the leading zero.
fn parse_numeric(raw: &str) -> Option<NaiveDate> {
    let mut parts = raw.split('/');
    let (day, month, year) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let day = parse_digits(day, 1..=2)?;
    let month = parse_digits(month, 1..=2)?;
    let year = parse_digits(year, 4..=4)?;
    NaiveDate::from_ymd_opt(year as i32, month, day)
}

fn parse_textual(raw: &str) -> Option<NaiveDate> {
    let lowered = raw.to_lowercase();
    let mut tokens: Vec<&str> = lowered.split_whitespace().collect();
    if tokens.len() == 4 {
        // leading weekday name
        tokens.remove(0);
    }
    let [day, month, year] = tokens.as_slice() else {
        return None;
    };

    let day = parse_day_token(day)?;
    let month = month_number(month)?;
    let year = parse_digits(year, 4..=4)?;
    NaiveDate::from_ymd_opt(year as i32, month, day)
}

/// Day of month, accepting the ordinal `1er`.
fn parse_day_token(token: &str) -> Option<u32> {
    let token = token.strip_suffix("er").unwrap_or(token);
    parse_digits(token, 1..=2)
}

fn parse_digits(token: &str, width: std::ops::RangeInclusive<usize>) -> Option<u32> {
    if !width.contains(&token.len()) || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

fn month_number(name: &str) -> Option<u32> {
    let month = match name {
        "janvier" => 1,
        "février" | "fevrier" => 2,
        "mars" => 3,
        "avril" => 4,
        "mai" => 5,
        "juin" => 6,
        "juillet" => 7,
        "août" | "aout" => 8,
        "septembre" => 9,
        "octobre" => 10,
        "novembre" => 11,
        "décembre" | "decembre" => 12,
        _ => return None,
    };
    Some(month)
}
