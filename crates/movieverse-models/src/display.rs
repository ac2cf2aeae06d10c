//! Human-readable renderings shared by every front-end.

use chrono::{Datelike, NaiveDate};

pub const NOT_AVAILABLE: &str = "N/A";
pub const TO_BE_ANNOUNCED: &str = "TBA";

/// One decimal place; the catalog reports `0` for unrated titles, which
/// reads as "N/A" just like a missing value.
pub fn format_rating(vote_average: Option<f64>) -> String {
    match vote_average {
        Some(rating) if rating > 0.0 => format!("{:.1}", rating),
        _ => NOT_AVAILABLE.to_string(),
    }
}

pub fn format_year(release_date: Option<NaiveDate>) -> String {
    match release_date {
        Some(date) => date.year().to_string(),
        None => TO_BE_ANNOUNCED.to_string(),
    }
}

pub fn format_runtime(minutes: Option<u32>) -> String {
    match minutes {
        Some(minutes) if minutes > 0 => format!("{}h {}m", minutes / 60, minutes % 60),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Whole US dollars with thousands separators, e.g. `$63,000,000`.
pub fn format_currency(amount: Option<u64>) -> String {
    match amount {
        Some(amount) if amount > 0 => format!("${}", group_thousands(amount)),
        _ => NOT_AVAILABLE.to_string(),
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
