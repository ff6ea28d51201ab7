use chrono::{NaiveDate, NaiveDateTime};

use super::domain::UrgencyBand;

const CRITICAL_WINDOW_DAYS: i64 = 7;
const WARNING_WINDOW_DAYS: i64 = 30;

/// Whole calendar days from `as_of` until `due_date`; negative once overdue.
pub fn days_remaining(due_date: NaiveDate, as_of: NaiveDate) -> i64 {
    due_date.signed_duration_since(as_of).num_days()
}

/// Same as [`days_remaining`], truncating the wall-clock instant to its date first.
pub fn days_remaining_at(due_date: NaiveDate, now: NaiveDateTime) -> i64 {
    days_remaining(due_date, now.date())
}

pub fn classify(days_remaining: i64) -> UrgencyBand {
    match days_remaining {
        i64::MIN..=-1 => UrgencyBand::Overdue,
        0..=CRITICAL_WINDOW_DAYS => UrgencyBand::Critical,
        8..=WARNING_WINDOW_DAYS => UrgencyBand::Warning,
        _ => UrgencyBand::Normal,
    }
}

pub fn format_countdown(days_remaining: i64) -> String {
    match days_remaining {
        0 => "Today!".to_string(),
        1 => "1 day remaining".to_string(),
        n if n < 0 => format!("{} days overdue", n.unsigned_abs()),
        n => format!("{n} days remaining"),
    }
}

/// Short en-GB rendering, e.g. `15 Dec 2025`.
pub fn format_due_date(date: NaiveDate) -> String {
    date.format("%-d %b %Y").to_string()
}
