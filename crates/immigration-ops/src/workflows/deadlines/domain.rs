use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::storage::StorageError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadlineCategory {
    Submission,
    Biometrics,
    Decision,
    Appeal,
}

impl DeadlineCategory {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Submission,
            Self::Biometrics,
            Self::Decision,
            Self::Appeal,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Submission => "Application Submission",
            Self::Biometrics => "Biometrics Appointment",
            Self::Decision => "Decision Expected",
            Self::Appeal => "Appeal Deadline",
        }
    }

    /// Intake form field carrying this milestone's date.
    pub const fn intake_field(self) -> &'static str {
        match self {
            Self::Submission => "deadline1",
            Self::Biometrics => "deadline2",
            Self::Decision => "deadline3",
            Self::Appeal => "deadline4",
        }
    }

    /// Accepts the snake_case key or the display label, ignoring case.
    pub fn parse(raw: &str) -> Option<Self> {
        let needle = raw.trim();
        Self::ordered().into_iter().find(|category| {
            let key = match category {
                Self::Submission => "submission",
                Self::Biometrics => "biometrics",
                Self::Decision => "decision",
                Self::Appeal => "appeal",
            };
            needle.eq_ignore_ascii_case(key) || needle.eq_ignore_ascii_case(category.label())
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeadlineId(pub Uuid);

impl DeadlineId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for DeadlineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deadline {
    pub id: DeadlineId,
    pub category: DeadlineCategory,
    pub due_date: NaiveDate,
}

/// Unparsed milestone as captured on the intake form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlineEntry {
    pub category: DeadlineCategory,
    pub due_date: String,
}

impl DeadlineEntry {
    pub fn new(category: DeadlineCategory, due_date: impl Into<String>) -> Self {
        Self {
            category,
            due_date: due_date.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyBand {
    Overdue,
    Critical,
    Warning,
    Normal,
}

impl UrgencyBand {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Overdue => "Overdue",
            Self::Critical => "Critical",
            Self::Warning => "Warning",
            Self::Normal => "Normal",
        }
    }

    /// Overdue and critical share the red treatment.
    pub const fn tone(self) -> UrgencyTone {
        match self {
            Self::Overdue | Self::Critical => UrgencyTone::Red,
            Self::Warning => UrgencyTone::Amber,
            Self::Normal => UrgencyTone::Green,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyTone {
    Red,
    Amber,
    Green,
}

#[derive(Debug, thiserror::Error)]
pub enum DeadlineError {
    #[error("{category} date '{value}' is not a valid calendar date (expected YYYY-MM-DD)")]
    InvalidDate { category: &'static str, value: String },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Parses a due date, discarding any time-of-day component.
pub fn parse_due_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|moment| moment.date())
        })
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|moment| moment.date_naive())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_due_date_truncates_time_components() {
        let expected = NaiveDate::from_ymd_opt(2025, 12, 15).expect("valid date");
        assert_eq!(parse_due_date("2025-12-15"), Some(expected));
        assert_eq!(parse_due_date(" 2025-12-15T23:59:59 "), Some(expected));
        assert_eq!(parse_due_date("2025-12-15T08:30:00+01:00"), Some(expected));
    }

    #[test]
    fn parse_due_date_rejects_impossible_dates() {
        assert_eq!(parse_due_date("2025-02-30"), None);
        assert_eq!(parse_due_date("next tuesday"), None);
        assert_eq!(parse_due_date(""), None);
    }

    #[test]
    fn category_parse_accepts_keys_and_labels() {
        assert_eq!(
            DeadlineCategory::parse("biometrics"),
            Some(DeadlineCategory::Biometrics)
        );
        assert_eq!(
            DeadlineCategory::parse("appeal deadline"),
            Some(DeadlineCategory::Appeal)
        );
        assert_eq!(DeadlineCategory::parse("interview"), None);
    }

    #[test]
    fn critical_and_overdue_share_tone() {
        assert_eq!(UrgencyBand::Overdue.tone(), UrgencyBand::Critical.tone());
        assert_ne!(UrgencyBand::Warning.tone(), UrgencyBand::Normal.tone());
    }
}
