use std::collections::HashSet;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::warn;

use super::domain::{DeadlineCategory, DeadlineId, UrgencyBand};

/// One-shot alert raised when a deadline is first seen in the critical band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeadlineNotification {
    pub deadline_id: DeadlineId,
    pub category: DeadlineCategory,
    pub due_date: NaiveDate,
    pub days_remaining: i64,
    pub message: String,
}

/// Session-scoped at-most-once bookkeeping keyed by deadline identity.
///
/// A deadline that turns critical inside the startup quiet window is marked as
/// handled without emitting, so it never fires later in the session either.
#[derive(Debug, Clone)]
pub struct NotificationGate {
    started_at: NaiveDateTime,
    quiet_window: Duration,
    handled: HashSet<DeadlineId>,
}

impl NotificationGate {
    pub fn new(started_at: NaiveDateTime, quiet_window: Duration) -> Self {
        Self {
            started_at,
            quiet_window,
            handled: HashSet::new(),
        }
    }

    pub fn in_quiet_window(&self, now: NaiveDateTime) -> bool {
        match now.signed_duration_since(self.started_at).to_std() {
            Ok(elapsed) => elapsed < self.quiet_window,
            Err(_) => true,
        }
    }

    /// Returns true when a notification should be emitted for `id` right now.
    pub fn admit(&mut self, id: DeadlineId, band: UrgencyBand, now: NaiveDateTime) -> bool {
        if band != UrgencyBand::Critical {
            return false;
        }
        if !self.handled.insert(id) {
            return false;
        }
        !self.in_quiet_window(now)
    }

    pub fn has_handled(&self, id: &DeadlineId) -> bool {
        self.handled.contains(id)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Outbound hook for urgent-deadline alerts (toast, e-mail, chat adapters).
pub trait NotificationPublisher: Send + Sync {
    fn publish(&self, notification: &DeadlineNotification) -> Result<(), NotificationError>;
}

/// Emits alerts as structured log events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl NotificationPublisher for TracingNotifier {
    fn publish(&self, notification: &DeadlineNotification) -> Result<(), NotificationError> {
        warn!(
            deadline = %notification.deadline_id,
            category = notification.category.label(),
            due = %notification.due_date,
            days_remaining = notification.days_remaining,
            "{}",
            notification.message
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 12, 10)
            .and_then(|date| date.and_hms_opt(9, 0, 0))
            .expect("valid start")
    }

    #[test]
    fn admits_each_identity_once() {
        let mut gate = NotificationGate::new(start(), Duration::from_secs(60));
        let id = DeadlineId::generate();
        let later = start() + chrono::Duration::minutes(5);

        assert!(gate.admit(id, UrgencyBand::Critical, later));
        assert!(!gate.admit(id, UrgencyBand::Critical, later));
        assert!(!gate.admit(id, UrgencyBand::Critical, later + chrono::Duration::days(1)));
    }

    #[test]
    fn ignores_non_critical_bands_without_consuming() {
        let mut gate = NotificationGate::new(start(), Duration::from_secs(60));
        let id = DeadlineId::generate();
        let later = start() + chrono::Duration::minutes(5);

        assert!(!gate.admit(id, UrgencyBand::Warning, later));
        assert!(!gate.admit(id, UrgencyBand::Overdue, later));
        assert!(!gate.has_handled(&id));
        assert!(gate.admit(id, UrgencyBand::Critical, later));
    }

    #[test]
    fn quiet_window_suppresses_and_consumes() {
        let mut gate = NotificationGate::new(start(), Duration::from_secs(60));
        let id = DeadlineId::generate();

        assert!(!gate.admit(id, UrgencyBand::Critical, start() + chrono::Duration::seconds(59)));
        assert!(gate.has_handled(&id));
        assert!(!gate.admit(id, UrgencyBand::Critical, start() + chrono::Duration::minutes(2)));
    }

    #[test]
    fn quiet_window_ends_exactly_at_its_length() {
        let gate = NotificationGate::new(start(), Duration::from_secs(60));
        assert!(gate.in_quiet_window(start()));
        assert!(gate.in_quiet_window(start() - chrono::Duration::seconds(1)));
        assert!(!gate.in_quiet_window(start() + chrono::Duration::seconds(60)));
    }
}
