use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, info};

use super::calendar::calendar_link;
use super::countdown::{classify, days_remaining, format_countdown, format_due_date};
use super::domain::{
    parse_due_date, Deadline, DeadlineCategory, DeadlineEntry, DeadlineError, DeadlineId,
    UrgencyBand, UrgencyTone,
};
use super::notifications::{DeadlineNotification, NotificationGate};
use crate::storage::{load_json, save_json, SessionStore, StorageKey};

/// Presentation-ready snapshot of a single deadline at evaluation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeadlineView {
    pub id: DeadlineId,
    pub category: DeadlineCategory,
    pub label: &'static str,
    pub due_date: NaiveDate,
    pub due_label: String,
    pub days_remaining: i64,
    pub band: UrgencyBand,
    pub band_label: &'static str,
    pub tone: UrgencyTone,
    pub countdown: String,
    pub calendar_link: String,
}

impl DeadlineView {
    pub fn evaluate(deadline: &Deadline, today: NaiveDate) -> Self {
        let remaining = days_remaining(deadline.due_date, today);
        let band = classify(remaining);
        Self {
            id: deadline.id,
            category: deadline.category,
            label: deadline.category.label(),
            due_date: deadline.due_date,
            due_label: format_due_date(deadline.due_date),
            days_remaining: remaining,
            band,
            band_label: band.label(),
            tone: band.tone(),
            countdown: format_countdown(remaining),
            calendar_link: calendar_link(deadline),
        }
    }
}

/// Every deadline evaluated against one instant, soonest first.
#[derive(Debug, Clone, Serialize)]
pub struct DeadlineBoard {
    pub evaluated_at: NaiveDateTime,
    pub entries: Vec<DeadlineView>,
    pub next: Option<DeadlineView>,
    pub notifications: Vec<DeadlineNotification>,
}

impl DeadlineBoard {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count_in(&self, band: UrgencyBand) -> usize {
        self.entries.iter().filter(|entry| entry.band == band).count()
    }
}

/// Earliest due date; ties resolve to the entry inserted first.
pub fn next_deadline(deadlines: &[Deadline]) -> Option<&Deadline> {
    deadlines.iter().min_by_key(|deadline| deadline.due_date)
}

/// Stable ascending order by due date.
pub fn sorted_by_due_date(deadlines: &[Deadline]) -> Vec<&Deadline> {
    let mut sorted: Vec<&Deadline> = deadlines.iter().collect();
    sorted.sort_by_key(|deadline| deadline.due_date);
    sorted
}

/// Owns the session's deadline collection and its notification bookkeeping.
#[derive(Debug)]
pub struct DeadlineTracker<S> {
    store: Arc<S>,
    deadlines: Vec<Deadline>,
    gate: NotificationGate,
}

impl<S> DeadlineTracker<S>
where
    S: SessionStore,
{
    pub fn new(store: Arc<S>, started_at: NaiveDateTime, quiet_window: Duration) -> Self {
        Self {
            store,
            deadlines: Vec::new(),
            gate: NotificationGate::new(started_at, quiet_window),
        }
    }

    /// Rehydrates the collection previously persisted by [`Self::set_deadlines`].
    pub fn restore(
        store: Arc<S>,
        started_at: NaiveDateTime,
        quiet_window: Duration,
    ) -> Result<Self, DeadlineError> {
        let deadlines: Vec<Deadline> =
            load_json(store.as_ref(), StorageKey::Deadlines)?.unwrap_or_default();
        debug!(count = deadlines.len(), "restored deadlines from session store");

        Ok(Self {
            store,
            deadlines,
            gate: NotificationGate::new(started_at, quiet_window),
        })
    }

    /// Replaces the whole collection. Either every entry parses and the new set
    /// is persisted, or nothing changes.
    pub fn set_deadlines(&mut self, entries: &[DeadlineEntry]) -> Result<&[Deadline], DeadlineError> {
        let replacement = entries
            .iter()
            .map(|entry| {
                parse_due_date(&entry.due_date)
                    .map(|due_date| Deadline {
                        id: DeadlineId::generate(),
                        category: entry.category,
                        due_date,
                    })
                    .ok_or_else(|| DeadlineError::InvalidDate {
                        category: entry.category.label(),
                        value: entry.due_date.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        save_json(self.store.as_ref(), StorageKey::Deadlines, &replacement)?;
        self.deadlines = replacement;

        info!(count = self.deadlines.len(), "deadlines replaced");
        Ok(&self.deadlines)
    }

    pub fn deadlines(&self) -> &[Deadline] {
        &self.deadlines
    }

    pub fn next_deadline(&self) -> Option<&Deadline> {
        next_deadline(&self.deadlines)
    }

    /// Read-only snapshot for `now`; never raises notifications.
    pub fn board(&self, now: NaiveDateTime) -> DeadlineBoard {
        let today = now.date();
        let entries: Vec<DeadlineView> = sorted_by_due_date(&self.deadlines)
            .into_iter()
            .map(|deadline| DeadlineView::evaluate(deadline, today))
            .collect();

        DeadlineBoard {
            evaluated_at: now,
            next: entries.first().cloned(),
            entries,
            notifications: Vec::new(),
        }
    }

    /// Recomputes every band from scratch for `now` and collects the
    /// notifications due on this tick.
    pub fn evaluate(&mut self, now: NaiveDateTime) -> DeadlineBoard {
        let mut board = self.board(now);
        for view in &board.entries {
            if self.gate.admit(view.id, view.band, now) {
                board.notifications.push(DeadlineNotification {
                    deadline_id: view.id,
                    category: view.category,
                    due_date: view.due_date,
                    days_remaining: view.days_remaining,
                    message: format!("{} due {} ({})", view.label, view.due_label, view.countdown),
                });
            }
        }
        board
    }

    /// Drops the in-memory collection; the caller owns clearing the store.
    pub fn clear(&mut self) {
        self.deadlines.clear();
    }
}
