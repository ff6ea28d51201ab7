//! Case milestone tracking: urgency banding, countdown text, calendar links,
//! and at-most-once alerts for deadlines entering the critical window.

pub mod calendar;
pub mod countdown;
pub mod domain;
pub mod notifications;
pub mod scheduler;
pub mod tracker;

pub use calendar::calendar_link;
pub use countdown::{classify, days_remaining, days_remaining_at, format_countdown, format_due_date};
pub use domain::{
    parse_due_date, Deadline, DeadlineCategory, DeadlineEntry, DeadlineError, DeadlineId,
    UrgencyBand, UrgencyTone,
};
pub use notifications::{
    DeadlineNotification, NotificationError, NotificationGate, NotificationPublisher,
    TracingNotifier,
};
pub use scheduler::{Clock, Reevaluate, ReevaluationScheduler, SystemClock};
pub use tracker::{next_deadline, sorted_by_due_date, DeadlineBoard, DeadlineTracker, DeadlineView};
