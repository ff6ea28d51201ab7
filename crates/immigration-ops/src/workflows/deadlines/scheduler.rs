use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

use super::notifications::NotificationPublisher;
use super::tracker::{DeadlineBoard, DeadlineTracker};
use crate::storage::SessionStore;

/// Source of local wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Anything holding deadlines that can be re-banded for a given instant.
pub trait Reevaluate: Send {
    fn reevaluate(&mut self, now: NaiveDateTime) -> DeadlineBoard;
}

impl<S> Reevaluate for DeadlineTracker<S>
where
    S: SessionStore,
{
    fn reevaluate(&mut self, now: NaiveDateTime) -> DeadlineBoard {
        self.evaluate(now)
    }
}

/// Periodically re-evaluates a shared target and forwards newly urgent
/// deadlines to a publisher.
#[derive(Debug, Clone)]
pub struct ReevaluationScheduler<C> {
    interval: Duration,
    clock: C,
}

impl<C> ReevaluationScheduler<C>
where
    C: Clock + 'static,
{
    pub fn new(interval: Duration, clock: C) -> Self {
        Self { interval, clock }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs one evaluation pass and publishes its notifications.
    pub fn tick<T, P>(&self, target: &Mutex<T>, publisher: &P) -> Option<DeadlineBoard>
    where
        T: Reevaluate,
        P: NotificationPublisher + ?Sized,
    {
        let now = self.clock.now();
        let board = match target.lock() {
            Ok(mut guard) => guard.reevaluate(now),
            Err(_) => {
                warn!("deadline target lock poisoned; skipping tick");
                return None;
            }
        };

        for notification in &board.notifications {
            if let Err(err) = publisher.publish(notification) {
                warn!(error = %err, deadline = %notification.deadline_id, "failed to publish deadline notification");
            }
        }
        debug!(
            evaluated_at = %board.evaluated_at,
            entries = board.entries.len(),
            notified = board.notifications.len(),
            "deadline tick complete"
        );
        Some(board)
    }

    /// Spawns the tick loop; the first tick fires immediately.
    pub fn spawn<T, P>(self, target: Arc<Mutex<T>>, publisher: Arc<P>) -> JoinHandle<()>
    where
        T: Reevaluate + 'static,
        P: NotificationPublisher + ?Sized + 'static,
    {
        tokio::spawn(async move {
            let mut ticker = time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.tick(target.as_ref(), publisher.as_ref());
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemorySessionStore;
    use crate::workflows::deadlines::notifications::{DeadlineNotification, NotificationError};
    use crate::workflows::deadlines::{DeadlineCategory, DeadlineEntry, UrgencyBand};
    use chrono::NaiveDate;
    use tokio::time::Instant;

    struct PausedClock {
        base: NaiveDateTime,
        origin: Instant,
    }

    impl Clock for PausedClock {
        fn now(&self) -> NaiveDateTime {
            let elapsed = chrono::Duration::from_std(self.origin.elapsed())
                .unwrap_or_else(|_| chrono::Duration::zero());
            self.base + elapsed
        }
    }

    #[derive(Default)]
    struct RecordingPublisher {
        seen: Mutex<Vec<DeadlineNotification>>,
    }

    impl NotificationPublisher for RecordingPublisher {
        fn publish(&self, notification: &DeadlineNotification) -> Result<(), NotificationError> {
            self.seen
                .lock()
                .expect("publisher lock")
                .push(notification.clone());
            Ok(())
        }
    }

    fn base() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 12, 7)
            .and_then(|date| date.and_hms_opt(23, 59, 0))
            .expect("valid base")
    }

    #[tokio::test(start_paused = true)]
    async fn crossing_midnight_promotes_band_and_notifies_once() {
        let mut tracker = DeadlineTracker::new(
            Arc::new(InMemorySessionStore::new()),
            base(),
            Duration::from_secs(30),
        );
        tracker
            .set_deadlines(&[DeadlineEntry::new(DeadlineCategory::Submission, "2025-12-15")])
            .expect("valid deadline");
        let target = Arc::new(Mutex::new(tracker));
        let publisher = Arc::new(RecordingPublisher::default());

        let clock = PausedClock {
            base: base(),
            origin: Instant::now(),
        };
        let scheduler = ReevaluationScheduler::new(Duration::from_secs(60), clock);

        let before = scheduler
            .tick(target.as_ref(), publisher.as_ref())
            .expect("board");
        assert_eq!(before.entries[0].band, UrgencyBand::Warning);
        assert_eq!(before.entries[0].days_remaining, 8);

        time::advance(Duration::from_secs(60)).await;
        let after = scheduler
            .tick(target.as_ref(), publisher.as_ref())
            .expect("board");
        assert_eq!(after.entries[0].band, UrgencyBand::Critical);
        assert_eq!(after.entries[0].days_remaining, 7);
        assert_eq!(after.notifications.len(), 1);

        time::advance(Duration::from_secs(60)).await;
        let again = scheduler
            .tick(target.as_ref(), publisher.as_ref())
            .expect("board");
        assert_eq!(again.entries[0].band, UrgencyBand::Critical);
        assert!(again.notifications.is_empty());

        assert_eq!(publisher.seen.lock().expect("publisher lock").len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_loop_ticks_on_interval() {
        let mut tracker = DeadlineTracker::new(
            Arc::new(InMemorySessionStore::new()),
            base(),
            Duration::from_secs(30),
        );
        tracker
            .set_deadlines(&[DeadlineEntry::new(DeadlineCategory::Biometrics, "2025-12-15")])
            .expect("valid deadline");
        let target = Arc::new(Mutex::new(tracker));
        let publisher = Arc::new(RecordingPublisher::default());

        let clock = PausedClock {
            base: base(),
            origin: Instant::now(),
        };
        let handle = ReevaluationScheduler::new(Duration::from_secs(60), clock)
            .spawn(target.clone(), publisher.clone());

        for _ in 0..4 {
            time::sleep(Duration::from_secs(60)).await;
        }
        handle.abort();

        let seen = publisher.seen.lock().expect("publisher lock");
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].category, DeadlineCategory::Biometrics);
    }
}
