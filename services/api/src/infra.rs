use chrono::{Local, NaiveDate, NaiveDateTime};
use immigration_ops::error::AppError;
use immigration_ops::storage::{InMemorySessionStore, StorageError};
use immigration_ops::workflows::cases::CaseStoreClient;
use immigration_ops::workflows::deadlines::{parse_due_date, DeadlineCategory, DeadlineEntry};
use immigration_ops::workflows::documents::VisaRoute;
use immigration_ops::workflows::intake::CaseSession;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

pub(crate) type SharedSession = Arc<Mutex<CaseSession<InMemorySessionStore>>>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) session: SharedSession,
    pub(crate) case_store: Arc<CaseStoreClient>,
}

impl AppState {
    /// Guards must be dropped before any `.await`.
    pub(crate) fn session(
        &self,
    ) -> Result<MutexGuard<'_, CaseSession<InMemorySessionStore>>, AppError> {
        self.session
            .lock()
            .map_err(|_| StorageError::Unavailable("session lock poisoned".to_string()).into())
    }
}

pub(crate) fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Parses `CATEGORY=YYYY-MM-DD`, where the category is a key such as
/// `submission` or a full label.
pub(crate) fn parse_deadline_arg(raw: &str) -> Result<DeadlineEntry, String> {
    let (category, date) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected CATEGORY=YYYY-MM-DD, got '{raw}'"))?;
    let category = DeadlineCategory::parse(category).ok_or_else(|| {
        format!("unknown deadline category '{category}' (use submission, biometrics, decision or appeal)")
    })?;
    if parse_due_date(date).is_none() {
        return Err(format!("failed to parse '{date}' as a due date"));
    }
    Ok(DeadlineEntry::new(category, date.trim()))
}

pub(crate) fn parse_route(raw: &str) -> Result<VisaRoute, String> {
    VisaRoute::from_label(raw).ok_or_else(|| {
        let known: Vec<&str> = VisaRoute::ordered()
            .into_iter()
            .map(VisaRoute::label)
            .collect();
        format!("unknown visa route '{raw}' (expected one of: {})", known.join(", "))
    })
}
