use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use tracing::info;

use super::domain::{demo_intake, ClientIntake, ConsentRecord};
use super::outreach::{outreach_message, whatsapp_link};
use super::validation::{IntakeError, IntakeValidator};
use crate::config::{DeadlineConfig, DocumentConfig};
use crate::storage::{load_json, save_json, SessionStore, StorageError, StorageKey};
use crate::workflows::deadlines::{
    parse_due_date, DeadlineBoard, DeadlineError, DeadlineTracker, Reevaluate,
};
use crate::workflows::documents::{
    AdmissionPolicy, AdmissionReceipt, ArtifactId, ArtifactUpload, CompletionSummary,
    ReconcileError, RequirementReconciler, RequirementStatus, UploadedArtifact, VisaRoute,
};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    Deadline(#[from] DeadlineError),
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Please accept privacy consent to upload files")]
    ConsentRequired,
}

/// Everything a client-facing view needs at one instant.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub intake: Option<ClientIntake>,
    pub route: Option<VisaRoute>,
    pub consent: Option<ConsentRecord>,
    pub demo_mode: bool,
    pub deadlines: DeadlineBoard,
    pub checklist: Vec<RequirementStatus>,
    pub summary: CompletionSummary,
    pub uploaded_files: usize,
}

/// One client's intake, deadlines, and uploads, sharing a single store.
#[derive(Debug)]
pub struct CaseSession<S> {
    store: Arc<S>,
    validator: IntakeValidator,
    tracker: DeadlineTracker<S>,
    reconciler: RequirementReconciler<S>,
    intake: Option<ClientIntake>,
    consent: Option<ConsentRecord>,
    demo_mode: bool,
}

impl<S> CaseSession<S>
where
    S: SessionStore,
{
    /// Opens a session over `store`, picking up anything already saved there.
    pub fn open(
        store: Arc<S>,
        started_at: NaiveDateTime,
        deadlines: DeadlineConfig,
        documents: DocumentConfig,
    ) -> Result<Self, SessionError> {
        let validator = IntakeValidator::new()?;
        let tracker = DeadlineTracker::restore(store.clone(), started_at, deadlines.quiet_window)?;
        let mut reconciler =
            RequirementReconciler::restore(store.clone(), AdmissionPolicy::from_config(&documents))?;

        let intake: Option<ClientIntake> = load_json(store.as_ref(), StorageKey::ClientData)?;
        if let Some(route) = intake
            .as_ref()
            .and_then(|intake| VisaRoute::from_label(&intake.visa_type))
        {
            reconciler.set_route(route);
        }
        let consent: Option<ConsentRecord> = load_json(store.as_ref(), StorageKey::GdprConsent)?;
        let demo_mode: bool = load_json(store.as_ref(), StorageKey::DemoMode)?.unwrap_or(false);

        Ok(Self {
            store,
            validator,
            tracker,
            reconciler,
            intake,
            consent,
            demo_mode,
        })
    }

    pub fn intake(&self) -> Option<&ClientIntake> {
        self.intake.as_ref()
    }

    pub fn tracker(&self) -> &DeadlineTracker<S> {
        &self.tracker
    }

    pub fn reconciler(&self) -> &RequirementReconciler<S> {
        &self.reconciler
    }

    pub fn demo_mode(&self) -> bool {
        self.demo_mode
    }

    /// Validates the form, route, and every deadline before touching any state.
    pub fn save_intake(&mut self, intake: ClientIntake) -> Result<(), SessionError> {
        self.validator.validate(&intake)?;

        let route = VisaRoute::from_label(&intake.visa_type)
            .ok_or_else(|| ReconcileError::UnknownCategory(intake.visa_type.clone()))?;

        let entries = intake.deadline_entries();
        if let Some(bad) = entries
            .iter()
            .find(|entry| parse_due_date(&entry.due_date).is_none())
        {
            return Err(DeadlineError::InvalidDate {
                category: bad.category.label(),
                value: bad.due_date.clone(),
            }
            .into());
        }

        self.tracker.set_deadlines(&entries)?;
        save_json(self.store.as_ref(), StorageKey::ClientData, &intake)?;
        self.reconciler.set_route(route);

        info!(
            route = route.label(),
            deadlines = entries.len(),
            "intake saved"
        );
        self.intake = Some(intake);
        Ok(())
    }

    pub fn record_consent(&mut self, consented: bool) -> Result<ConsentRecord, SessionError> {
        let record = ConsentRecord {
            consented,
            timestamp: Utc::now(),
        };
        save_json(self.store.as_ref(), StorageKey::GdprConsent, &record)?;
        self.consent = Some(record);
        info!(consented, "privacy consent recorded");
        Ok(record)
    }

    pub fn has_consent(&self) -> bool {
        self.consent.is_some_and(|record| record.consented)
    }

    pub fn admit(&mut self, upload: ArtifactUpload) -> Result<AdmissionReceipt, SessionError> {
        if !self.has_consent() {
            return Err(SessionError::ConsentRequired);
        }
        Ok(self.reconciler.admit(upload)?)
    }

    pub fn remove_artifact(&mut self, id: ArtifactId) -> Result<UploadedArtifact, SessionError> {
        Ok(self.reconciler.remove_artifact(id)?)
    }

    /// Switching on loads the sample client; switching off keeps current data.
    pub fn set_demo_mode(&mut self, enabled: bool) -> Result<(), SessionError> {
        save_json(self.store.as_ref(), StorageKey::DemoMode, &enabled)?;
        self.demo_mode = enabled;
        if enabled {
            self.save_intake(demo_intake())?;
        }
        info!(enabled, "demo mode toggled");
        Ok(())
    }

    /// Wipes storage and every in-memory collection.
    pub fn clear(&mut self) -> Result<(), SessionError> {
        self.store.clear()?;
        self.tracker.clear();
        self.reconciler.clear();
        self.intake = None;
        self.consent = None;
        self.demo_mode = false;
        info!("session data cleared");
        Ok(())
    }

    pub fn outreach_message(&self) -> String {
        outreach_message(
            self.intake.as_ref(),
            self.tracker.next_deadline(),
            &self.reconciler.missing_requirements(),
        )
    }

    pub fn whatsapp_link(&self, phone: &str) -> String {
        whatsapp_link(phone, &self.outreach_message())
    }

    pub fn snapshot(&self, now: NaiveDateTime) -> SessionSnapshot {
        SessionSnapshot {
            intake: self.intake.clone(),
            route: self.reconciler.route(),
            consent: self.consent,
            demo_mode: self.demo_mode,
            deadlines: self.tracker.board(now),
            checklist: self.reconciler.checklist(),
            summary: self.reconciler.summary(),
            uploaded_files: self.reconciler.artifacts().len(),
        }
    }
}

impl<S> Reevaluate for CaseSession<S>
where
    S: SessionStore,
{
    fn reevaluate(&mut self, now: NaiveDateTime) -> DeadlineBoard {
        self.tracker.evaluate(now)
    }
}
