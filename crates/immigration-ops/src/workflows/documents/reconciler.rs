use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use super::admission::AdmissionPolicy;
use super::catalog::VisaRoute;
use super::domain::{
    AdmissionReceipt, ArtifactId, ArtifactUpload, CompletionSummary, ReconcileError, Requirement,
    RequirementStatus, UploadedArtifact,
};
use super::matching::{completion_summary, is_satisfied};
use crate::storage::{load_json, save_json, SessionStore, StorageKey};

/// Ordered catalog lookup by route label.
pub fn requirements_for(route_label: &str) -> Result<Vec<Requirement>, ReconcileError> {
    let route = VisaRoute::from_label(route_label)
        .ok_or_else(|| ReconcileError::UnknownCategory(route_label.to_string()))?;
    Ok(requirements_for_route(route))
}

pub fn requirements_for_route(route: VisaRoute) -> Vec<Requirement> {
    route
        .requirement_labels()
        .iter()
        .map(|&label| Requirement { label, route })
        .collect()
}

pub fn format_file_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;
    if bytes < KIB {
        format!("{bytes} B")
    } else if bytes < MIB {
        format!("{:.1} KB", bytes as f64 / KIB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MIB as f64)
    }
}

pub fn file_type_label(mime_type: &str) -> &'static str {
    match mime_type {
        "application/pdf" => "PDF",
        "image/jpeg" | "image/jpg" => "JPG",
        "image/png" => "PNG",
        _ => "File",
    }
}

/// Tracks the active route's requirements against the admitted uploads.
#[derive(Debug)]
pub struct RequirementReconciler<S> {
    store: Arc<S>,
    policy: AdmissionPolicy,
    route: Option<VisaRoute>,
    artifacts: Vec<UploadedArtifact>,
}

impl<S> RequirementReconciler<S>
where
    S: SessionStore,
{
    pub fn new(store: Arc<S>, policy: AdmissionPolicy) -> Self {
        Self {
            store,
            policy,
            route: None,
            artifacts: Vec::new(),
        }
    }

    /// Rebuilds the artifact list from the store. The route is owned by the
    /// intake record and must be set separately.
    pub fn restore(store: Arc<S>, policy: AdmissionPolicy) -> Result<Self, ReconcileError> {
        let artifacts: Vec<UploadedArtifact> =
            load_json(store.as_ref(), StorageKey::UploadedFiles)?.unwrap_or_default();
        debug!(count = artifacts.len(), "restored uploaded files");
        Ok(Self {
            store,
            policy,
            route: None,
            artifacts,
        })
    }

    pub fn policy(&self) -> &AdmissionPolicy {
        &self.policy
    }

    pub fn route(&self) -> Option<VisaRoute> {
        self.route
    }

    pub fn set_route(&mut self, route: VisaRoute) {
        self.route = Some(route);
    }

    pub fn artifacts(&self) -> &[UploadedArtifact] {
        &self.artifacts
    }

    /// Requirements of the active route; empty until a route is set.
    pub fn requirements(&self) -> Vec<Requirement> {
        self.route.map(requirements_for_route).unwrap_or_default()
    }

    /// Validates the upload and, only if it passes, appends and persists it.
    /// A failed write leaves the collection as it was.
    pub fn admit(&mut self, upload: ArtifactUpload) -> Result<AdmissionReceipt, ReconcileError> {
        self.policy.check(&upload)?;
        let advisories = self.policy.advisories(&upload);

        let artifact = UploadedArtifact {
            id: ArtifactId::generate(),
            byte_size: upload.byte_size(),
            file_name: upload.file_name,
            mime_type: upload.mime_type,
            uploaded_at: Utc::now(),
            content: upload.content,
        };
        let receipt = AdmissionReceipt {
            artifact_id: artifact.id,
            file_name: artifact.file_name.clone(),
            size_label: format_file_size(artifact.byte_size),
            type_label: file_type_label(&artifact.mime_type),
            advisories,
        };
        let bytes = artifact.byte_size;

        self.artifacts.push(artifact);
        if let Err(err) = save_json(self.store.as_ref(), StorageKey::UploadedFiles, &self.artifacts)
        {
            self.artifacts.pop();
            return Err(err.into());
        }

        info!(
            artifact = %receipt.artifact_id,
            file = %receipt.file_name,
            bytes,
            "document admitted"
        );
        Ok(receipt)
    }

    pub fn remove_artifact(&mut self, id: ArtifactId) -> Result<UploadedArtifact, ReconcileError> {
        let position = self
            .artifacts
            .iter()
            .position(|artifact| artifact.id == id)
            .ok_or(ReconcileError::ArtifactNotFound(id))?;

        let removed = self.artifacts.remove(position);
        if let Err(err) = save_json(self.store.as_ref(), StorageKey::UploadedFiles, &self.artifacts)
        {
            self.artifacts.insert(position, removed);
            return Err(err.into());
        }

        info!(artifact = %id, file = %removed.file_name, "document removed");
        Ok(removed)
    }

    pub fn checklist(&self) -> Vec<RequirementStatus> {
        self.requirements()
            .iter()
            .map(|requirement| RequirementStatus {
                label: requirement.label,
                satisfied: is_satisfied(requirement, &self.artifacts),
            })
            .collect()
    }

    pub fn missing_requirements(&self) -> Vec<Requirement> {
        self.requirements()
            .into_iter()
            .filter(|requirement| !is_satisfied(requirement, &self.artifacts))
            .collect()
    }

    pub fn summary(&self) -> CompletionSummary {
        completion_summary(&self.requirements(), &self.artifacts)
    }

    /// Forgets route and uploads; the caller owns clearing the store.
    pub fn clear(&mut self) {
        self.route = None;
        self.artifacts.clear();
    }
}
