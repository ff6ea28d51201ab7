//! Visa route evidence catalog, upload admission, and fuzzy reconciliation of
//! uploaded file names against required documents.

pub mod admission;
pub mod catalog;
pub mod domain;
pub mod matching;
pub mod reader;
pub mod reconciler;

pub use admission::{is_allowed_type, AdmissionError, AdmissionPolicy, IMAGE_ADVISORY};
pub use catalog::VisaRoute;
pub use domain::{
    AdmissionReceipt, ArtifactId, ArtifactUpload, CompletionSummary, ReconcileError, Requirement,
    RequirementStatus, UploadedArtifact,
};
pub use matching::{completion_summary, is_satisfied, label_matches, requirement_tokens};
pub use reader::{load_upload, read_and_admit, FileOutcome, ReaderError};
pub use reconciler::{
    file_type_label, format_file_size, requirements_for, requirements_for_route,
    RequirementReconciler,
};
