use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::catalog::VisaRoute;
use super::admission::AdmissionError;
use crate::storage::StorageError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactId(pub Uuid);

impl ArtifactId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for ArtifactId {
    type Err = uuid::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(raw.trim()).map(Self)
    }
}

/// An admitted upload: metadata plus raw content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedArtifact {
    pub id: ArtifactId,
    pub file_name: String,
    pub mime_type: String,
    pub byte_size: u64,
    pub uploaded_at: DateTime<Utc>,
    /// Stored as standard base64 text.
    #[serde(default, skip_serializing_if = "Vec::is_empty", with = "base64_content")]
    pub content: Vec<u8>,
}

mod base64_content {
    use base64::engine::general_purpose::STANDARD as B64;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S>(content: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&B64.encode(content))
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        B64.decode(encoded.as_bytes())
            .map_err(|err| serde::de::Error::custom(format!("content base64 decode failed: {err}")))
    }
}

/// Upload awaiting admission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactUpload {
    pub file_name: String,
    pub mime_type: String,
    pub content: Vec<u8>,
}

impl ArtifactUpload {
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        content: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            content,
        }
    }

    pub fn byte_size(&self) -> u64 {
        self.content.len() as u64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Requirement {
    pub label: &'static str,
    pub route: VisaRoute,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequirementStatus {
    pub label: &'static str,
    pub satisfied: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompletionSummary {
    pub satisfied: usize,
    pub total: usize,
}

impl CompletionSummary {
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.satisfied == self.total
    }
}

/// Outcome of a successful admission.
#[derive(Debug, Clone, Serialize)]
pub struct AdmissionReceipt {
    pub artifact_id: ArtifactId,
    pub file_name: String,
    pub size_label: String,
    pub type_label: &'static str,
    pub advisories: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("no document requirements are defined for '{0}'")]
    UnknownCategory(String),
    #[error(transparent)]
    Admission(#[from] AdmissionError),
    #[error("no uploaded file with id {0}")]
    ArtifactNotFound(ArtifactId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
