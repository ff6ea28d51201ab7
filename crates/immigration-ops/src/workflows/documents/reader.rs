use std::io;
use std::path::{Path, PathBuf};

use tokio::task::JoinSet;
use tracing::warn;

use super::domain::{AdmissionReceipt, ArtifactUpload, ReconcileError};
use super::reconciler::RequirementReconciler;
use crate::storage::SessionStore;

#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    #[error("unable to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("file read task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub result: Result<AdmissionReceipt, ReaderError>,
}

/// Reads one file, naming it by its final path component and guessing the
/// MIME type from its extension.
pub async fn load_upload(path: &Path) -> Result<ArtifactUpload, ReaderError> {
    let content = tokio::fs::read(path).await.map_err(|source| ReaderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mime_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();

    Ok(ArtifactUpload::new(file_name, mime_type, content))
}

/// Reads every path concurrently and admits each file as soon as its read
/// completes. Outcomes arrive in completion order.
pub async fn read_and_admit<S, I>(
    reconciler: &mut RequirementReconciler<S>,
    paths: I,
) -> Vec<FileOutcome>
where
    S: SessionStore,
    I: IntoIterator<Item = PathBuf>,
{
    let mut reads = JoinSet::new();
    for path in paths {
        reads.spawn(async move {
            let upload = load_upload(&path).await;
            (path, upload)
        });
    }

    let mut outcomes = Vec::new();
    while let Some(joined) = reads.join_next().await {
        let (path, upload) = match joined {
            Ok(pair) => pair,
            Err(err) => {
                warn!(error = %err, "file read task aborted");
                outcomes.push(FileOutcome {
                    path: PathBuf::new(),
                    result: Err(ReaderError::Join(err)),
                });
                continue;
            }
        };

        let result = upload.and_then(|upload| reconciler.admit(upload).map_err(ReaderError::from));
        if let Err(err) = &result {
            warn!(path = %path.display(), error = %err, "file not admitted");
        }
        outcomes.push(FileOutcome { path, result });
    }
    outcomes
}
