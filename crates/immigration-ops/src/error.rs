use crate::config::ConfigError;
use crate::storage::StorageError;
use crate::telemetry::TelemetryError;
use crate::workflows::cases::CaseStoreError;
use crate::workflows::deadlines::DeadlineError;
use crate::workflows::documents::{AdmissionError, ReconcileError};
use crate::workflows::intake::{IntakeError, SessionError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Session(SessionError),
    CaseStore(CaseStoreError),
    NotFound(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Session(err) => session_status(err),
            AppError::CaseStore(err) => match err {
                CaseStoreError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                CaseStoreError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
                CaseStoreError::Network(_)
                | CaseStoreError::MalformedResponse(_)
                | CaseStoreError::Rejected(_) => StatusCode::BAD_GATEWAY,
            },
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn session_status(err: &SessionError) -> StatusCode {
    match err {
        SessionError::Intake(IntakeError::Invalid(_)) => StatusCode::UNPROCESSABLE_ENTITY,
        SessionError::Deadline(DeadlineError::InvalidDate { .. })
        | SessionError::Reconcile(ReconcileError::UnknownCategory(_)) => StatusCode::BAD_REQUEST,
        SessionError::Reconcile(ReconcileError::Admission(AdmissionError::FileTooLarge {
            ..
        })) => StatusCode::PAYLOAD_TOO_LARGE,
        SessionError::Reconcile(ReconcileError::Admission(AdmissionError::UnsupportedType {
            ..
        })) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        SessionError::Reconcile(ReconcileError::ArtifactNotFound(_)) => StatusCode::NOT_FOUND,
        SessionError::ConsentRequired => StatusCode::FORBIDDEN,
        SessionError::Intake(IntakeError::Pattern(_))
        | SessionError::Deadline(DeadlineError::Storage(_))
        | SessionError::Reconcile(ReconcileError::Storage(_))
        | SessionError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Session(err) => write!(f, "{}", err),
            AppError::CaseStore(err) => write!(f, "{}", err),
            AppError::NotFound(what) => write!(f, "{} not found", what),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Session(err) => Some(err),
            AppError::CaseStore(err) => Some(err),
            AppError::NotFound(_) => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::Session(SessionError::Intake(IntakeError::Invalid(fields))) => {
                json!({ "error": self.to_string(), "fields": fields })
            }
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<SessionError> for AppError {
    fn from(value: SessionError) -> Self {
        Self::Session(value)
    }
}

impl From<DeadlineError> for AppError {
    fn from(value: DeadlineError) -> Self {
        Self::Session(value.into())
    }
}

impl From<ReconcileError> for AppError {
    fn from(value: ReconcileError) -> Self {
        Self::Session(value.into())
    }
}

impl From<StorageError> for AppError {
    fn from(value: StorageError) -> Self {
        Self::Session(value.into())
    }
}

impl From<CaseStoreError> for AppError {
    fn from(value: CaseStoreError) -> Self {
        Self::CaseStore(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::documents::ArtifactId;
    use crate::workflows::intake::FieldError;

    #[test]
    fn admission_failures_map_to_specific_statuses() {
        let too_large: AppError = ReconcileError::Admission(AdmissionError::FileTooLarge {
            file_name: "a.pdf".to_string(),
            byte_size: 10,
            limit_label: "1MB".to_string(),
        })
        .into();
        assert_eq!(too_large.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let unsupported: AppError = ReconcileError::Admission(AdmissionError::UnsupportedType {
            file_name: "a.gif".to_string(),
            mime_type: "image/gif".to_string(),
        })
        .into();
        assert_eq!(unsupported.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let missing: AppError = ReconcileError::ArtifactNotFound(ArtifactId::generate()).into();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn validation_and_remote_failures() {
        let invalid: AppError = SessionError::Intake(IntakeError::Invalid(vec![FieldError {
            field: "clientName",
            message: "This field is required",
        }]))
        .into();
        assert_eq!(invalid.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let remote: AppError = CaseStoreError::Network("timed out".to_string()).into();
        assert_eq!(remote.status(), StatusCode::BAD_GATEWAY);

        let consent: AppError = SessionError::ConsentRequired.into();
        assert_eq!(consent.status(), StatusCode::FORBIDDEN);

        let unknown: AppError = ReconcileError::UnknownCategory("Golden".to_string()).into();
        assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
    }
}
