use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use super::domain::{CaseField, CaseRecord};
use crate::config::CaseStoreConfig;

const PLACEHOLDER_MARKER: &str = "YOUR_SCRIPT_ID";

#[derive(Debug, thiserror::Error)]
pub enum CaseStoreError {
    #[error("case store request failed: {0}")]
    Network(String),
    #[error("case store returned an unexpected payload: {0}")]
    MalformedResponse(String),
    #[error("case store rejected the request: {0}")]
    Rejected(String),
    #[error("{0}")]
    Validation(String),
    #[error("case store endpoint is not configured")]
    NotConfigured,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum CaseStoreRequest<'a> {
    Update {
        #[serde(rename = "caseId")]
        case_id: &'a str,
        field: &'a str,
        value: &'a str,
    },
    SendReminder {
        #[serde(rename = "caseId")]
        case_id: &'a str,
        email: &'a str,
        #[serde(rename = "clientName")]
        client_name: &'a str,
    },
}

#[derive(Debug, Deserialize)]
struct ActionResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: Option<String>,
}

/// Confirmation returned by a successful write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionAck {
    pub message: Option<String>,
}

/// HTTP client for the spreadsheet-backed case store. Requests are never
/// retried.
#[derive(Debug, Clone)]
pub struct CaseStoreClient {
    http: reqwest::Client,
    endpoint: String,
}

impl CaseStoreClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, CaseStoreError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| CaseStoreError::Network(err.to_string()))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &CaseStoreConfig) -> Result<Self, CaseStoreError> {
        Self::new(config.endpoint.clone(), config.timeout)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn is_configured(&self) -> bool {
        !self.endpoint.contains(PLACEHOLDER_MARKER)
    }

    fn ensure_configured(&self) -> Result<(), CaseStoreError> {
        if self.is_configured() {
            Ok(())
        } else {
            Err(CaseStoreError::NotConfigured)
        }
    }

    #[instrument(skip(self))]
    pub async fn get_cases(&self) -> Result<Vec<CaseRecord>, CaseStoreError> {
        self.ensure_configured()?;
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("action", "get_cases")])
            .send()
            .await
            .map_err(|err| CaseStoreError::Network(err.to_string()))?;
        let mut body: Value = read_json(response).await?;

        let cases = match body.get_mut("cases").map(Value::take) {
            Some(Value::Array(rows)) => rows,
            _ => {
                return Err(CaseStoreError::MalformedResponse(
                    "missing cases array".to_string(),
                ))
            }
        };
        let records = cases
            .into_iter()
            .map(serde_json::from_value::<CaseRecord>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| CaseStoreError::MalformedResponse(err.to_string()))?;

        debug!(count = records.len(), "fetched cases");
        Ok(records)
    }

    /// Validates the value against the column's options before sending.
    #[instrument(skip(self))]
    pub async fn update_field(
        &self,
        case_id: &str,
        field: CaseField,
        value: &str,
    ) -> Result<ActionAck, CaseStoreError> {
        if !field.accepts(value) {
            return Err(CaseStoreError::Validation(format!(
                "'{value}' is not a valid {} value",
                field.header()
            )));
        }
        self.post(&CaseStoreRequest::Update {
            case_id,
            field: field.header(),
            value,
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn send_reminder(
        &self,
        case_id: &str,
        email: &str,
        client_name: &str,
    ) -> Result<ActionAck, CaseStoreError> {
        if email.trim().is_empty() {
            return Err(CaseStoreError::Validation("No email on file".to_string()));
        }
        self.post(&CaseStoreRequest::SendReminder {
            case_id,
            email: email.trim(),
            client_name,
        })
        .await
    }

    async fn post(&self, request: &CaseStoreRequest<'_>) -> Result<ActionAck, CaseStoreError> {
        self.ensure_configured()?;
        let response = self
            .http
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|err| CaseStoreError::Network(err.to_string()))?;
        let body: ActionResponse = read_json(response).await?;

        if body.status == "success" {
            Ok(ActionAck {
                message: body.message,
            })
        } else {
            Err(CaseStoreError::Rejected(
                body.message.unwrap_or_else(|| "Unknown error".to_string()),
            ))
        }
    }
}

async fn read_json<T>(response: reqwest::Response) -> Result<T, CaseStoreError>
where
    T: serde::de::DeserializeOwned,
{
    let status = response.status();
    if !status.is_success() {
        return Err(CaseStoreError::Network(format!(
            "unexpected status {status}"
        )));
    }
    response
        .json::<T>()
        .await
        .map_err(|err| CaseStoreError::MalformedResponse(err.to_string()))
}
