use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Status values offered by the solicitor dashboard, in menu order.
pub const STATUS_OPTIONS: [&str; 9] = [
    "New - Waiting for docs",
    "Waiting for Documents",
    "Documents Received",
    "Under Review",
    "In Progress",
    "Awaiting Decision",
    "Approved",
    "Rejected",
    "Completed",
];

pub const URGENCY_OPTIONS: [&str; 2] = ["Normal", "Urgent"];
pub const DOCS_RECEIVED_OPTIONS: [&str; 2] = ["No", "Yes"];

/// Statuses counted as waiting on the client.
pub const PENDING_STATUSES: [&str; 2] = ["New - Waiting for docs", "Waiting for Documents"];

/// One spreadsheet row, keyed by column header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    #[serde(rename = "Case ID", default, deserialize_with = "cell_text")]
    pub case_id: String,
    #[serde(rename = "Name", default, deserialize_with = "cell_text")]
    pub name: String,
    #[serde(rename = "Email", default, deserialize_with = "cell_text")]
    pub email: String,
    #[serde(rename = "Phone", default, deserialize_with = "cell_text")]
    pub phone: String,
    #[serde(rename = "Visa Route", default, deserialize_with = "cell_text")]
    pub visa_route: String,
    #[serde(rename = "Status", default, deserialize_with = "cell_text")]
    pub status: String,
    #[serde(rename = "Urgency", default, deserialize_with = "cell_text")]
    pub urgency: String,
    #[serde(rename = "Docs Received", default, deserialize_with = "cell_text")]
    pub docs_received: String,
    #[serde(rename = "Date Submitted", default, deserialize_with = "cell_text")]
    pub date_submitted: String,
    #[serde(rename = "Notes", default, deserialize_with = "cell_text")]
    pub notes: String,
    #[serde(rename = "Evidence Checklist", default, deserialize_with = "cell_text")]
    pub evidence_checklist: String,
    #[serde(rename = "Intake Form Link", default, deserialize_with = "cell_text")]
    pub intake_form_link: String,
    #[serde(rename = "Upload Documents Link", default, deserialize_with = "cell_text")]
    pub upload_documents_link: String,
    #[serde(rename = "Drive Folder Link", default, deserialize_with = "cell_text")]
    pub drive_folder_link: String,
    /// Columns the dashboard does not know about, kept verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl CaseRecord {
    /// Cell text for any header; unknown or empty cells read as "".
    pub fn column(&self, header: &str) -> Cow<'_, str> {
        let known = match header {
            "Case ID" => &self.case_id,
            "Name" => &self.name,
            "Email" => &self.email,
            "Phone" => &self.phone,
            "Visa Route" => &self.visa_route,
            "Status" => &self.status,
            "Urgency" => &self.urgency,
            "Docs Received" => &self.docs_received,
            "Date Submitted" => &self.date_submitted,
            "Notes" => &self.notes,
            "Evidence Checklist" => &self.evidence_checklist,
            "Intake Form Link" => &self.intake_form_link,
            "Upload Documents Link" => &self.upload_documents_link,
            "Drive Folder Link" => &self.drive_folder_link,
            other => {
                return match self.extra.get(other) {
                    Some(Value::String(text)) => Cow::Borrowed(text.as_str()),
                    Some(Value::Null) | None => Cow::Borrowed(""),
                    Some(value) => Cow::Owned(value.to_string()),
                }
            }
        };
        Cow::Borrowed(known.as_str())
    }

    pub fn is_urgent(&self) -> bool {
        self.urgency == "Urgent"
    }

    pub fn is_pending(&self) -> bool {
        PENDING_STATUSES.contains(&self.status.as_str())
    }

    pub fn is_completed(&self) -> bool {
        self.status == "Completed"
    }
}

/// Spreadsheet cells arrive as strings, numbers, booleans, or blanks.
fn cell_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(text) => text,
        other => other.to_string(),
    })
}

/// Editable columns and their allowed values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaseField {
    #[serde(rename = "Status")]
    Status,
    #[serde(rename = "Urgency")]
    Urgency,
    #[serde(rename = "Docs Received")]
    DocsReceived,
    #[serde(rename = "Notes")]
    Notes,
}

impl CaseField {
    pub const fn header(self) -> &'static str {
        match self {
            Self::Status => "Status",
            Self::Urgency => "Urgency",
            Self::DocsReceived => "Docs Received",
            Self::Notes => "Notes",
        }
    }

    /// `None` means free text.
    pub const fn options(self) -> Option<&'static [&'static str]> {
        match self {
            Self::Status => Some(&STATUS_OPTIONS),
            Self::Urgency => Some(&URGENCY_OPTIONS),
            Self::DocsReceived => Some(&DOCS_RECEIVED_OPTIONS),
            Self::Notes => None,
        }
    }

    pub fn from_header(header: &str) -> Option<Self> {
        [Self::Status, Self::Urgency, Self::DocsReceived, Self::Notes]
            .into_iter()
            .find(|field| field.header() == header)
    }

    pub fn accepts(self, value: &str) -> bool {
        self.options()
            .map_or(true, |options| options.contains(&value))
    }
}
