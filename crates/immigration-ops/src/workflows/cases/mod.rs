//! Solicitor-facing case list backed by a remote spreadsheet endpoint.

pub mod client;
pub mod dashboard;
pub mod domain;

pub use client::{ActionAck, CaseStoreClient, CaseStoreError};
pub use dashboard::{CaseDashboard, CaseFilter, CasePage, CaseStats, SortState, DEFAULT_PAGE_SIZE};
pub use domain::{
    CaseField, CaseRecord, DOCS_RECEIVED_OPTIONS, PENDING_STATUSES, STATUS_OPTIONS,
    URGENCY_OPTIONS,
};
