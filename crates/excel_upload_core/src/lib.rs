//! Client-side orchestration for batch spreadsheet uploads into the ledger.
//!
//! [`UploadOrchestrator`] owns the submission form, runs the batch-number preflight check, sends the
//! file and reconciles the (possibly partial) result, and keeps the cached batch list current.
//! Everything user-visible goes out as a [`Notification`] on a broadcast channel.

pub mod api;
pub mod config;
pub mod error;
pub mod file;
pub mod form;
pub mod ids;
pub mod models;
pub mod notify;
pub mod orchestrator;
pub mod preflight;
pub mod report;
pub mod utils;

pub use api::{HttpUploadApi, UploadApi};
pub use config::ClientConfig;
pub use error::{ApiError, UploadError};
pub use file::SelectedFile;
pub use form::{Field, FieldError, FieldErrorKind, FormDefaults, FormPatch, UploadForm};
pub use ids::{BatchNo, BranchCode, SourceCode};
pub use models::{
    BatchSummaryEntry, BranchOption, DeleteBatchResponse, RowError, SourceCodeOption, UploadRequest,
    UploadResult,
};
pub use notify::{Notification, NotificationKind, Notifier};
pub use orchestrator::{DeleteOutcome, UploadOrchestrator, TEMPLATE_FILE_NAME};
pub use report::ErrorReport;

/// Orchestrator wired to the real backend.
pub fn connect(config: ClientConfig) -> Result<UploadOrchestrator<HttpUploadApi>, ApiError> {
    let api = HttpUploadApi::new(&config)?;
    Ok(UploadOrchestrator::new(api, config))
}
