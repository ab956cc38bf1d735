//! Upload orchestrator: sequences reference data loading, file selection, the preflight check,
//! the upload itself and the batch list actions around it.
//!
//! All methods take `&self`. State sits behind a mutex that is never held across an await, so
//! independent actions (a delete while a batch list reload is pending) interleave freely and the
//! last response to arrive wins. The only gate is the `uploading` flag.

use crate::api::UploadApi;
use crate::config::ClientConfig;
use crate::error::UploadError;
use crate::file::{self, SelectedFile};
use crate::form::{Field, FormDefaults, FormPatch, UploadForm};
use crate::models::{BatchSummaryEntry, BranchOption, SourceCodeOption, UploadRequest, UploadResult};
use crate::notify::{Notification, Notifier};
use crate::preflight;
use crate::report::{self, ErrorReport};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;

pub const TEMPLATE_FILE_NAME: &str = "upload_template.xlsx";

const MSG_MISSING_INPUT: &str = "Please select a file and fill all required fields";
const MSG_UPLOAD_FAILED: &str = "Upload failed. Please try again.";
const MSG_NO_BATCH_NO: &str = "Please enter a batch number";
const MSG_DELETE_FAILED: &str = "Failed to delete batch";
const MSG_NO_ERRORS: &str = "No errors to export";
const MSG_TEMPLATE_FAILED: &str = "Failed to download template";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The user declined the confirmation; nothing was sent.
    Cancelled,
}

#[derive(Default)]
struct State {
    form: UploadForm,
    selected_file: Option<SelectedFile>,
    upload_result: Option<UploadResult>,
    branches: Vec<BranchOption>,
    branches_loaded: bool,
    source_codes: Vec<SourceCodeOption>,
    batches: Vec<BatchSummaryEntry>,
    /// Whether the most recent batch list load succeeded.
    batches_current: bool,
    uploading: bool,
}

/// Holds `uploading` for the duration of one submit attempt.
struct UploadingGuard<'a> {
    state: &'a Mutex<State>,
}

impl<'a> UploadingGuard<'a> {
    fn try_acquire(state: &'a Mutex<State>) -> Option<Self> {
        let mut st = state.lock().unwrap_or_else(PoisonError::into_inner);
        if st.uploading {
            return None;
        }
        st.uploading = true;
        Some(Self { state })
    }
}

impl Drop for UploadingGuard<'_> {
    fn drop(&mut self) {
        let mut st = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        st.uploading = false;
    }
}

pub struct UploadOrchestrator<A> {
    api: A,
    config: ClientConfig,
    notifier: Notifier,
    state: Mutex<State>,
}

impl<A: UploadApi> UploadOrchestrator<A> {
    pub fn new(api: A, config: ClientConfig) -> Self {
        Self::with_notifier(api, config, Notifier::new())
    }

    pub fn with_notifier(api: A, config: ClientConfig, notifier: Notifier) -> Self {
        Self {
            api,
            config,
            notifier,
            state: Mutex::new(State::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifier.subscribe()
    }

    // --- Read access ---

    pub fn form(&self) -> UploadForm {
        self.state().form.clone()
    }

    pub fn upload_result(&self) -> Option<UploadResult> {
        self.state().upload_result.clone()
    }

    pub fn branches(&self) -> Vec<BranchOption> {
        self.state().branches.clone()
    }

    pub fn source_codes(&self) -> Vec<SourceCodeOption> {
        self.state().source_codes.clone()
    }

    pub fn batches(&self) -> Vec<BatchSummaryEntry> {
        self.state().batches.clone()
    }

    /// False when the last batch list load failed (or none has run) and `batches` may be stale.
    pub fn is_batch_list_current(&self) -> bool {
        self.state().batches_current
    }

    pub fn selected_file(&self) -> Option<SelectedFile> {
        self.state().selected_file.clone()
    }

    pub fn has_selected_file(&self) -> bool {
        self.state().selected_file.is_some()
    }

    pub fn selected_file_name(&self) -> Option<String> {
        self.state().selected_file.as_ref().map(|f| f.file_name.clone())
    }

    /// True while a submit attempt is running. Only the orchestrator sets it.
    pub fn is_uploading(&self) -> bool {
        self.state().uploading
    }

    // --- Form ---

    pub fn edit_field(&self, field: Field, text: &str) {
        self.state().form.edit(field, text);
    }

    pub fn patch_form(&self, patch: FormPatch) {
        self.state().form.patch(patch);
    }

    pub fn mark_touched(&self, field: Field) {
        self.state().form.mark_touched(field);
    }

    /// Reset to exchange rate 1 and today's date; drop the selected file and any result.
    pub fn clear_form(&self) {
        let mut st = self.state();
        st.form.reset(FormDefaults::today());
        st.selected_file = None;
        st.upload_result = None;
    }

    // --- Reference data ---

    /// Load branches, source codes and the batch list, then select the first branch and source code
    /// and look up that branch's working day.
    pub async fn initialize(&self) {
        tokio::join!(self.load_reference_data(), self.load_batch_summary());
        if let Some(branch_code) = self.apply_default_selection() {
            self.on_branch_change(&branch_code).await;
        }
    }

    /// Branches and source codes, independently; one failing does not affect the other.
    pub async fn load_reference_data(&self) {
        tokio::join!(self.load_branches(), self.load_source_codes());
    }

    pub async fn load_branches(&self) -> bool {
        match self.api.branches().await {
            Ok(branches) => {
                log::info!("[excel_upload] loaded {} branches", branches.len());
                let mut st = self.state();
                st.branches = branches;
                st.branches_loaded = true;
                true
            }
            Err(e) => {
                log::warn!("[excel_upload] loading branches failed: {}", e);
                self.notifier.error("Failed to load branches");
                false
            }
        }
    }

    pub async fn load_source_codes(&self) -> bool {
        match self.api.source_codes().await {
            Ok(codes) => {
                log::info!("[excel_upload] loaded {} source codes", codes.len());
                self.state().source_codes = codes;
                true
            }
            Err(e) => {
                log::warn!("[excel_upload] loading source codes failed: {}", e);
                self.notifier.error("Failed to load source codes");
                false
            }
        }
    }

    /// Put the first loaded branch and source code into the form.
    /// Returns the selected branch so the caller can trigger its working-day lookup.
    pub fn apply_default_selection(&self) -> Option<String> {
        let mut st = self.state();
        let branch = st.branches.first().map(|b| b.code.clone());
        let source = st.source_codes.first().map(|s| s.code.clone());
        st.form.patch(FormPatch {
            branch_code: branch.clone(),
            source_code: source,
            ..FormPatch::default()
        });
        branch
    }

    /// Full reload of the batch list. On failure the previous list stays.
    pub async fn load_batch_summary(&self) -> bool {
        match self.api.batches().await {
            Ok(batches) => {
                log::debug!("[excel_upload] batch list reloaded ({} batches)", batches.len());
                let mut st = self.state();
                st.batches = batches;
                st.batches_current = true;
                true
            }
            Err(e) => {
                log::warn!("[excel_upload] loading batch summary failed: {}", e);
                self.state().batches_current = false;
                false
            }
        }
    }

    /// User picked a branch: store it and move the entry date to that branch's working day.
    pub async fn select_branch(&self, branch_code: &str) {
        self.state().form.edit(Field::BranchCode, branch_code);
        self.on_branch_change(branch_code).await;
    }

    /// Patch the entry date with the branch's working day. Failures keep the current date.
    pub async fn on_branch_change(&self, branch_code: &str) {
        if branch_code.is_empty() {
            return;
        }
        match self.api.working_day(branch_code).await {
            Ok(day) => {
                log::debug!("[excel_upload] working day for {}: {}", branch_code, day);
                self.state().form.patch(FormPatch::default().entry_date(day));
            }
            Err(e) => {
                log::warn!("[excel_upload] loading working day for {} failed: {}", branch_code, e);
            }
        }
    }

    // --- Upload ---

    /// Accept a spreadsheet for the next upload. A rejected file clears the pending selection and
    /// leaves any displayed result alone.
    pub fn on_file_selected(&self, file: SelectedFile) -> Result<(), UploadError> {
        match file::validate(&file, self.config.max_file_size) {
            Ok(()) => {
                log::info!("[excel_upload] selected {:?}", file);
                let mut st = self.state();
                st.selected_file = Some(file);
                st.upload_result = None;
                Ok(())
            }
            Err(rejection) => {
                self.state().selected_file = None;
                let message = rejection.message();
                self.notifier.error(message.clone());
                Err(UploadError::Validation(message))
            }
        }
    }

    pub async fn check_batch_exists(&self, batch_no: &str) -> bool {
        preflight::check_batch_exists(&self.api, batch_no).await
    }

    fn prepare_request(&self) -> Result<UploadRequest, String> {
        let st = self.state();
        let file = st.selected_file.clone().ok_or(MSG_MISSING_INPUT)?;
        let request = st.form.to_request(file).map_err(|invalid| {
            log::debug!("[excel_upload] upload blocked, invalid fields: {:?}", invalid);
            MSG_MISSING_INPUT
        })?;
        let known_branch = st
            .branches
            .iter()
            .any(|b| b.code == request.branch_code.as_str());
        if st.branches_loaded && !known_branch {
            return Err(format!("Branch {} is not a known branch", request.branch_code));
        }
        Ok(request)
    }

    /// Validate, run the existence check, upload, reconcile.
    ///
    /// `Ok` means the backend answered with a result, which may still report `success: false`
    /// (rows failed validation); that case raises a warning and leaves the batch list alone.
    pub async fn upload_file(&self) -> Result<UploadResult, UploadError> {
        let Some(guard) = UploadingGuard::try_acquire(&self.state) else {
            log::warn!("[excel_upload] upload_file ignored, upload already in flight");
            self.notifier.error(UploadError::InProgress.to_string());
            return Err(UploadError::InProgress);
        };

        let request = match self.prepare_request() {
            Ok(r) => r,
            Err(message) => {
                self.notifier.error(message.clone());
                return Err(UploadError::Validation(message));
            }
        };

        let batch_no = request.batch_no.to_string();
        if self.check_batch_exists(&batch_no).await {
            let err = UploadError::Conflict { batch_no };
            self.notifier.error(err.to_string());
            return Err(err);
        }

        self.state().upload_result = None;
        log::info!(
            "[excel_upload] uploading batch_no={} branch={} source={} exch_rate={} entry_date={}",
            request.batch_no,
            request.branch_code,
            request.source_code,
            request.exch_rate_text(),
            request.entry_date_text()
        );
        let outcome = self.api.upload(&request).await;
        drop(guard);

        match outcome {
            Ok(result) => {
                log::info!(
                    "[excel_upload] upload finished batch_no={} success={} total={} ok={} errors={} skipped={}",
                    result.batch_no,
                    result.success,
                    result.total_rows,
                    result.success_count,
                    result.error_count,
                    result.skipped_rows()
                );
                self.state().upload_result = Some(result.clone());
                if result.success {
                    self.notifier.success(result.message.clone());
                    self.load_batch_summary().await;
                } else {
                    self.notifier.warning(result.message.clone());
                }
                Ok(result)
            }
            Err(source) => {
                log::error!("[excel_upload] upload failed: {}", source);
                match source.structured_result() {
                    Some(result) => {
                        let message = result.message.clone();
                        self.state().upload_result = Some(result);
                        self.notifier.error(message.clone());
                        Err(UploadError::Transport { message, source })
                    }
                    None => {
                        self.notifier.error(MSG_UPLOAD_FAILED);
                        Err(UploadError::Transport {
                            message: MSG_UPLOAD_FAILED.to_string(),
                            source,
                        })
                    }
                }
            }
        }
    }

    // --- Batch actions ---

    /// Delete the batch named in the form. `confirm` receives the batch number and must return
    /// `true` for the request to be sent.
    pub async fn delete_batch<F>(&self, confirm: F) -> Result<DeleteOutcome, UploadError>
    where
        F: FnOnce(&str) -> bool,
    {
        let batch_no = self.state().form.batch_no().to_string();
        if batch_no.is_empty() {
            self.notifier.error(MSG_NO_BATCH_NO);
            return Err(UploadError::Validation(MSG_NO_BATCH_NO.to_string()));
        }
        if !confirm(&batch_no) {
            log::info!("[excel_upload] delete of {} cancelled", batch_no);
            return Ok(DeleteOutcome::Cancelled);
        }

        match self.api.delete_batch(&batch_no).await {
            Ok(resp) if resp.success => {
                self.notifier.success(resp.message);
                self.state().upload_result = None;
                self.load_batch_summary().await;
                Ok(DeleteOutcome::Deleted)
            }
            Ok(resp) => {
                self.notifier.error(resp.message.clone());
                Err(UploadError::Rejected(resp.message))
            }
            Err(source) => {
                log::error!("[excel_upload] delete of {} failed: {}", batch_no, source);
                let message = source
                    .body_message()
                    .unwrap_or_else(|| MSG_DELETE_FAILED.to_string());
                self.notifier.error(message.clone());
                Err(UploadError::Transport { message, source })
            }
        }
    }

    /// CSV of the current result's row errors. No network involved.
    pub fn export_error_report(&self) -> Result<ErrorReport, UploadError> {
        let rendered = self.state().upload_result.as_ref().and_then(report::render);
        rendered.ok_or_else(|| {
            self.notifier.error(MSG_NO_ERRORS);
            UploadError::Validation(MSG_NO_ERRORS.to_string())
        })
    }

    /// [`export_error_report`](Self::export_error_report) saved into the download directory.
    pub fn save_error_report(&self) -> Result<PathBuf, UploadError> {
        let report = self.export_error_report()?;
        report.write_to(&self.config.download_dir).map_err(|e| {
            self.notifier.error(e.to_string());
            e
        })
    }

    /// Fetch the blank template and save it as `upload_template.xlsx` in the download directory.
    pub async fn download_template(&self) -> Result<PathBuf, UploadError> {
        let bytes = match self.api.template().await {
            Ok(b) => b,
            Err(source) => {
                log::error!("[excel_upload] template download failed: {}", source);
                self.notifier.error(MSG_TEMPLATE_FAILED);
                return Err(UploadError::Transport {
                    message: MSG_TEMPLATE_FAILED.to_string(),
                    source,
                });
            }
        };
        let path = self.config.download_dir.join(TEMPLATE_FILE_NAME);
        if let Err(source) = tokio::fs::write(&path, &bytes).await {
            log::error!("[excel_upload] saving template to {} failed: {}", path.display(), source);
            self.notifier.error(MSG_TEMPLATE_FAILED);
            return Err(UploadError::Io { path, source });
        }
        log::info!("[excel_upload] template saved to {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }
}
