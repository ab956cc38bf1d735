//! Scripted in-memory backend. Every endpoint answers from a script and every call is recorded,
//! so tests can assert on what was (and was not) sent.

use async_trait::async_trait;
use chrono::NaiveDate;
use excel_upload_core::{
    ApiError, BatchSummaryEntry, BranchOption, DeleteBatchResponse, SourceCodeOption, UploadApi,
    UploadRequest, UploadResult,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Scripted answer: a body, or a failure as (HTTP status, raw body).
pub type Reply<T> = Result<T, (u16, String)>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Branches,
    SourceCodes,
    Batches,
    WorkingDay(String),
    BatchExists(String),
    Upload {
        batch_no: String,
        branch_code: String,
        source_code: String,
        exch_rate: String,
        entry_date: String,
        file_name: String,
    },
    DeleteBatch(String),
    Template,
}

struct Script {
    branches: Reply<Vec<BranchOption>>,
    source_codes: Reply<Vec<SourceCodeOption>>,
    /// Popped front to back; the last entry repeats.
    batches: VecDeque<Reply<Vec<BatchSummaryEntry>>>,
    working_day: Reply<NaiveDate>,
    batch_exists: Reply<bool>,
    upload: Reply<UploadResult>,
    delete: Reply<DeleteBatchResponse>,
    template: Reply<Vec<u8>>,
}

pub struct FakeApi {
    script: Mutex<Script>,
    calls: Mutex<Vec<Call>>,
    upload_gate: Mutex<Option<Arc<Notify>>>,
    batches_gate: Mutex<Option<Arc<Notify>>>,
}

fn answer<T: Clone>(reply: &Reply<T>) -> Result<T, ApiError> {
    reply
        .clone()
        .map_err(|(status, body)| ApiError::Status { status, body })
}

impl FakeApi {
    /// Empty reference data, no batches, nothing exists, uploads succeed.
    pub fn new() -> Self {
        Self {
            script: Mutex::new(Script {
                branches: Ok(vec![]),
                source_codes: Ok(vec![]),
                batches: VecDeque::from([Ok(vec![])]),
                working_day: Err((404, String::new())),
                batch_exists: Ok(false),
                upload: Ok(UploadResult {
                    success: true,
                    message: "OK".into(),
                    ..Default::default()
                }),
                delete: Ok(DeleteBatchResponse { success: true, message: "Deleted".into() }),
                template: Ok(vec![0x50, 0x4b, 0x03, 0x04]),
            }),
            calls: Mutex::new(Vec::new()),
            upload_gate: Mutex::new(None),
            batches_gate: Mutex::new(None),
        }
    }

    pub fn branches(self, reply: Reply<Vec<BranchOption>>) -> Self {
        self.script.lock().unwrap().branches = reply;
        self
    }

    pub fn source_codes(self, reply: Reply<Vec<SourceCodeOption>>) -> Self {
        self.script.lock().unwrap().source_codes = reply;
        self
    }

    pub fn batches(self, replies: Vec<Reply<Vec<BatchSummaryEntry>>>) -> Self {
        self.script.lock().unwrap().batches = replies.into();
        self
    }

    pub fn working_day(self, reply: Reply<NaiveDate>) -> Self {
        self.script.lock().unwrap().working_day = reply;
        self
    }

    pub fn batch_exists(self, reply: Reply<bool>) -> Self {
        self.script.lock().unwrap().batch_exists = reply;
        self
    }

    pub fn upload(self, reply: Reply<UploadResult>) -> Self {
        self.script.lock().unwrap().upload = reply;
        self
    }

    pub fn delete(self, reply: Reply<DeleteBatchResponse>) -> Self {
        self.script.lock().unwrap().delete = reply;
        self
    }

    pub fn template(self, reply: Reply<Vec<u8>>) -> Self {
        self.script.lock().unwrap().template = reply;
        self
    }

    /// Change the upload answer after the orchestrator took ownership.
    pub fn set_upload(&self, reply: Reply<UploadResult>) {
        self.script.lock().unwrap().upload = reply;
    }

    /// Make the next uploads wait until the returned handle is notified.
    pub fn hold_uploads(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.upload_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Make the next batch list load wait until the returned handle is notified. Its answer is
    /// taken from the script when the call arrives, not when it is released.
    pub fn hold_next_batches(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.batches_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    pub fn upload_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::Upload { .. }))
    }

    pub fn batch_reloads(&self) -> usize {
        self.count(|c| matches!(c, Call::Batches))
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl UploadApi for FakeApi {
    async fn branches(&self) -> Result<Vec<BranchOption>, ApiError> {
        self.record(Call::Branches);
        answer(&self.script.lock().unwrap().branches)
    }

    async fn source_codes(&self) -> Result<Vec<SourceCodeOption>, ApiError> {
        self.record(Call::SourceCodes);
        answer(&self.script.lock().unwrap().source_codes)
    }

    async fn batches(&self) -> Result<Vec<BatchSummaryEntry>, ApiError> {
        self.record(Call::Batches);
        let reply = {
            let mut script = self.script.lock().unwrap();
            if script.batches.len() > 1 {
                script.batches.pop_front().unwrap_or(Ok(vec![]))
            } else {
                script.batches.front().cloned().unwrap_or(Ok(vec![]))
            }
        };
        let gate = self.batches_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        answer(&reply)
    }

    async fn working_day(&self, branch_code: &str) -> Result<NaiveDate, ApiError> {
        self.record(Call::WorkingDay(branch_code.to_string()));
        answer(&self.script.lock().unwrap().working_day)
    }

    async fn batch_exists(&self, batch_no: &str) -> Result<bool, ApiError> {
        self.record(Call::BatchExists(batch_no.to_string()));
        answer(&self.script.lock().unwrap().batch_exists)
    }

    async fn upload(&self, request: &UploadRequest) -> Result<UploadResult, ApiError> {
        self.record(Call::Upload {
            batch_no: request.batch_no.to_string(),
            branch_code: request.branch_code.to_string(),
            source_code: request.source_code.to_string(),
            exch_rate: request.exch_rate_text(),
            entry_date: request.entry_date_text(),
            file_name: request.file.file_name.clone(),
        });
        let gate = self.upload_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        answer(&self.script.lock().unwrap().upload)
    }

    async fn delete_batch(&self, batch_no: &str) -> Result<DeleteBatchResponse, ApiError> {
        self.record(Call::DeleteBatch(batch_no.to_string()));
        answer(&self.script.lock().unwrap().delete)
    }

    async fn template(&self) -> Result<Vec<u8>, ApiError> {
        self.record(Call::Template);
        answer(&self.script.lock().unwrap().template)
    }
}
