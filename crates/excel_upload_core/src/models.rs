//! Wire models for the `/api/excel-upload` backend.
//! JSON field names follow the backend (camelCase results, snake_case reference data).

use crate::file::SelectedFile;
use crate::ids::{BatchNo, BranchCode, SourceCode};
use crate::utils::null_default;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Outcome of one `POST /upload`. Replaced wholesale on every attempt.
///
/// `success_count + error_count` may be lower than `total_rows`: the backend can skip rows
/// without reporting them as errors.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UploadResult {
    #[serde(deserialize_with = "null_default")]
    pub success: bool,
    #[serde(deserialize_with = "null_default")]
    pub message: String,
    #[serde(deserialize_with = "null_default")]
    pub batch_no: String,
    #[serde(deserialize_with = "null_default")]
    pub total_rows: u32,
    #[serde(deserialize_with = "null_default")]
    pub success_count: u32,
    #[serde(deserialize_with = "null_default")]
    pub error_count: u32,
    #[serde(deserialize_with = "null_default")]
    pub errors: Vec<RowError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_timestamp: Option<String>,
}

impl UploadResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Rows neither imported nor reported as failing.
    pub fn skipped_rows(&self) -> u32 {
        self.total_rows
            .saturating_sub(self.success_count)
            .saturating_sub(self.error_count)
    }
}

/// One rejected spreadsheet row. The echo fields are for reporting only.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RowError {
    #[serde(deserialize_with = "null_default")]
    pub row_number: u32,
    #[serde(deserialize_with = "null_default")]
    pub error_message: String,
    pub error_code: Option<String>,
    pub rel_cust: Option<String>,
    pub account: Option<String>,
    pub account_branch: Option<String>,
    pub dr_cr: Option<String>,
    pub ccy_cd: Option<String>,
    pub amount: Option<Decimal>,
    pub lcy_equivalent: Option<Decimal>,
    pub txn_code: Option<String>,
    pub addl_text: Option<String>,
    pub severity: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchOption {
    #[serde(rename = "branch_code")]
    pub code: String,
    #[serde(rename = "branch_name", default, deserialize_with = "null_default")]
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCodeOption {
    #[serde(rename = "source_code")]
    pub code: String,
}

/// Positional `[batchNo, recordCount]` record as returned by `GET /batches`.
/// Only the HTTP client sees this; it is converted to [`BatchSummaryEntry`] right away.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct RawBatchRecord(pub String, pub u64);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchSummaryEntry {
    pub batch_no: String,
    pub record_count: u64,
}

impl From<RawBatchRecord> for BatchSummaryEntry {
    fn from(RawBatchRecord(batch_no, record_count): RawBatchRecord) -> Self {
        Self {
            batch_no,
            record_count,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WorkingDayResponse {
    #[serde(deserialize_with = "crate::utils::date::deserialize")]
    pub working_day: NaiveDate,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub(crate) struct BatchExistsResponse {
    pub exists: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeleteBatchResponse {
    #[serde(deserialize_with = "null_default")]
    pub success: bool,
    #[serde(deserialize_with = "null_default")]
    pub message: String,
}

/// Everything one upload attempt sends. Built fresh from the form per submit and consumed by the upload.
#[derive(Clone, Debug, PartialEq)]
pub struct UploadRequest {
    pub batch_no: BatchNo,
    pub branch_code: BranchCode,
    pub source_code: SourceCode,
    pub exch_rate: Decimal,
    pub entry_date: NaiveDate,
    pub file: SelectedFile,
}

impl UploadRequest {
    /// Exchange rate as sent in the multipart form (`1`, `1.5`; no trailing zeros).
    pub fn exch_rate_text(&self) -> String {
        self.exch_rate.normalize().to_string()
    }

    pub fn entry_date_text(&self) -> String {
        crate::utils::date::format(&self.entry_date)
    }
}
