//! HTTP client for the excel-upload backend (`/api/excel-upload`).
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::models::{
    BatchExistsResponse, BatchSummaryEntry, BranchOption, DeleteBatchResponse, RawBatchRecord,
    SourceCodeOption, UploadRequest, UploadResult, WorkingDayResponse,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::multipart;
use serde::de::DeserializeOwned;
use std::time::Duration;

pub const API_PREFIX: &str = "/api/excel-upload";

/// The backend as seen by the orchestrator: one method per endpoint.
#[async_trait]
pub trait UploadApi: Send + Sync {
    /// GET /branches
    async fn branches(&self) -> Result<Vec<BranchOption>, ApiError>;

    /// GET /source-codes
    async fn source_codes(&self) -> Result<Vec<SourceCodeOption>, ApiError>;

    /// GET /batches, positional records already mapped to named entries.
    async fn batches(&self) -> Result<Vec<BatchSummaryEntry>, ApiError>;

    /// GET /working-day/{branchCode}
    async fn working_day(&self, branch_code: &str) -> Result<NaiveDate, ApiError>;

    /// GET /batch/{batchNo}/exists
    async fn batch_exists(&self, batch_no: &str) -> Result<bool, ApiError>;

    /// POST /upload (multipart). Any 2xx body is returned as-is, including `success: false`.
    async fn upload(&self, request: &UploadRequest) -> Result<UploadResult, ApiError>;

    /// DELETE /batch/{batchNo}
    async fn delete_batch(&self, batch_no: &str) -> Result<DeleteBatchResponse, ApiError>;

    /// GET /template
    async fn template(&self) -> Result<Vec<u8>, ApiError>;
}

pub struct HttpUploadApi {
    client: reqwest::Client,
    base: String,
    /// Overrides the client-wide timeout for `POST /upload`.
    upload_timeout: Option<Duration>,
}

impl HttpUploadApi {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self::with_client(client, &config.base_url).with_upload_timeout(config.upload_timeout))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        let base = format!("{}{}", base_url.trim_end_matches('/'), API_PREFIX);
        Self {
            client,
            base,
            upload_timeout: None,
        }
    }

    pub fn with_upload_timeout(mut self, timeout: Duration) -> Self {
        self.upload_timeout = Some(timeout);
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Non-2xx becomes `ApiError::Status` with the body kept for later inspection.
    async fn read_body(resp: reqwest::Response) -> Result<String, ApiError> {
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self.client.get(self.url(path)).send().await?;
        let text = Self::read_body(resp).await?;
        Ok(serde_json::from_str(&text)?)
    }
}

fn segment(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

fn upload_form(request: &UploadRequest) -> Result<multipart::Form, ApiError> {
    let file = multipart::Part::bytes(request.file.bytes.clone())
        .file_name(request.file.file_name.clone())
        .mime_str(&request.file.media_type)?;
    Ok(multipart::Form::new()
        .part("file", file)
        .text("batchNo", request.batch_no.to_string())
        .text("branchCode", request.branch_code.to_string())
        .text("sourceCode", request.source_code.to_string())
        .text("exchRate", request.exch_rate_text())
        .text("entryDate", request.entry_date_text()))
}

#[async_trait]
impl UploadApi for HttpUploadApi {
    async fn branches(&self) -> Result<Vec<BranchOption>, ApiError> {
        self.get_json("/branches").await
    }

    async fn source_codes(&self) -> Result<Vec<SourceCodeOption>, ApiError> {
        self.get_json("/source-codes").await
    }

    async fn batches(&self) -> Result<Vec<BatchSummaryEntry>, ApiError> {
        let raw: Vec<RawBatchRecord> = self.get_json("/batches").await?;
        Ok(raw.into_iter().map(BatchSummaryEntry::from).collect())
    }

    async fn working_day(&self, branch_code: &str) -> Result<NaiveDate, ApiError> {
        let path = format!("/working-day/{}", segment(branch_code));
        let resp: WorkingDayResponse = self.get_json(&path).await?;
        Ok(resp.working_day)
    }

    async fn batch_exists(&self, batch_no: &str) -> Result<bool, ApiError> {
        let path = format!("/batch/{}/exists", segment(batch_no));
        let resp: BatchExistsResponse = self.get_json(&path).await?;
        Ok(resp.exists)
    }

    async fn upload(&self, request: &UploadRequest) -> Result<UploadResult, ApiError> {
        let form = upload_form(request)?;
        log::debug!(
            "[excel_upload] POST /upload batch_no={} file={} size={}",
            request.batch_no,
            request.file.file_name,
            request.file.size()
        );
        let mut req = self.client.post(self.url("/upload")).multipart(form);
        if let Some(timeout) = self.upload_timeout {
            req = req.timeout(timeout);
        }
        let resp = req.send().await?;
        let text = Self::read_body(resp).await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn delete_batch(&self, batch_no: &str) -> Result<DeleteBatchResponse, ApiError> {
        let path = format!("/batch/{}", segment(batch_no));
        let resp = self.client.delete(self.url(&path)).send().await?;
        let text = Self::read_body(resp).await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn template(&self) -> Result<Vec<u8>, ApiError> {
        let resp = self.client.get(self.url("/template")).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.bytes().await?.to_vec())
    }
}
