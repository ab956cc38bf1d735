//! Errors: `ApiError` for the HTTP boundary, `UploadError` for what an orchestrator action reports back.

use crate::models::UploadResult;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("error sending request: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    fn body_json(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::Status { body, .. } => serde_json::from_str(body).ok(),
            _ => None,
        }
    }

    /// `message` of a structured error body (`{"success": false, "message": "..."}`), if the server sent one.
    pub fn body_message(&self) -> Option<String> {
        self.body_json()?
            .get("message")
            .and_then(|m| m.as_str())
            .filter(|m| !m.is_empty())
            .map(String::from)
    }

    /// The error body read as an upload result. Only bodies carrying a message qualify;
    /// missing result fields take their defaults.
    pub fn structured_result(&self) -> Option<UploadResult> {
        let json = self.body_json()?;
        let has_message = json
            .get("message")
            .and_then(|m| m.as_str())
            .is_some_and(|m| !m.is_empty());
        if !has_message {
            return None;
        }
        serde_json::from_value(json).ok()
    }
}

/// Failure of one user action. Each variant has already been surfaced as a notification
/// by the time the caller sees it.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Missing or invalid input, caught before any request.
    #[error("{0}")]
    Validation(String),

    #[error("Batch {batch_no} already exists in the system")]
    Conflict { batch_no: String },

    #[error("An upload is already in progress")]
    InProgress,

    /// The backend answered but refused the operation.
    #[error("{0}")]
    Rejected(String),

    #[error("{message}")]
    Transport {
        message: String,
        #[source]
        source: ApiError,
    },

    #[error("failed to save {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
