//! Batch number existence check run before every upload.
//!
//! The check fails open: if the lookup itself fails, the batch is reported as not existing and the
//! upload goes ahead. The backend enforces uniqueness again when the file arrives, so a lookup
//! outage must not block uploads.

use crate::api::UploadApi;

/// `true` only when the backend positively reports the batch as existing.
/// Empty input never reaches the network.
pub async fn check_batch_exists<A>(api: &A, batch_no: &str) -> bool
where
    A: UploadApi + ?Sized,
{
    if batch_no.is_empty() {
        return false;
    }
    match api.batch_exists(batch_no).await {
        Ok(exists) => {
            log::debug!("[excel_upload] batch_exists batch_no={} exists={}", batch_no, exists);
            exists
        }
        Err(e) => {
            log::warn!(
                "[excel_upload] batch_exists lookup failed for {}, continuing with upload: {}",
                batch_no,
                e
            );
            false
        }
    }
}
