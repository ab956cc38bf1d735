//! CSV error report for a finished upload. Offline and synchronous.

use crate::error::UploadError;
use crate::models::{RowError, UploadResult};
use csv::{QuoteStyle, WriterBuilder};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};

pub const REPORT_HEADERS: [&str; 11] = [
    "Row",
    "Error",
    "Customer",
    "Account",
    "Branch",
    "Dr/Cr",
    "Currency",
    "Amount",
    "LCY Equivalent",
    "Txn Code",
    "Additional Text",
];

/// A rendered report, ready to be saved under `file_name`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorReport {
    pub file_name: String,
    pub contents: String,
}

impl ErrorReport {
    pub fn file_name_for(batch_no: &str) -> String {
        format!("batch_{}_errors.csv", batch_no)
    }

    /// Write into `dir` and return the full path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, UploadError> {
        let path = dir.join(&self.file_name);
        std::fs::write(&path, self.contents.as_bytes()).map_err(|source| UploadError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// Free-text columns are always quoted so separators inside them survive.
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn opt(s: &Option<String>) -> String {
    s.clone().unwrap_or_default()
}

fn opt_decimal(d: &Option<Decimal>) -> String {
    d.map(|v| v.normalize().to_string()).unwrap_or_default()
}

fn row(e: &RowError) -> [String; 11] {
    [
        e.row_number.to_string(),
        quoted(&e.error_message),
        opt(&e.rel_cust),
        opt(&e.account),
        opt(&e.account_branch),
        opt(&e.dr_cr),
        opt(&e.ccy_cd),
        opt_decimal(&e.amount),
        opt_decimal(&e.lcy_equivalent),
        opt(&e.txn_code),
        quoted(e.addl_text.as_deref().unwrap_or("")),
    ]
}

/// Render one line per row error under the fixed header. `None` when there is nothing to report.
pub fn render(result: &UploadResult) -> Option<ErrorReport> {
    if result.errors.is_empty() {
        return None;
    }
    // Quoting is decided per column above, so the writer must not add its own.
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .from_writer(Vec::new());
    let written = wtr
        .write_record(REPORT_HEADERS)
        .and_then(|_| result.errors.iter().try_for_each(|e| wtr.write_record(row(e))));
    if let Err(e) = written {
        log::error!("[excel_upload] error report rendering failed: {}", e);
        return None;
    }
    let bytes = match wtr.into_inner() {
        Ok(b) => b,
        Err(e) => {
            log::error!("[excel_upload] error report flush failed: {}", e);
            return None;
        }
    };
    Some(ErrorReport {
        file_name: ErrorReport::file_name_for(&result.batch_no),
        contents: String::from_utf8_lossy(&bytes).into_owned(),
    })
}
