//! The spreadsheet picked for upload and the checks applied when it is selected.

use std::fmt;
use std::path::Path;

pub const XLSX_MEDIA_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const XLS_MEDIA_TYPE: &str = "application/vnd.ms-excel";

/// Media types the backend can parse.
pub const ACCEPTED_MEDIA_TYPES: [&str; 2] = [XLSX_MEDIA_TYPE, XLS_MEDIA_TYPE];

#[derive(Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub file_name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(file_name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_spreadsheet(&self) -> bool {
        ACCEPTED_MEDIA_TYPES.contains(&self.media_type.as_str())
    }
}

// Payloads can be tens of megabytes; keep them out of debug output.
impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("file_name", &self.file_name)
            .field("media_type", &self.media_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Why a selected file was refused.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileRejection {
    UnsupportedType(String),
    TooLarge { size: u64, max: u64 },
}

impl FileRejection {
    /// Message shown to the user.
    pub fn message(&self) -> String {
        match self {
            FileRejection::UnsupportedType(_) => {
                "Please select a valid Excel file (.xlsx or .xls)".to_string()
            }
            FileRejection::TooLarge { max, .. } => format!(
                "File size exceeds maximum allowed size ({}MB)",
                max / (1024 * 1024)
            ),
        }
    }
}

/// Type check first, then size. `max_size` of 0 disables the size check.
pub fn validate(file: &SelectedFile, max_size: u64) -> Result<(), FileRejection> {
    if !file.is_spreadsheet() {
        return Err(FileRejection::UnsupportedType(file.media_type.clone()));
    }
    if max_size > 0 && file.size() > max_size {
        return Err(FileRejection::TooLarge {
            size: file.size(),
            max: max_size,
        });
    }
    Ok(())
}

/// Media type for a local path, by extension. Unknown extensions map to `application/octet-stream`,
/// which [`validate`] rejects.
pub fn media_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("xlsx") => XLSX_MEDIA_TYPE,
        Some("xls") => XLS_MEDIA_TYPE,
        _ => "application/octet-stream",
    }
}
