use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// The backend validates every row before answering, so uploads get far longer than other calls.
const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 600;
/// Same limit the backend's multipart resolver enforces.
const DEFAULT_MAX_FILE_SIZE_MB: u64 = 50;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Backend origin; endpoints live under `{base_url}/api/excel-upload`.
    pub base_url: String,
    pub timeout: Duration,
    /// Applies to `POST /upload` only, in place of `timeout`.
    pub upload_timeout: Duration,
    /// Where the template and error reports are saved.
    pub download_dir: PathBuf,
    /// In bytes. 0 disables the client-side size check.
    pub max_file_size: u64,
}

impl ClientConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let base_url = env::var("EXCEL_UPLOAD_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::check_base_url(&base_url)?;
        Ok(Self {
            base_url,
            timeout: Duration::from_secs(
                env::var("EXCEL_UPLOAD_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            upload_timeout: Duration::from_secs(
                env::var("EXCEL_UPLOAD_UPLOAD_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_UPLOAD_TIMEOUT_SECS),
            ),
            download_dir: env::var("EXCEL_UPLOAD_DOWNLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            max_file_size: env::var("EXCEL_UPLOAD_MAX_FILE_SIZE_MB")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(DEFAULT_MAX_FILE_SIZE_MB)
                * 1024
                * 1024,
        })
    }

    pub fn check_base_url(base_url: &str) -> anyhow::Result<()> {
        let url = reqwest::Url::parse(base_url)
            .map_err(|e| anyhow::anyhow!("invalid backend URL {:?}: {}", base_url, e))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("backend URL must be http or https, got {:?}", base_url);
        }
        Ok(())
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> anyhow::Result<Self> {
        let base_url = base_url.into();
        Self::check_base_url(&base_url)?;
        self.base_url = base_url;
        Ok(self)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            upload_timeout: Duration::from_secs(DEFAULT_UPLOAD_TIMEOUT_SECS),
            download_dir: PathBuf::from("."),
            max_file_size: DEFAULT_MAX_FILE_SIZE_MB * 1024 * 1024,
        }
    }
}
