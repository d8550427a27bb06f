//! Upload payloads and progress arithmetic.

use crate::api::{ApiError, ApiResult};
use std::path::Path;
use std::sync::Arc;

/// Progress sink receiving whole percentages.
pub type ProgressFn = Arc<dyn Fn(u8) + Send + Sync>;

/// File handed to a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = guess_content_type(&file_name).to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    /// Reads a local file into memory.
    ///
    /// # Errors
    /// - `Validation` when the path has no file name or cannot be read.
    pub fn from_path(path: impl AsRef<Path>) -> ApiResult<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                ApiError::validation(format!("`{}` has no file name", path.display()))
            })?;
        let bytes = std::fs::read(path).map_err(|err| {
            ApiError::validation(format!("failed to read `{}`: {err}", path.display()))
        })?;
        Ok(Self::new(file_name, bytes))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Whole percentage of `sent` over `total`, rounded, clamped to 100.
///
/// An empty body counts as fully sent.
pub fn progress_percent(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let percent = (sent.min(total) * 200 + total) / (total * 2);
    percent.min(100) as u8
}

fn guess_content_type(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "pdf" => "application/pdf",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "doc" => "application/msword",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::{progress_percent, UploadFile};

    #[test]
    fn percent_rounds_to_nearest() {
        assert_eq!(progress_percent(0, 3), 0);
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 67);
        assert_eq!(progress_percent(3, 3), 100);
        assert_eq!(progress_percent(0, 0), 100);
        assert_eq!(progress_percent(10, 3), 100);
    }

    #[test]
    fn content_type_follows_extension() {
        assert_eq!(UploadFile::new("Resume.PDF", vec![1]).content_type, "application/pdf");
        assert_eq!(
            UploadFile::new("notes", vec![]).content_type,
            "application/octet-stream"
        );
    }

    #[test]
    fn from_path_reads_bytes_and_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("guide.txt");
        std::fs::write(&path, b"two sum").expect("write fixture");

        let file = UploadFile::from_path(&path).expect("file should load");
        assert_eq!(file.file_name, "guide.txt");
        assert_eq!(file.content_type, "text/plain");
        assert_eq!(file.bytes, b"two sum");
    }

    #[test]
    fn from_path_reports_missing_file() {
        let err = UploadFile::from_path("/definitely/missing/file.pdf")
            .expect_err("missing file must fail");
        assert!(err.to_string().contains("failed to read"));
    }
}
