//! 附件編碼器：將使用者選取的檔案轉成可內嵌於 webhook 封包的表示法。
//!
//! 小於門檻的檔案以 base64 data URI 內嵌；達到門檻的檔案只附上說明，
//! 不做截斷也不做串流。

use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// 內嵌傳送的大小上限（1 MiB）。`size >= INLINE_LIMIT` 的檔案不會被讀取。
pub const INLINE_LIMIT: u64 = 1_048_576;

/// 檔案過大時附上的說明文字。
pub const OVERSIZED_NOTE: &str =
    "File too large for direct transfer. Consider using cloud storage.";

/// 讀取失敗時附上的固定錯誤訊息。
pub const READ_FAILURE: &str = "Failed to read file content";

const FALLBACK_MIME: &str = "application/octet-stream";

/// 使用者選取、尚未傳送的檔案控制代碼。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    pub path: PathBuf,
    pub name: String,
    pub mime: String,
    pub size: u64,
}

impl FileRef {
    pub fn new(
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        mime: impl Into<String>,
        size: u64,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            mime: mime.into(),
            size,
        }
    }

    /// 由檔案系統路徑建立控制代碼：名稱取檔名，MIME 依副檔名推測，大小取自中繼資料。
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a file", path.display()),
            ));
        }
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self {
            path: path.to_path_buf(),
            name,
            mime: guess_mime(path).to_string(),
            size: metadata.len(),
        })
    }

    /// 以整數 KB 顯示的大小，四捨五入。
    pub fn size_label(&self) -> String {
        format!("{}KB", (self.size as f64 / 1024.0).round() as u64)
    }

    pub fn descriptor(&self) -> FileDescriptor {
        FileDescriptor {
            name: self.name.clone(),
            mime: self.mime.clone(),
            size: self.size,
        }
    }
}

/// 供歷史紀錄顯示用的檔案摘要。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    pub name: String,
    pub mime: String,
    pub size: u64,
}

/// 封包中 `payload.file` 的線上格式。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePayload {
    pub name: String,
    #[serde(rename = "type")]
    pub mime: String,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 依大小政策編碼附件。讀取失敗不會中止派送，只會在 `error` 欄位註記。
pub async fn encode(file: &FileRef) -> FilePayload {
    let mut payload = FilePayload {
        name: file.name.clone(),
        mime: file.mime.clone(),
        size: file.size,
        content: None,
        note: None,
        error: None,
    };

    if file.size >= INLINE_LIMIT {
        debug!(
            "Attachment {} ({} bytes) exceeds inline limit",
            file.name, file.size
        );
        payload.note = Some(OVERSIZED_NOTE.to_string());
        return payload;
    }

    match tokio::fs::read(&file.path).await {
        Ok(bytes) => {
            payload.content = Some(data_uri(&file.mime, &bytes));
        }
        Err(err) => {
            warn!("Failed to read attachment {}: {}", file.path.display(), err);
            payload.error = Some(READ_FAILURE.to_string());
        }
    }
    payload
}

/// `data:<mime>;base64,<payload>`
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// 依副檔名推測 MIME 類型。
fn guess_mime(path: &Path) -> &'static str {
    let Some(extension) = path.extension().and_then(|ext| ext.to_str()) else {
        return FALLBACK_MIME;
    };
    match extension.to_ascii_lowercase().as_str() {
        "txt" | "log" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "text/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "yml" | "yaml" => "application/yaml",
        "toml" => "application/toml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        _ => FALLBACK_MIME,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_file_of(size: usize) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&vec![0xAB; size]).unwrap();
        file.flush().unwrap();
        file
    }

    fn decoded_len(content: &str) -> usize {
        let (prefix, encoded) = content.split_once(',').unwrap();
        assert_eq!(prefix, "data:application/octet-stream;base64");
        STANDARD.decode(encoded).unwrap().len()
    }

    #[tokio::test]
    async fn file_just_below_limit_is_inlined() {
        let file = temp_file_of(1_048_575);
        let handle = FileRef::from_path(file.path()).unwrap();
        let payload = encode(&handle).await;
        assert_eq!(payload.size, 1_048_575);
        assert!(payload.note.is_none());
        assert!(payload.error.is_none());
        assert_eq!(decoded_len(payload.content.as_deref().unwrap()), 1_048_575);
    }

    #[tokio::test]
    async fn file_at_limit_gets_a_note_instead_of_content() {
        let file = temp_file_of(1_048_576);
        let handle = FileRef::from_path(file.path()).unwrap();
        let payload = encode(&handle).await;
        assert!(payload.content.is_none());
        assert_eq!(payload.note.as_deref(), Some(OVERSIZED_NOTE));
    }

    #[tokio::test]
    async fn unreadable_file_is_flagged_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let handle = FileRef::new(dir.path().join("gone.txt"), "gone.txt", "text/plain", 12);
        let payload = encode(&handle).await;
        assert!(payload.content.is_none());
        assert_eq!(payload.error.as_deref(), Some(READ_FAILURE));
        assert_eq!(payload.name, "gone.txt");
    }

    #[test]
    fn size_label_rounds_to_whole_kilobytes() {
        let label = |size| FileRef::new("/tmp/a.bin", "a.bin", FALLBACK_MIME, size).size_label();
        assert_eq!(label(500), "0KB");
        assert_eq!(label(512), "1KB");
        assert_eq!(label(1536), "2KB");
        assert_eq!(label(1_048_576), "1024KB");
    }

    #[test]
    fn mime_is_guessed_from_extension() {
        assert_eq!(guess_mime(Path::new("report.PDF")), "application/pdf");
        assert_eq!(guess_mime(Path::new("notes.txt")), "text/plain");
        assert_eq!(guess_mime(Path::new("blob")), FALLBACK_MIME);
    }

    #[test]
    fn wire_format_uses_type_key_and_skips_absent_fields() {
        let payload = FilePayload {
            name: String::from("a.txt"),
            mime: String::from("text/plain"),
            size: 3,
            content: Some(data_uri("text/plain", b"abc")),
            note: None,
            error: None,
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "name": "a.txt",
                "type": "text/plain",
                "size": 3,
                "content": "data:text/plain;base64,YWJj"
            })
        );
    }
}
