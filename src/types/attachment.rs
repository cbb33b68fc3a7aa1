use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A file attachment encoded for a completion request.
///
/// The service expects the file bytes inline as a base64 data URI; no size
/// limit is enforced on this side, oversized payloads simply come back as an
/// HTTP failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAttachment {
    /// Original file name, shown in the conversation.
    pub name: String,

    /// `data:application/{ext};base64,...` payload.
    pub data: String,
}

impl FileAttachment {
    /// Builds an attachment from raw bytes.
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Self {
        let name = name.into();
        let ext = name.rsplit('.').next().unwrap_or("bin");
        let encoded = STANDARD.encode(bytes);
        let data = format!("data:application/{ext};base64,{encoded}");
        Self { name, data }
    }

    /// Reads a file from disk and encodes it.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|err| Error::io(format!("failed to read {}", path.display()), err))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::from_bytes(name, &bytes))
    }
}

/// A lightweight reference to a file already associated with a chat record.
///
/// History records carry these instead of the full payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentRef {
    /// File name.
    #[serde(default)]
    pub name: String,

    /// Download URL, when the service provides one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_data_uri() {
        let attachment = FileAttachment::from_bytes("notes.txt", b"hello");
        assert_eq!(attachment.name, "notes.txt");
        assert_eq!(attachment.data, "data:application/txt;base64,aGVsbG8=");
    }

    #[test]
    fn extension_defaults_for_bare_names() {
        let attachment = FileAttachment::from_bytes("README", b"x");
        assert!(attachment.data.starts_with("data:application/README;base64,"));
    }
}
