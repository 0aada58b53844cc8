use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Extensions accepted by the file input, in the order the picker lists them.
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "txt", "md", "json", "csv", "doc", "docx"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentExtension {
    Pdf,
    Txt,
    Md,
    Json,
    Csv,
    Doc,
    Docx,
}

impl DocumentExtension {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" => Some(Self::Txt),
            "md" => Some(Self::Md),
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            "doc" => Some(Self::Doc),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Txt => "txt",
            Self::Md => "md",
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Doc => "doc",
            Self::Docx => "docx",
        }
    }

    /// Plain-text formats that can be decoded directly.
    pub fn is_plain_text(&self) -> bool {
        matches!(self, Self::Txt | Self::Md | Self::Json | Self::Csv)
    }
}

impl fmt::Display for DocumentExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text after the last `.` of a file name, if any.
pub fn raw_extension(name: &str) -> Option<&str> {
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext)
    }
}

/// The user's selected input. Content is shared, never mutated.
#[derive(Clone)]
pub struct Document {
    name: String,
    content: Arc<[u8]>,
}

impl Document {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: Arc::from(content.into()),
        }
    }

    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        Ok(Self::new(name, content))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Allow-listed extension, or `None` when the file would be rejected.
    pub fn extension(&self) -> Option<DocumentExtension> {
        raw_extension(&self.name).and_then(DocumentExtension::from_extension)
    }

    pub fn is_supported(&self) -> bool {
        self.extension().is_some()
    }

    /// File name without its last extension.
    pub fn stem(&self) -> &str {
        match self.name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.name,
        }
    }

    /// Lowercase hex SHA-256 of the content.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.content);
        hex::encode(hasher.finalize())
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("name", &self.name)
            .field("size", &self.content.len())
            .finish()
    }
}
