use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;

use crate::core::error::FormError;

lazy_static! {
    static ref TEXT_LIKE: Regex = Regex::new("text.*").unwrap();
}

/// A file picked for one of the form's file slots.
///
/// The media type is declared up front from the extension, the way a browser
/// fills in `File.type`, so support can be decided before any bytes are read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub path: PathBuf,
    pub name: String,
    pub media_type: String,
}

impl UploadedFile {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        let media_type = guess_media_type(&path).to_string();
        Self {
            path,
            name,
            media_type,
        }
    }

    pub fn is_text_like(&self) -> bool {
        TEXT_LIKE.is_match(&self.media_type)
    }

    /// Reject anything that is not text before it reaches the reader
    pub fn ensure_supported(&self) -> Result<(), FormError> {
        if self.is_text_like() {
            Ok(())
        } else {
            Err(FormError::UnsupportedMediaType {
                name: self.name.clone(),
                media_type: self.media_type.clone(),
            })
        }
    }
}

pub fn guess_media_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "csv" => "text/csv",
        "tsv" => "text/tab-separated-values",
        "txt" => "text/plain",
        "json" => "application/json",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}
