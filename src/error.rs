use std::io;

/// Errors from the bookmark store, the editor host and scripting
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed bookmark record: {0:?}")]
    MalformedRecord(String),

    #[error("No file name")]
    NoFileName,

    #[error("No bookmark at index {0}")]
    NoSuchBookmark(usize),

    #[error("Line {line} out of range (buffer has {count} lines)")]
    LineOutOfRange { line: usize, count: usize },

    #[error("No write since last change (add ! to override)")]
    UnsavedChanges,

    #[error("Script error: {0}")]
    Script(String),
}

pub type Result<T> = std::result::Result<T, Error>;
