use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::preview::{compress_preview, escape_field, unescape_field};
use crate::error::{Error, Result};

/// Where a bookmark jumps to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JumpTarget {
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
}

impl JumpTarget {
    pub fn new(path: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            path: path.into(),
            line,
        }
    }

    /// Short `file_name:line` form for menus and messages
    pub fn location(&self) -> String {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string());
        format!("{}:{}", name, self.line)
    }
}

/// A saved bookmark: a preview label plus its jump target.
///
/// Stored as a single line, `<label>\t<path>:<line>`, with both text fields
/// escaped so neither contains a tab or a line break.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bookmark {
    pub label: String,
    #[serde(flatten)]
    pub target: JumpTarget,
}

impl Bookmark {
    pub fn new(label: impl Into<String>, path: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            label: label.into(),
            target: JumpTarget::new(path, line),
        }
    }

    /// Bookmark `line` of `path`, labelled with a compressed copy of `text`
    pub fn from_line(path: &Path, line: usize, text: &str, preview_width: usize) -> Self {
        let mut label = compress_preview(text, preview_width);
        if label.is_empty() {
            label = format!("<blank line {}>", line);
        }
        Self::new(label, path, line)
    }

    pub fn to_record(&self) -> String {
        format!(
            "{}\t{}:{}",
            escape_field(&self.label),
            escape_field(&self.target.path.to_string_lossy()),
            self.target.line
        )
    }

    pub fn parse(record: &str) -> Result<Self> {
        let malformed = || Error::MalformedRecord(record.to_string());

        let (label, target) = record.split_once('\t').ok_or_else(malformed)?;
        let (path, line) = target.rsplit_once(':').ok_or_else(malformed)?;
        let line: usize = line.trim().parse().map_err(|_| malformed())?;
        if path.is_empty() || line == 0 {
            return Err(malformed());
        }

        Ok(Self::new(
            unescape_field(label),
            unescape_field(path),
            line,
        ))
    }
}

impl fmt::Display for Bookmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  [{}]", self.label, self.target.location())
    }
}
