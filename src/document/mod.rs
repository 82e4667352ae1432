//! Read-only, line-indexed document access
//!
//! The analyzer never owns the text it inspects. Hosts hand it anything that
//! implements [`Document`]; [`TextDocument`] is the owned implementation used by
//! the session registry, the CLI and the tests.

mod language;

pub use language::{PLAIN_TEXT, detect_language_id, language_id_for_path};

use crate::error::DocumentError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Line-oriented view of a source file, immutable for one analysis call.
pub trait Document {
    /// Number of lines in the document
    fn line_count(&self) -> usize;

    /// Text of the 0-based line `index`, without its line terminator.
    ///
    /// Errors when `index >= line_count()`.
    fn line_at(&self, index: usize) -> Result<&str, DocumentError>;

    /// Language tag, used verbatim in the analysis context
    fn language_id(&self) -> &str;

    /// Index of the last line (0 for an empty document)
    fn last_line(&self) -> usize {
        self.line_count().saturating_sub(1)
    }
}

/// A range of selected lines; only `start_line` anchors the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Selection {
    /// First selected line (0-based)
    pub start_line: usize,
    /// Last selected line (0-based, inclusive)
    pub end_line: usize,
}

impl Selection {
    pub fn new(start_line: usize, end_line: usize) -> Self {
        Self {
            start_line,
            end_line,
        }
    }

    /// A selection covering a single line
    pub fn line(line: usize) -> Self {
        Self::new(line, line)
    }
}

/// Owned document backed by a vector of lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDocument {
    lines: Vec<String>,
    language_id: String,
}

impl TextDocument {
    /// Build a document from raw text.
    ///
    /// Lines are split on `\n` (a trailing `\r` is dropped), so a trailing newline
    /// yields a final empty line the way editors count it.
    pub fn from_text(text: &str, language_id: impl Into<String>) -> Self {
        let lines = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect();

        Self {
            lines,
            language_id: language_id.into(),
        }
    }

    /// Build a document from already-split lines
    pub fn from_lines<I, S>(lines: I, language_id: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            language_id: language_id.into(),
        }
    }

    /// Read a UTF-8 text file, detecting its language from the extension.
    pub fn from_file(path: &Path, max_file_size: usize) -> Result<Self, DocumentError> {
        let file = path.display().to_string();
        let bytes = fs::read(path).map_err(|e| DocumentError::ReadFailed {
            file: file.clone(),
            reason: e.to_string(),
        })?;

        if bytes.len() > max_file_size {
            return Err(DocumentError::FileTooLarge {
                size: bytes.len(),
                max: max_file_size,
            });
        }

        if !is_text(&bytes) {
            return Err(DocumentError::BinaryFile(file));
        }

        let text = String::from_utf8(bytes).map_err(|e| DocumentError::ReadFailed {
            file,
            reason: format!("not valid UTF-8: {}", e),
        })?;

        Ok(Self::from_text(&text, language_id_for_path(path)))
    }

    /// All lines of the document
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Full text joined with `\n`
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

impl Document for TextDocument {
    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line_at(&self, index: usize) -> Result<&str, DocumentError> {
        self.lines
            .get(index)
            .map(String::as_str)
            .ok_or(DocumentError::LineOutOfRange {
                line: index,
                line_count: self.lines.len(),
            })
    }

    fn language_id(&self) -> &str {
        &self.language_id
    }
}

/// Simple heuristic: if more than 30% of bytes are non-printable, it's binary
fn is_text(content: &[u8]) -> bool {
    if content.is_empty() {
        return true;
    }

    let non_printable = content
        .iter()
        .filter(|&&b| b < 0x20 && b != b'\n' && b != b'\r' && b != b'\t')
        .count();

    (non_printable as f64 / content.len() as f64) < 0.3
}
