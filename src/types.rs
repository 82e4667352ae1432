//! MCP tool request and response types.
//!
//! Line numbers are 0-based on the wire, matching the analyzer.

use crate::analysis::CodeContext;
use crate::document::Selection;
use crate::error::ValidationError;
use crate::session::{DocumentSummary, OpenOutcome};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Request to open (or refresh) a document
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OpenDocumentRequest {
    /// Path of the document; also its identifier in later calls
    pub path: String,
    /// Optional in-memory text (e.g. unsaved editor contents). Read from disk when omitted.
    #[serde(default)]
    pub text: Option<String>,
    /// Optional language id (e.g. "typescript"). Detected from the extension when omitted.
    #[serde(default)]
    pub language_id: Option<String>,
}

/// Response from opening a document
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OpenDocumentResponse {
    pub path: String,
    /// Whether the document was newly opened, updated or unchanged
    pub outcome: OpenOutcome,
    pub language_id: String,
    pub line_count: usize,
}

/// Request to close a document
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CloseDocumentRequest {
    /// Path the document was opened with
    pub path: String,
}

/// Response from closing a document
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CloseDocumentResponse {
    pub path: String,
    /// False when the document was not open
    pub was_open: bool,
}

/// Request to list open documents
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListDocumentsRequest {}

/// Open documents, ordered by path
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListDocumentsResponse {
    pub documents: Vec<DocumentSummary>,
}

/// Request to find the lines related to one line
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FindRelatedLinesRequest {
    /// Path of the document; opened from disk if not already open
    pub path: String,
    /// Target line (0-based)
    pub line: usize,
}

/// A related line and its text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RelatedLine {
    /// Line number (0-based)
    pub line: usize,
    pub text: String,
}

/// Response from finding related lines
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FindRelatedLinesResponse {
    pub path: String,
    pub line: usize,
    /// Related lines in ascending order, including the target
    pub related_lines: Vec<RelatedLine>,
}

/// Request to analyze a selection
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzeSelectionRequest {
    /// Path of the document; opened from disk if not already open
    pub path: String,
    /// First selected line (0-based); anchors the analysis
    pub start_line: usize,
    /// Last selected line (0-based, inclusive). Defaults to start_line.
    #[serde(default)]
    pub end_line: Option<usize>,
    /// Include the rendered model prompt in the response (default: true)
    #[serde(default = "default_include_prompt")]
    pub include_prompt: bool,
}

fn default_include_prompt() -> bool {
    true
}

impl AnalyzeSelectionRequest {
    /// The selection this request describes
    pub fn selection(&self) -> Selection {
        Selection::new(self.start_line, self.end_line.unwrap_or(self.start_line))
    }
}

/// Response from analyzing a selection
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzeSelectionResponse {
    pub path: String,
    pub selection: Selection,
    /// Related lines in ascending order, including the selection start
    pub related_lines: Vec<RelatedLine>,
    pub context: CodeContext,
    /// Text prepared for a language model, when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

fn validate_path(path: &str) -> Result<(), String> {
    if path.trim().is_empty() {
        return Err(ValidationError::Empty("path".to_string()).to_string());
    }
    Ok(())
}

impl OpenDocumentRequest {
    pub fn validate(&self) -> Result<(), String> {
        validate_path(&self.path)?;
        if let Some(language_id) = &self.language_id
            && language_id.trim().is_empty()
        {
            return Err("language_id cannot be empty when provided".to_string());
        }
        Ok(())
    }
}

impl CloseDocumentRequest {
    pub fn validate(&self) -> Result<(), String> {
        validate_path(&self.path)
    }
}

impl FindRelatedLinesRequest {
    pub fn validate(&self) -> Result<(), String> {
        validate_path(&self.path)
    }
}

impl AnalyzeSelectionRequest {
    pub fn validate(&self) -> Result<(), String> {
        validate_path(&self.path)?;
        if let Some(end_line) = self.end_line
            && end_line < self.start_line
        {
            return Err(ValidationError::ConstraintViolation {
                field: "end_line".to_string(),
                constraint: format!("at least start_line ({})", self.start_line),
                actual: end_line.to_string(),
            }
            .to_string());
        }
        Ok(())
    }
}
