//! Per-document analysis sessions
//!
//! A [`SessionRegistry`] owns every open document, keyed by a stable identifier
//! (normally the file path). Hosts open a document when it appears, query it while
//! it stays open and close it explicitly when it goes away. Each session keeps a
//! bounded history of analysis results, newest last.

use crate::analysis::{CodeAnalysisResult, CodeContext, RelationAnalyzer, build_prompt_context};
use crate::config::{Config, SessionConfig};
use crate::document::{Document, Selection, TextDocument};
use crate::error::{AnalysisError, DocumentError, RelatedLinesError, SessionError};
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};
use std::path::Path;

/// What [`SessionRegistry::open`] did with the submitted text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OpenOutcome {
    /// A new session was created
    Opened,
    /// The session existed and its content changed
    Updated,
    /// The session existed with identical content
    Unchanged,
}

/// One recorded analysis of a session's document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HistoryEntry {
    /// RFC 3339 timestamp of the analysis
    pub recorded_at: String,
    pub selection: Selection,
    /// Lines to highlight, ascending
    pub related_lines: Vec<usize>,
    /// Present for full selection analyses only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<CodeContext>,
}

/// Listing entry for an open document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DocumentSummary {
    pub id: String,
    pub language_id: String,
    pub line_count: usize,
    pub content_hash: String,
    pub opened_at: String,
    pub updated_at: String,
    pub history_len: usize,
}

/// An open document and its analysis history
#[derive(Debug, Clone)]
pub struct DocumentSession {
    document: TextDocument,
    content_hash: String,
    opened_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    history: VecDeque<HistoryEntry>,
}

impl DocumentSession {
    fn new(document: TextDocument, content_hash: String) -> Self {
        let now = Utc::now();
        Self {
            document,
            content_hash,
            opened_at: now,
            updated_at: now,
            history: VecDeque::new(),
        }
    }

    pub fn document(&self) -> &TextDocument {
        &self.document
    }

    /// SHA-256 of the document text, hex encoded
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    /// Recorded analyses, oldest first
    pub fn history(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.history.iter()
    }

    /// Most recent recorded analysis
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.history.back()
    }

    fn record(&mut self, entry: HistoryEntry, limit: usize) {
        self.history.push_back(entry);
        while self.history.len() > limit {
            self.history.pop_front();
        }
    }

    fn summary(&self, id: &str) -> DocumentSummary {
        DocumentSummary {
            id: id.to_string(),
            language_id: self.document.language_id().to_string(),
            line_count: self.document.line_count(),
            content_hash: self.content_hash.clone(),
            opened_at: self.opened_at.to_rfc3339(),
            updated_at: self.updated_at.to_rfc3339(),
            history_len: self.history.len(),
        }
    }
}

/// Hex-encoded SHA-256 of a document's text
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Registry of open document sessions sharing one analyzer.
pub struct SessionRegistry {
    analyzer: RelationAnalyzer,
    config: SessionConfig,
    sessions: HashMap<String, DocumentSession>,
}

impl SessionRegistry {
    pub fn new(analyzer: RelationAnalyzer, config: SessionConfig) -> Self {
        Self {
            analyzer,
            config,
            sessions: HashMap::new(),
        }
    }

    /// Registry with the standard analyzer built from `config`
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            RelationAnalyzer::with_config(config.analysis.clone()),
            config.session.clone(),
        )
    }

    pub fn analyzer(&self) -> &RelationAnalyzer {
        &self.analyzer
    }

    /// Open a document, or refresh it if `id` is already open.
    ///
    /// Replacing the content of an open document clears its history, since recorded
    /// line numbers refer to the old text.
    pub fn open(
        &mut self,
        id: impl Into<String>,
        text: &str,
        language_id: &str,
    ) -> Result<OpenOutcome, SessionError> {
        let id = id.into();
        let hash = content_hash(text);

        if let Some(session) = self.sessions.get_mut(&id) {
            if session.content_hash == hash && session.document.language_id() == language_id {
                return Ok(OpenOutcome::Unchanged);
            }

            session.document = TextDocument::from_text(text, language_id);
            session.content_hash = hash;
            session.updated_at = Utc::now();
            session.history.clear();
            tracing::info!("Updated document {} ({} lines)", id, session.document.line_count());
            return Ok(OpenOutcome::Updated);
        }

        if self.sessions.len() >= self.config.max_open_documents {
            return Err(SessionError::LimitReached {
                id,
                max: self.config.max_open_documents,
            });
        }

        let document = TextDocument::from_text(text, language_id);
        tracing::info!("Opened document {} ({} lines)", id, document.line_count());
        self.sessions.insert(id, DocumentSession::new(document, hash));
        Ok(OpenOutcome::Opened)
    }

    /// Open a file from disk under its path, detecting the language from the
    /// extension.
    pub fn open_file(&mut self, path: &Path) -> Result<(String, OpenOutcome), RelatedLinesError> {
        let document = TextDocument::from_file(path, self.analyzer.config().max_file_size)?;
        let id = path.display().to_string();
        let outcome = self.open(id.clone(), &document.text(), document.language_id())?;
        Ok((id, outcome))
    }

    /// Close a document; returns whether it was open.
    pub fn close(&mut self, id: &str) -> bool {
        let closed = self.sessions.remove(id).is_some();
        if closed {
            tracing::info!("Closed document {}", id);
        }
        closed
    }

    pub fn get(&self, id: &str) -> Option<&DocumentSession> {
        self.sessions.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Open documents ordered by id
    pub fn list(&self) -> Vec<DocumentSummary> {
        let mut summaries: Vec<DocumentSummary> = self
            .sessions
            .iter()
            .map(|(id, session)| session.summary(id))
            .collect();
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        summaries
    }

    /// Recorded analyses of a document, oldest first
    pub fn history(&self, id: &str) -> Result<Vec<HistoryEntry>, SessionError> {
        Ok(self.session(id)?.history().cloned().collect())
    }

    /// Related lines for `line` of an open document, recorded in its history.
    ///
    /// Lines past the end of the document are rejected and nothing is recorded.
    pub fn find_related_lines(
        &mut self,
        id: &str,
        line: usize,
    ) -> Result<Vec<usize>, RelatedLinesError> {
        let limit = self.config.history_limit;
        let session = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
        check_line(&session.document, line)?;

        let related_lines = self.analyzer.find_related_lines(&session.document, line);
        session.record(
            HistoryEntry {
                recorded_at: Utc::now().to_rfc3339(),
                selection: Selection::line(line),
                related_lines: related_lines.clone(),
                context: None,
            },
            limit,
        );
        Ok(related_lines)
    }

    /// Full analysis of a selection in an open document, recorded in its history.
    pub fn analyze_selection(
        &mut self,
        id: &str,
        selection: Selection,
    ) -> Result<CodeAnalysisResult, RelatedLinesError> {
        let limit = self.config.history_limit;
        let session = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
        check_line(&session.document, selection.start_line)?;

        let result = self
            .analyzer
            .analyze_code_selection(&session.document, selection)?;
        session.record(
            HistoryEntry {
                recorded_at: Utc::now().to_rfc3339(),
                selection,
                related_lines: result.related_lines.clone(),
                context: Some(result.context.clone()),
            },
            limit,
        );
        Ok(result)
    }

    /// Prompt text for a finished analysis of an open document
    pub fn prompt_for(
        &self,
        id: &str,
        result: &CodeAnalysisResult,
    ) -> Result<String, RelatedLinesError> {
        let session = self.session(id)?;
        build_prompt_context(&session.document, result)
            .map_err(|e| AnalysisError::new(format!("{:#}", e), result.selection.start_line).into())
    }

    fn session(&self, id: &str) -> Result<&DocumentSession, SessionError> {
        self.sessions
            .get(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }
}

fn check_line(document: &TextDocument, line: usize) -> Result<(), DocumentError> {
    if line >= document.line_count() {
        return Err(DocumentError::LineOutOfRange {
            line,
            line_count: document.line_count(),
        });
    }
    Ok(())
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(RelationAnalyzer::new(), SessionConfig::default())
    }
}
