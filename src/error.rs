/// Centralized error types for related-lines using thiserror
///
/// Provides domain-specific error types for better error handling and user-facing messages.
use thiserror::Error;

/// Main error type for the analyzer and its surfaces
#[derive(Error, Debug)]
pub enum RelatedLinesError {
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors raised by line-indexed document access
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("Line {line} is out of range (document has {line_count} lines)")]
    LineOutOfRange { line: usize, line_count: usize },

    #[error("Failed to read file '{file}': {reason}")]
    ReadFailed { file: String, reason: String },

    #[error("File is binary and cannot be analyzed: {0}")]
    BinaryFile(String),

    #[error("File size exceeds maximum: {size} > {max}")]
    FileTooLarge { size: usize, max: usize },
}

/// Fail-closed failure of a selection analysis.
///
/// Carries the original message and the 0-based line the analysis was anchored on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Analysis failed at line {line}: {message}")]
pub struct AnalysisError {
    pub message: String,
    pub line: usize,
}

impl AnalysisError {
    pub fn new(message: impl Into<String>, line: usize) -> Self {
        Self {
            message: message.into(),
            line,
        }
    }
}

/// Errors related to document sessions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Document '{0}' is not open")]
    NotFound(String),

    #[error("Cannot open '{id}': {max} documents are already open")]
    LimitReached { id: String, max: usize },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration file: {0}")]
    LoadFailed(String),

    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    #[error("Invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),
}

/// Errors related to input validation
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Path does not exist: {0}")]
    PathNotFound(String),

    #[error("{field} must be {constraint}, got {actual}")]
    ConstraintViolation {
        field: String,
        constraint: String,
        actual: String,
    },

    #[error("Empty {0}")]
    Empty(String),
}

// Conversion from anyhow::Error to RelatedLinesError
impl From<anyhow::Error> for RelatedLinesError {
    fn from(err: anyhow::Error) -> Self {
        RelatedLinesError::Other(format!("{:#}", err))
    }
}

impl RelatedLinesError {
    /// Create a new error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        RelatedLinesError::Other(msg.into())
    }

    /// Convert to a user-facing error string suitable for MCP responses
    pub fn to_user_string(&self) -> String {
        format!("{}", self)
    }

    /// Check if this is a user error (validation, unknown document) vs system error
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            RelatedLinesError::Validation(_)
                | RelatedLinesError::Session(SessionError::NotFound(_))
                | RelatedLinesError::Document(DocumentError::LineOutOfRange { .. })
                | RelatedLinesError::Config(ConfigError::InvalidValue { .. })
        )
    }
}
