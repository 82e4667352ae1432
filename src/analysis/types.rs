//! Data structures produced by the analyzer.

use crate::document::Selection;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Lines delimiting a brace-scoped block, both 0-based and inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct BlockBoundary {
    pub open_line: usize,
    pub close_line: usize,
}

impl BlockBoundary {
    pub fn new(open_line: usize, close_line: usize) -> Self {
        Self {
            open_line,
            close_line,
        }
    }

    /// Check if a line falls inside the block (inclusive)
    pub fn contains(&self, line: usize) -> bool {
        line >= self.open_line && line <= self.close_line
    }

    /// Lines strictly between the opening and closing lines
    pub fn interior(&self) -> std::ops::Range<usize> {
        (self.open_line + 1)..self.close_line
    }
}

/// Secondary information gathered around the analysis target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CodeContext {
    /// Language tag of the document, verbatim
    pub language_id: String,
    /// Nearest enclosing function, if any
    pub function_name: Option<String>,
    /// Nearest enclosing class, interface or type, if any
    pub class_name: Option<String>,
    /// Variable names seen near the target line, first-seen order
    pub variables: Vec<String>,
    /// Raw import statements from the top of the document
    pub imports: Vec<String>,
}

/// Result of analysing a selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CodeAnalysisResult {
    /// The analysed selection
    pub selection: Selection,
    /// Related lines in ascending order, including the selection start
    pub related_lines: Vec<usize>,
    /// Context built around the selection start
    pub context: CodeContext,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_contains() {
        let boundary = BlockBoundary::new(3, 6);
        assert!(boundary.contains(3));
        assert!(boundary.contains(6));
        assert!(!boundary.contains(7));
        assert_eq!(boundary.interior(), 4..6);
    }

    #[test]
    fn test_single_line_boundary_has_empty_interior() {
        let boundary = BlockBoundary::new(2, 2);
        assert!(boundary.interior().is_empty());
    }

    #[test]
    fn test_context_serializes() {
        let context = CodeContext {
            language_id: "javascript".to_string(),
            function_name: Some("main".to_string()),
            class_name: None,
            variables: vec!["x".to_string()],
            imports: vec![],
        };
        let json = serde_json::to_value(&context).unwrap();
        assert_eq!(json["language_id"], "javascript");
        assert_eq!(json["function_name"], "main");
        assert!(json["class_name"].is_null());
    }
}
