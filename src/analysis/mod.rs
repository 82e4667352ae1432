//! Heuristic relationship analysis
//!
//! Given a [`Document`] and a target line, five independent finders (variable,
//! function, control-flow, import, class-member) each propose a set of related
//! lines. [`RelationAnalyzer`] unions them with the target line itself.
//!
//! Everything is lexical: lines are matched with regular expressions, never parsed.
//!
//! Two error policies coexist:
//! - relationship discovery is fail-open: a finder that errors is logged and skipped
//! - context construction is fail-closed: any failure aborts with [`AnalysisError`]

pub mod boundary;
pub mod class_members;
pub mod context;
pub mod control_flow;
pub mod functions;
pub mod imports;
pub mod patterns;
pub mod types;
pub mod variables;

pub use boundary::{resolve_boundary, resolve_boundary_from};
pub use class_members::{ClassMemberFinder, find_class_member_relationships};
pub use context::{build_code_context, build_prompt_context};
pub use control_flow::{ControlFlowFinder, enhanced_control_flow_analysis};
pub use functions::{FunctionFinder, find_function_relationships};
pub use imports::{ImportFinder, enhanced_import_analysis};
pub use types::{BlockBoundary, CodeAnalysisResult, CodeContext};
pub use variables::{VariableFinder, find_variable_relationships};

use crate::config::AnalysisConfig;
use crate::document::{Document, Selection};
use crate::error::{AnalysisError, DocumentError};
use std::collections::{BTreeSet, HashSet};

/// One relationship-detection strategy.
pub trait RelationFinder: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Lines related to `target_line` under this strategy.
    ///
    /// May return out-of-range indices; the analyzer filters them.
    fn find(&self, document: &dyn Document, target_line: usize) -> anyhow::Result<HashSet<usize>>;
}

/// Every line of the document, borrowed.
pub(crate) fn read_lines(document: &dyn Document) -> Result<Vec<&str>, DocumentError> {
    (0..document.line_count())
        .map(|index| document.line_at(index))
        .collect()
}

/// Runs the finders in a fixed order and builds analysis results.
pub struct RelationAnalyzer {
    finders: Vec<Box<dyn RelationFinder>>,
    config: AnalysisConfig,
}

impl RelationAnalyzer {
    /// Analyzer with the default configuration
    pub fn new() -> Self {
        Self::with_config(AnalysisConfig::default())
    }

    /// Analyzer with the five standard finders: variable, function, control-flow,
    /// import, class-member.
    pub fn with_config(config: AnalysisConfig) -> Self {
        let finders: Vec<Box<dyn RelationFinder>> = vec![
            Box::new(VariableFinder),
            Box::new(FunctionFinder),
            Box::new(ControlFlowFinder),
            Box::new(ImportFinder::new(config.import_scan_lines)),
            Box::new(ClassMemberFinder),
        ];
        Self::with_finders(finders, config)
    }

    /// Analyzer with a custom finder list
    pub fn with_finders(finders: Vec<Box<dyn RelationFinder>>, config: AnalysisConfig) -> Self {
        Self { finders, config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Names of the configured finders, in run order
    pub fn finder_names(&self) -> Vec<&'static str> {
        self.finders.iter().map(|finder| finder.name()).collect()
    }

    /// Lines related to `target_line`, ascending and deduplicated.
    ///
    /// The target line is always part of the result. A finder that errors
    /// contributes nothing and the rest still run.
    pub fn find_related_lines(&self, document: &dyn Document, target_line: usize) -> Vec<usize> {
        let mut related = BTreeSet::from([target_line]);

        for finder in &self.finders {
            match finder.find(document, target_line) {
                Ok(lines) => {
                    tracing::debug!(
                        "{} finder: {} lines related to line {}",
                        finder.name(),
                        lines.len(),
                        target_line
                    );
                    related.extend(lines);
                }
                Err(e) => {
                    tracing::warn!(
                        "{} finder failed for line {}: {:#}",
                        finder.name(),
                        target_line,
                        e
                    );
                }
            }
        }

        let line_count = document.line_count();
        related.retain(|&line| line < line_count || line == target_line);
        related.into_iter().collect()
    }

    /// Related lines plus context for a selection, anchored on its start line.
    ///
    /// Unlike [`Self::find_related_lines`], any context failure aborts the whole
    /// analysis.
    pub fn analyze_code_selection(
        &self,
        document: &dyn Document,
        selection: Selection,
    ) -> Result<CodeAnalysisResult, AnalysisError> {
        let related_lines = self.find_related_lines(document, selection.start_line);
        let context = build_code_context(document, selection.start_line, &self.config)
            .map_err(|e| AnalysisError::new(format!("{:#}", e), selection.start_line))?;

        Ok(CodeAnalysisResult {
            selection,
            related_lines,
            context,
        })
    }
}

impl Default for RelationAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// [`RelationAnalyzer::find_related_lines`] with the default analyzer
pub fn find_related_lines(document: &dyn Document, target_line: usize) -> Vec<usize> {
    RelationAnalyzer::new().find_related_lines(document, target_line)
}

/// [`RelationAnalyzer::analyze_code_selection`] with the default analyzer
pub fn analyze_code_selection(
    document: &dyn Document,
    selection: Selection,
) -> Result<CodeAnalysisResult, AnalysisError> {
    RelationAnalyzer::new().analyze_code_selection(document, selection)
}
