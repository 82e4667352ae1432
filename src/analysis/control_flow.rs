//! Control-flow relationships: block boundaries of loops, conditionals,
//! try/catch and switch statements, and the targets of jumps and returns.

use super::boundary::{keyword_column, resolve_boundary_from};
use super::functions::find_enclosing_function;
use super::types::BlockBoundary;
use super::{RelationFinder, patterns, read_lines};
use crate::document::Document;
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static LOOP_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:for|while|do)\b").unwrap());
static IF_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^if\b").unwrap());
static ELSE_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^else\b").unwrap());
static TRY_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^try\b").unwrap());
static HANDLER_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:catch|finally)\b").unwrap());
static SWITCH_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^switch\b").unwrap());
static CASE_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:case\b|default\s*:)").unwrap());
static JUMP: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:break|continue)\b").unwrap());
static RETURN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^return\b").unwrap());

/// Statement category of a line, judged from its leading keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    Loop,
    If,
    Else,
    Try,
    Handler,
    Switch,
    Case,
    Jump,
    Return,
}

/// Line text with indentation and leading closing braces removed.
fn statement_text(line: &str) -> &str {
    line.trim_start_matches(|c: char| c.is_whitespace() || c == '}')
}

/// Classify a line by its leading keyword.
pub fn classify(line: &str) -> Option<FlowKind> {
    let text = statement_text(line);
    let kind = if LOOP_HEADER.is_match(text) {
        FlowKind::Loop
    } else if IF_HEADER.is_match(text) {
        FlowKind::If
    } else if ELSE_HEADER.is_match(text) {
        FlowKind::Else
    } else if TRY_HEADER.is_match(text) {
        FlowKind::Try
    } else if HANDLER_HEADER.is_match(text) {
        FlowKind::Handler
    } else if SWITCH_HEADER.is_match(text) {
        FlowKind::Switch
    } else if CASE_LABEL.is_match(text) {
        FlowKind::Case
    } else if JUMP.is_match(text) {
        FlowKind::Jump
    } else if RETURN.is_match(text) {
        FlowKind::Return
    } else {
        return None;
    };

    Some(kind)
}

/// Walks the document for one control-flow query.
struct FlowScanner<'a> {
    document: &'a dyn Document,
    lines: Vec<&'a str>,
}

impl<'a> FlowScanner<'a> {
    fn new(document: &'a dyn Document) -> Result<Self> {
        Ok(Self {
            document,
            lines: read_lines(document)?,
        })
    }

    fn kind_of(&self, index: usize) -> Option<FlowKind> {
        classify(self.lines[index])
    }

    /// Block opened by the statement on `line`, counted from its keyword.
    fn block(&self, line: usize) -> Result<BlockBoundary> {
        let column = keyword_column(self.lines[line]);
        Ok(resolve_boundary_from(self.document, line, column)?)
    }

    fn next_significant_line(&self, from: usize) -> Option<usize> {
        (from..self.lines.len()).find(|&index| !patterns::is_blank_or_comment(self.lines[index]))
    }

    /// Nearest header of `kind` before `line` whose block contains `line`.
    fn enclosing(&self, line: usize, kind: FlowKind) -> Result<Option<usize>> {
        for index in (0..line).rev() {
            if self.kind_of(index) == Some(kind) && self.block(index)?.contains(line) {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    /// Header block plus every chained clause (`else`, `catch`, `finally`).
    ///
    /// A clause continues the chain when it sits on the closing line of the previous
    /// block (`} else {`) or on the next non-blank, non-comment line.
    fn clause_chain(
        &self,
        header: usize,
        continues: fn(Option<FlowKind>) -> bool,
        related: &mut HashSet<usize>,
    ) -> Result<()> {
        let mut boundary = self.block(header)?;
        related.insert(boundary.open_line);
        related.insert(boundary.close_line);

        loop {
            let cursor = boundary.close_line;
            let clause = if cursor != boundary.open_line && continues(self.kind_of(cursor)) {
                Some(cursor)
            } else {
                self.next_significant_line(cursor + 1)
                    .filter(|&index| continues(self.kind_of(index)))
            };

            let Some(clause) = clause else {
                break;
            };

            related.insert(clause);
            boundary = self.block(clause)?;
            related.insert(boundary.close_line);
        }

        Ok(())
    }

    fn loop_relationships(&self, header: usize, related: &mut HashSet<usize>) -> Result<()> {
        let boundary = self.block(header)?;
        related.insert(boundary.open_line);
        related.insert(boundary.close_line);

        for index in boundary.interior() {
            if self.kind_of(index) == Some(FlowKind::Jump) {
                related.insert(index);
            }
        }
        Ok(())
    }

    fn conditional_relationships(&self, header: usize, related: &mut HashSet<usize>) -> Result<()> {
        self.clause_chain(header, |kind| kind == Some(FlowKind::Else), related)
    }

    /// An `else` target also pulls in the chain of the `if` it belongs to.
    fn else_relationships(&self, target: usize, related: &mut HashSet<usize>) -> Result<()> {
        self.conditional_relationships(target, related)?;

        for index in (0..target).rev() {
            if self.kind_of(index) != Some(FlowKind::If) {
                continue;
            }
            let mut chain = HashSet::new();
            self.conditional_relationships(index, &mut chain)?;
            if chain.contains(&target) {
                related.extend(chain);
                break;
            }
        }
        Ok(())
    }

    fn try_relationships(&self, header: usize, related: &mut HashSet<usize>) -> Result<()> {
        let boundary = self.block(header)?;
        for index in boundary.open_line..=boundary.close_line {
            if self.kind_of(index) == Some(FlowKind::Handler) {
                related.insert(index);
            }
        }

        self.clause_chain(header, |kind| kind == Some(FlowKind::Handler), related)
    }

    /// A `catch`/`finally` target: its own block plus the owning `try` chain.
    fn handler_relationships(&self, target: usize, related: &mut HashSet<usize>) -> Result<()> {
        let boundary = self.block(target)?;
        related.insert(boundary.open_line);
        related.insert(boundary.close_line);

        for index in (0..target).rev() {
            if self.kind_of(index) != Some(FlowKind::Try) {
                continue;
            }
            let mut chain = HashSet::new();
            self.try_relationships(index, &mut chain)?;
            if chain.contains(&target) {
                related.extend(chain);
                break;
            }
        }
        Ok(())
    }

    fn switch_relationships(&self, header: usize, related: &mut HashSet<usize>) -> Result<()> {
        let boundary = self.block(header)?;
        related.insert(boundary.open_line);
        related.insert(boundary.close_line);

        for index in boundary.interior() {
            if self.kind_of(index) == Some(FlowKind::Case) {
                related.insert(index);
            }
        }
        Ok(())
    }

    fn return_relationships(&self, target: usize, related: &mut HashSet<usize>) -> Result<()> {
        if let Some((definition, _)) = find_enclosing_function(self.document, target)? {
            related.insert(definition);
        }
        Ok(())
    }
}

/// Find the control-flow relationships of `target_line`.
///
/// The strategy depends on the target's leading keyword. A line with no control-flow
/// keyword of its own is related to the `try` that encloses it, if any.
pub fn enhanced_control_flow_analysis(
    document: &dyn Document,
    target_line: usize,
) -> Result<HashSet<usize>> {
    let scanner = FlowScanner::new(document)?;
    let target_text = scanner
        .lines
        .get(target_line)
        .copied()
        .with_context(|| format!("Target line {} is out of range", target_line))?;

    let mut related = HashSet::new();
    match classify(target_text) {
        Some(FlowKind::Loop) => scanner.loop_relationships(target_line, &mut related)?,
        Some(FlowKind::If) => scanner.conditional_relationships(target_line, &mut related)?,
        Some(FlowKind::Else) => scanner.else_relationships(target_line, &mut related)?,
        Some(FlowKind::Try) => scanner.try_relationships(target_line, &mut related)?,
        Some(FlowKind::Handler) => scanner.handler_relationships(target_line, &mut related)?,
        Some(FlowKind::Switch) => scanner.switch_relationships(target_line, &mut related)?,
        Some(FlowKind::Case) => {
            if let Some(header) = scanner.enclosing(target_line, FlowKind::Switch)? {
                scanner.switch_relationships(header, &mut related)?;
            }
        }
        Some(FlowKind::Jump) => {
            if let Some(header) = scanner.enclosing(target_line, FlowKind::Loop)? {
                related.insert(header);
                scanner.loop_relationships(header, &mut related)?;
            }
        }
        Some(FlowKind::Return) => scanner.return_relationships(target_line, &mut related)?,
        None => {
            if let Some(header) = scanner.enclosing(target_line, FlowKind::Try)? {
                scanner.try_relationships(header, &mut related)?;
            }
        }
    }

    Ok(related)
}

/// Block boundaries and jump targets
pub struct ControlFlowFinder;

impl RelationFinder for ControlFlowFinder {
    fn name(&self) -> &'static str {
        "control-flow"
    }

    fn find(&self, document: &dyn Document, target_line: usize) -> Result<HashSet<usize>> {
        enhanced_control_flow_analysis(document, target_line)
    }
}
