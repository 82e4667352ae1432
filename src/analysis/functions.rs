//! Function relationships: calls on the target line to their definitions.

use super::{RelationFinder, patterns, read_lines};
use crate::document::Document;
use crate::error::DocumentError;
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Lines that define a function, with the defined name in group 1.
static FUNCTION_DEFINING: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\bfunction\s*\*?\s*([A-Za-z_][A-Za-z0-9_]*)\s*\(",
        r"\b(?:const|let|var)\s+([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(?:async\s+)?(?:function\b|\([^)]*\)\s*=>|[A-Za-z_][A-Za-z0-9_]*\s*=>)",
        r"\b([A-Za-z_][A-Za-z0-9_]*)\s*:\s*(?:async\s+)?function\b",
        r"^\s*(?:async\s+)?def\s+([A-Za-z_][A-Za-z0-9_]*)\s*\(",
        r"^\s*(?:(?:public|private|protected|static|async|override|get|set)\s+)*([A-Za-z_][A-Za-z0-9_]*)\s*\([^)]*\)\s*(?::\s*[^{;]+)?\{",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

/// The five definition shapes for `name`: `function NAME(`, `const NAME = function`,
/// `const NAME = (`, `NAME: function`, `NAME(...) =>`.
pub fn definition_patterns(name: &str) -> Result<Vec<Regex>, regex::Error> {
    let name = regex::escape(name);
    [
        format!(r"\bfunction\s*\*?\s*{name}\s*\("),
        format!(r"\b(?:const|let|var)\s+{name}\s*=\s*(?:async\s+)?function\b"),
        format!(r"\b(?:const|let|var)\s+{name}\s*=\s*(?:async\s*)?\("),
        format!(r"\b{name}\s*:\s*(?:async\s+)?function\b"),
        format!(r"\b{name}\s*\([^)]*\)\s*=>"),
    ]
    .iter()
    .map(|pattern| Regex::new(pattern))
    .collect()
}

/// Name of the function a line defines, if it looks like a definition.
pub fn defined_function_name(line: &str) -> Option<&str> {
    FUNCTION_DEFINING.iter().find_map(|pattern| {
        pattern
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .filter(|name| !patterns::is_keyword(name))
    })
}

/// Nearest function-defining line at or before `from_line`, scanning backward.
pub fn find_enclosing_function(
    document: &dyn Document,
    from_line: usize,
) -> Result<Option<(usize, String)>, DocumentError> {
    if document.line_count() == 0 {
        return Ok(None);
    }

    for index in (0..=from_line.min(document.last_line())).rev() {
        if let Some(name) = defined_function_name(document.line_at(index)?) {
            return Ok(Some((index, name.to_string())));
        }
    }

    Ok(None)
}

/// Find definitions of the functions called on `target_line`.
pub fn find_function_relationships(
    document: &dyn Document,
    target_line: usize,
) -> Result<HashSet<usize>> {
    let lines = read_lines(document)?;
    let target_text = lines
        .get(target_line)
        .copied()
        .with_context(|| format!("Target line {} is out of range", target_line))?;

    let mut names: Vec<&str> = Vec::new();
    for name in patterns::call_names(target_text) {
        if !patterns::is_denied_call(name) && !names.contains(&name) {
            names.push(name);
        }
    }

    let mut related = HashSet::new();
    for name in names {
        let shapes = definition_patterns(name)
            .with_context(|| format!("Invalid definition pattern for '{}'", name))?;

        for (index, line) in lines.iter().enumerate() {
            if shapes.iter().any(|shape| shape.is_match(line)) {
                related.insert(index);
            }
        }
    }

    Ok(related)
}

/// Function calls and their definitions
pub struct FunctionFinder;

impl RelationFinder for FunctionFinder {
    fn name(&self) -> &'static str {
        "function"
    }

    fn find(&self, document: &dyn Document, target_line: usize) -> Result<HashSet<usize>> {
        find_function_relationships(document, target_line)
    }
}
