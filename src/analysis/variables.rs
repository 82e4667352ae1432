//! Variable relationships by identifier matching.

use super::{RelationFinder, patterns, read_lines};
use crate::document::Document;
use anyhow::{Context, Result};
use std::collections::HashSet;

/// Identifiers on a line in any of the four variable shapes: declaration,
/// assignment, call, property/index access.
pub fn extract_variable_identifiers(line: &str) -> Vec<String> {
    let mut names = Vec::new();
    patterns::push_unique(&mut names, patterns::declared_names(line));
    patterns::push_unique(&mut names, patterns::assigned_names(line));
    patterns::push_unique(&mut names, patterns::call_names(line));
    patterns::push_unique(&mut names, patterns::property_access_names(line));
    patterns::push_unique(&mut names, patterns::index_access_names(line));
    names
}

/// Find lines sharing a variable with `target_line`.
///
/// Every line mentioning one of the target's identifiers as a whole word is related.
/// Names declared elsewhere in the document that appear anywhere on the target line
/// are followed as well, so plain operands reach their declarations. Matching is
/// unscoped: a same-named identifier in an unrelated function is included.
pub fn find_variable_relationships(
    document: &dyn Document,
    target_line: usize,
) -> Result<HashSet<usize>> {
    let lines = read_lines(document)?;
    let target_text = lines
        .get(target_line)
        .copied()
        .with_context(|| format!("Target line {} is out of range", target_line))?;

    let mut names = extract_variable_identifiers(target_text);
    let target_words = patterns::words(target_text);
    for line in &lines {
        let declared = patterns::declared_names(line).filter(|name| target_words.contains(name));
        patterns::push_unique(&mut names, declared);
    }

    let mut related = HashSet::new();
    for name in &names {
        let pattern = patterns::word_regex(name)
            .with_context(|| format!("Invalid identifier pattern for '{}'", name))?;

        for (index, line) in lines.iter().enumerate() {
            if index != target_line && pattern.is_match(line) {
                related.insert(index);
            }
        }
    }

    Ok(related)
}

/// Variable declarations, assignments and usages
pub struct VariableFinder;

impl RelationFinder for VariableFinder {
    fn name(&self) -> &'static str {
        "variable"
    }

    fn find(&self, document: &dyn Document, target_line: usize) -> Result<HashSet<usize>> {
        find_variable_relationships(document, target_line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TextDocument;

    fn doc(lines: &[&str]) -> TextDocument {
        TextDocument::from_lines(lines.iter().copied(), "javascript")
    }

    #[test]
    fn test_extract_shapes() {
        let names = extract_variable_identifiers("let total = items[0].price + compute(x);");
        assert_eq!(names, vec!["total", "compute", "items"]);
    }

    #[test]
    fn test_operands_reach_declarations() {
        let d = doc(&["const x = 5;", "let y = 10;", "console.log(x + y);"]);
        let related = find_variable_relationships(&d, 2).unwrap();
        assert!(related.contains(&0));
        assert!(related.contains(&1));
    }

    #[test]
    fn test_usages_of_declared_name() {
        let d = doc(&["let count = 0;", "count += 1;", "render(count);", "other();"]);
        let related = find_variable_relationships(&d, 0).unwrap();
        assert_eq!(related, HashSet::from([1, 2]));
    }

    #[test]
    fn test_word_boundaries() {
        let d = doc(&["let id = 1;", "let idx = 2;", "use(id);"]);
        let related = find_variable_relationships(&d, 0).unwrap();
        assert!(related.contains(&2));
        assert!(!related.contains(&1));
    }

    #[test]
    fn test_unscoped_matching_includes_other_functions() {
        let d = doc(&[
            "function a() {",
            "  let value = 1;",
            "}",
            "function b() {",
            "  let value = 2;",
            "}",
        ]);
        let related = find_variable_relationships(&d, 1).unwrap();
        assert!(related.contains(&4));
    }

    #[test]
    fn test_keywords_are_not_followed() {
        let d = doc(&["if (ready) {", "}", "if (other) {", "}"]);
        let related = find_variable_relationships(&d, 0).unwrap();
        assert!(!related.contains(&2));
    }

    #[test]
    fn test_out_of_range_target_errors() {
        let d = doc(&["let a = 1;"]);
        assert!(find_variable_relationships(&d, 4).is_err());
    }
}
