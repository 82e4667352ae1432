//! Class-member relationships: members used on the target line to their
//! definitions and uses inside the enclosing class body.

use super::boundary::resolve_boundary;
use super::{RelationFinder, patterns};
use crate::document::Document;
use crate::error::DocumentError;
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static CLASS_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:export\s+)?(?:default\s+)?(?:declare\s+)?(?:abstract\s+)?(?:class|interface|type)\s+([A-Za-z_][A-Za-z0-9_]*)",
    )
    .unwrap()
});

static CONSTRUCTOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:constructor|__init__)\s*\(").unwrap());

/// Name declared by a `class`, `interface` or `type` header line.
pub fn class_header_name(line: &str) -> Option<&str> {
    CLASS_HEADER
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Nearest class-like header at or before `from_line`, scanning backward.
///
/// The most recent declaration wins; nesting depth is not considered.
pub fn find_enclosing_class(
    document: &dyn Document,
    from_line: usize,
) -> Result<Option<(usize, String)>, DocumentError> {
    if document.line_count() == 0 {
        return Ok(None);
    }

    for index in (0..=from_line.min(document.last_line())).rev() {
        if let Some(name) = class_header_name(document.line_at(index)?) {
            return Ok(Some((index, name.to_string())));
        }
    }

    Ok(None)
}

/// Member-shaped identifiers: `this.NAME`, `self.NAME` and calls `NAME(`.
pub fn extract_member_identifiers(line: &str) -> Vec<String> {
    let mut names = Vec::new();
    patterns::push_unique(&mut names, patterns::member_access_names(line));
    patterns::push_unique(
        &mut names,
        patterns::call_names(line).filter(|name| *name != "constructor" && *name != "__init__"),
    );
    names
}

fn member_patterns(name: &str) -> Result<Vec<Regex>, regex::Error> {
    let name = regex::escape(name);
    [
        format!(r"\b{name}\s*\("),
        format!(r"\b{name}\s*:"),
        format!(r"\bthis\.{name}\b"),
        format!(r"\bself\.{name}\b"),
        format!(r"\b{name}\s*=(?:[^=>]|$)"),
    ]
    .iter()
    .map(|pattern| Regex::new(pattern))
    .collect()
}

/// Find the lines of the enclosing class related to members used on the target.
///
/// The class declaration line and its constructor are always included once a class
/// is found.
pub fn find_class_member_relationships(
    document: &dyn Document,
    target_line: usize,
    target_line_text: &str,
) -> Result<HashSet<usize>> {
    let mut related = HashSet::new();
    let Some((class_line, class_name)) = find_enclosing_class(document, target_line)? else {
        return Ok(related);
    };

    let boundary = resolve_boundary(document, class_line)?;
    related.insert(class_line);

    let mut member_shapes = Vec::new();
    for member in extract_member_identifiers(target_line_text) {
        let shapes = member_patterns(&member)
            .with_context(|| format!("Invalid member pattern for '{}'", member))?;
        member_shapes.extend(shapes);
    }

    let mut constructor_seen = false;
    for index in boundary.open_line..=boundary.close_line {
        let line = document.line_at(index)?;
        let is_constructor = !constructor_seen && CONSTRUCTOR.is_match(line);
        constructor_seen |= is_constructor;
        if is_constructor || member_shapes.iter().any(|shape| shape.is_match(line)) {
            related.insert(index);
        }
    }

    tracing::trace!(
        "class {} spans lines {}..={}, {} related",
        class_name,
        boundary.open_line,
        boundary.close_line,
        related.len()
    );

    Ok(related)
}

/// Members of the enclosing class
pub struct ClassMemberFinder;

impl RelationFinder for ClassMemberFinder {
    fn name(&self) -> &'static str {
        "class-member"
    }

    fn find(&self, document: &dyn Document, target_line: usize) -> Result<HashSet<usize>> {
        let text = document.line_at(target_line)?;
        find_class_member_relationships(document, target_line, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TextDocument;

    fn doc(lines: &[&str], language: &str) -> TextDocument {
        TextDocument::from_lines(lines.iter().copied(), language)
    }

    fn sorted(set: HashSet<usize>) -> Vec<usize> {
        let mut lines: Vec<usize> = set.into_iter().collect();
        lines.sort_unstable();
        lines
    }

    #[test]
    fn test_class_header_name() {
        assert_eq!(class_header_name("export default class App {"), Some("App"));
        assert_eq!(class_header_name("interface Props {"), Some("Props"));
        assert_eq!(class_header_name("type Id = string;"), Some("Id"));
        assert_eq!(class_header_name("class Point:"), Some("Point"));
        assert_eq!(class_header_name("const klass = 1;"), None);
    }

    #[test]
    fn test_this_member_relationships() {
        let d = doc(
            &[
                "import x from 'x';",
                "class Counter {",
                "  constructor() {",
                "    this.count = 0;",
                "  }",
                "  increment() {",
                "    this.count += 1;",
                "  }",
                "  reset() {",
                "    this.increment();",
                "  }",
                "}",
                "this.count = 5;",
            ],
            "javascript",
        );

        let related = find_class_member_relationships(&d, 6, "    this.count += 1;").unwrap();
        assert_eq!(sorted(related), vec![1, 2, 3, 6]);

        let related = find_class_member_relationships(&d, 9, "    this.increment();").unwrap();
        assert_eq!(sorted(related), vec![1, 2, 5, 9]);
    }

    #[test]
    fn test_python_self_members() {
        let d = doc(
            &[
                "class Account:",
                "    def __init__(self):",
                "        self.balance = 0",
                "    def deposit(self, amount):",
                "        self.balance += amount",
            ],
            "python",
        );

        let related = find_class_member_relationships(&d, 4, "        self.balance += amount").unwrap();
        // no braces: the class body runs to the end of the file
        assert_eq!(sorted(related), vec![0, 1, 2, 4]);
    }

    #[test]
    fn test_only_first_constructor_in_unbraced_body() {
        let d = doc(
            &[
                "class Reader:",
                "    def __init__(self):",
                "        self.pos = 0",
                "class Writer:",
                "    def __init__(self):",
                "        self.pos = 0",
                "    def advance(self):",
                "        self.pos += 1",
                "class Buffer:",
                "    def __init__(self):",
                "        self.size = 0",
            ],
            "python",
        );

        let related = find_class_member_relationships(&d, 7, "        self.pos += 1").unwrap();
        assert_eq!(sorted(related), vec![3, 4, 5, 7]);
    }

    #[test]
    fn test_no_class_no_relations() {
        let d = doc(&["function f() {", "  this.x = 1;", "}"], "javascript");
        let related = find_class_member_relationships(&d, 1, "  this.x = 1;").unwrap();
        assert!(related.is_empty());
    }

    #[test]
    fn test_most_recent_declaration_wins() {
        let d = doc(
            &["class A {", "}", "class B {", "  run() {}", "}", "run();"],
            "javascript",
        );
        assert_eq!(
            find_enclosing_class(&d, 5).unwrap(),
            Some((2, "B".to_string()))
        );

        let related = find_class_member_relationships(&d, 5, "run();").unwrap();
        assert_eq!(sorted(related), vec![2, 3]);
    }
}
