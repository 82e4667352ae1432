//! Import/export relationships: identifiers on the target line to the statements
//! that bind or re-export them.

use super::{RelationFinder, patterns};
use crate::document::Document;
use crate::error::DocumentError;
use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// Lines scanned for import statements when no limit is configured
pub const DEFAULT_IMPORT_SCAN_LINES: usize = 100;

static NAMED_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*import\s+(?:type\s+)?(?:[A-Za-z_][A-Za-z0-9_]*\s*,\s*)?\{([^}]*)\}\s*from\b")
        .unwrap()
});

static DEFAULT_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*import\s+(?:type\s+)?([A-Za-z_][A-Za-z0-9_]*)\s*(?:,|\bfrom\b)").unwrap()
});

static NAMESPACE_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*import\s+(?:[A-Za-z_][A-Za-z0-9_]*\s*,\s*)?\*\s*as\s+([A-Za-z_][A-Za-z0-9_]*)\s+from\b")
        .unwrap()
});

static REQUIRE_BINDING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:const|let|var)\s+([A-Za-z_][A-Za-z0-9_]*)\s*=\s*require\s*\(").unwrap()
});

static REQUIRE_DESTRUCTURED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:const|let|var)\s*\{([^}]*)\}\s*=\s*require\s*\(").unwrap()
});

static RE_EXPORT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*export\s*(?:\{|\*)").unwrap());

/// Binding names of import-like statements, bucketed by syntax shape.
///
/// Each map goes from binding name to the first line that introduces it.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportIndex {
    pub named: HashMap<String, usize>,
    pub default: HashMap<String, usize>,
    pub namespace: HashMap<String, usize>,
    pub require: HashMap<String, usize>,
}

impl ImportIndex {
    /// Categorise the import lines among the first `scan_lines` lines.
    pub fn build(document: &dyn Document, scan_lines: usize) -> Result<Self, DocumentError> {
        let mut index = Self::default();

        for line_number in 0..scan_lines.min(document.line_count()) {
            let line = document.line_at(line_number)?;

            if let Some(caps) = NAMED_IMPORT.captures(line) {
                for binding in specifier_bindings(&caps[1], " as ") {
                    index.named.entry(binding).or_insert(line_number);
                }
            }
            if let Some(caps) = DEFAULT_IMPORT.captures(line) {
                index
                    .default
                    .entry(caps[1].to_string())
                    .or_insert(line_number);
            }
            if let Some(caps) = NAMESPACE_IMPORT.captures(line) {
                index
                    .namespace
                    .entry(caps[1].to_string())
                    .or_insert(line_number);
            }
            if let Some(caps) = REQUIRE_BINDING.captures(line) {
                index
                    .require
                    .entry(caps[1].to_string())
                    .or_insert(line_number);
            }
            if let Some(caps) = REQUIRE_DESTRUCTURED.captures(line) {
                for binding in specifier_bindings(&caps[1], ":") {
                    index.require.entry(binding).or_insert(line_number);
                }
            }
        }

        Ok(index)
    }

    /// Lines binding `name` in any bucket
    pub fn lookup(&self, name: &str) -> Vec<usize> {
        [&self.named, &self.default, &self.namespace, &self.require]
            .into_iter()
            .filter_map(|bucket| bucket.get(name).copied())
            .collect()
    }

    /// Total number of bindings across buckets
    pub fn len(&self) -> usize {
        self.named.len() + self.default.len() + self.namespace.len() + self.require.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Local binding names from a `{ a, b as c }` specifier list.
///
/// `rename` separates the imported name from its local alias (`as` for imports,
/// `:` for destructuring).
fn specifier_bindings(list: &str, rename: &str) -> Vec<String> {
    list.split(',')
        .filter_map(|specifier| {
            let specifier = specifier.trim();
            let specifier = specifier.strip_prefix("type ").unwrap_or(specifier).trim();
            let local = specifier
                .rsplit_once(rename)
                .map_or(specifier, |(_, alias)| alias)
                .trim();
            // drop default values in destructuring (`a = 1`)
            let local = local.split('=').next().unwrap_or("").trim();
            (!local.is_empty()).then(|| local.to_string())
        })
        .collect()
}

/// Identifiers on a line in the four import-relevant shapes: PascalCase tokens,
/// calls, property access and index access.
pub fn extract_import_identifiers(line: &str) -> Vec<String> {
    let mut names = Vec::new();
    patterns::push_unique(&mut names, patterns::pascal_case_names(line));
    patterns::push_unique(&mut names, patterns::call_names(line));
    patterns::push_unique(&mut names, patterns::property_access_names(line));
    patterns::push_unique(&mut names, patterns::index_access_names(line));
    names
}

/// Find the import and re-export lines for identifiers used on a line, scanning the
/// first [`DEFAULT_IMPORT_SCAN_LINES`] lines for imports.
pub fn enhanced_import_analysis(
    document: &dyn Document,
    target_line_text: &str,
) -> Result<HashSet<usize>> {
    import_relationships(document, target_line_text, DEFAULT_IMPORT_SCAN_LINES)
}

/// Import relationships with an explicit import scan limit.
///
/// Bindings are looked up by exact name. Re-export lines (`export {`, `export *`)
/// anywhere in the document match when they contain an identifier as a substring.
pub fn import_relationships(
    document: &dyn Document,
    target_line_text: &str,
    scan_lines: usize,
) -> Result<HashSet<usize>> {
    let identifiers = extract_import_identifiers(target_line_text);
    let mut related = HashSet::new();
    if identifiers.is_empty() {
        return Ok(related);
    }

    let index = ImportIndex::build(document, scan_lines)?;
    for identifier in &identifiers {
        related.extend(index.lookup(identifier));
    }

    for line_number in 0..document.line_count() {
        let line = document.line_at(line_number)?;
        if RE_EXPORT.is_match(line)
            && identifiers
                .iter()
                .any(|identifier| line.contains(identifier.as_str()))
        {
            related.insert(line_number);
        }
    }

    Ok(related)
}

/// Import bindings and re-exports
pub struct ImportFinder {
    scan_lines: usize,
}

impl ImportFinder {
    pub fn new(scan_lines: usize) -> Self {
        Self { scan_lines }
    }
}

impl Default for ImportFinder {
    fn default() -> Self {
        Self::new(DEFAULT_IMPORT_SCAN_LINES)
    }
}

impl RelationFinder for ImportFinder {
    fn name(&self) -> &'static str {
        "import"
    }

    fn find(&self, document: &dyn Document, target_line: usize) -> Result<HashSet<usize>> {
        let text = document.line_at(target_line)?;
        import_relationships(document, text, self.scan_lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TextDocument;

    fn doc(lines: &[&str]) -> TextDocument {
        TextDocument::from_lines(lines.iter().copied(), "typescript")
    }

    #[test]
    fn test_index_buckets() {
        let d = doc(&[
            "import { Foo, bar as baz } from \"mod\";",
            "import React from 'react';",
            "import * as path from 'path';",
            "const fs = require('fs');",
            "const { join, dirname: dir } = require('path');",
            "import type { Props } from './types';",
        ]);
        let index = ImportIndex::build(&d, 100).unwrap();

        assert_eq!(index.named.get("Foo"), Some(&0));
        assert_eq!(index.named.get("baz"), Some(&0));
        assert!(!index.named.contains_key("bar"));
        assert_eq!(index.named.get("Props"), Some(&5));
        assert_eq!(index.default.get("React"), Some(&1));
        assert_eq!(index.namespace.get("path"), Some(&2));
        assert_eq!(index.require.get("fs"), Some(&3));
        assert_eq!(index.require.get("join"), Some(&4));
        assert_eq!(index.require.get("dir"), Some(&4));
        assert!(!index.default.contains_key("type"));
    }

    #[test]
    fn test_default_with_named_imports() {
        let d = doc(&["import React, { useState } from 'react';"]);
        let index = ImportIndex::build(&d, 100).unwrap();
        assert_eq!(index.default.get("React"), Some(&0));
        assert_eq!(index.named.get("useState"), Some(&0));
    }

    #[test]
    fn test_new_instance_finds_named_import() {
        let mut lines = vec!["// body"; 10];
        lines[0] = "import { Foo } from \"mod\";";
        lines[9] = "new Foo();";
        let d = doc(&lines);

        let related = enhanced_import_analysis(&d, "new Foo();").unwrap();
        assert_eq!(related, HashSet::from([0]));
    }

    #[test]
    fn test_namespace_property_access() {
        let d = doc(&["import * as utils from './utils';", "utils.format(x);"]);
        let related = enhanced_import_analysis(&d, "utils.format(x);").unwrap();
        assert!(related.contains(&0));
    }

    #[test]
    fn test_scan_limit() {
        let mut lines = vec!["x();"; 5];
        lines[3] = "import { Late } from 'late';";
        let d = doc(&lines);

        assert!(import_relationships(&d, "Late.run()", 3).unwrap().is_empty());
        assert_eq!(
            import_relationships(&d, "Late.run()", 4).unwrap(),
            HashSet::from([3])
        );
    }

    #[test]
    fn test_re_exports_match_substrings() {
        let d = doc(&[
            "import { Widget } from './widget';",
            "export { Widget };",
            "export * from './WidgetHelpers';",
            "export const other = 1;",
        ]);
        let related = enhanced_import_analysis(&d, "render(Widget)").unwrap();
        assert_eq!(related, HashSet::from([0, 1, 2]));
    }

    #[test]
    fn test_no_identifiers_no_relations() {
        let d = doc(&["import { a } from 'a';"]);
        assert!(enhanced_import_analysis(&d, "   ").unwrap().is_empty());
    }

    #[test]
    fn test_specifier_bindings() {
        assert_eq!(
            specifier_bindings(" a, type B, c as d ,", " as "),
            vec!["a".to_string(), "B".to_string(), "d".to_string()]
        );
        assert_eq!(
            specifier_bindings("x: y, z = 3", ":"),
            vec!["y".to_string(), "z".to_string()]
        );
    }
}
