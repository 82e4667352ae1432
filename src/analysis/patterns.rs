//! Identifier extraction and line-shape patterns shared by the finders.
//!
//! Everything here is lexical: identifiers are `[A-Za-z_][A-Za-z0-9_]*` tokens and
//! relations between them are plain string equality.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Za-z_][A-Za-z0-9_]*\b").unwrap());

static DECLARATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:const|let|var)\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap());

// `NAME =` but not `==`, `===` or `=>`
static ASSIGNMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Za-z_][A-Za-z0-9_]*)\s*=(?:[^=>]|$)").unwrap());

static CALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b([A-Za-z_][A-Za-z0-9_]*)\s*\(").unwrap());

static PROPERTY_ACCESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Za-z_][A-Za-z0-9_]*)\s*\.").unwrap());

static INDEX_ACCESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Za-z_][A-Za-z0-9_]*)\s*\[").unwrap());

static PASCAL_CASE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b([A-Z][A-Za-z0-9_]*)\b").unwrap());

static MEMBER_ACCESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:this|self)\.([A-Za-z_][A-Za-z0-9_]*)").unwrap());

static IMPORT_STATEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*import\b|\brequire\s*\(").unwrap());

/// Words that are never treated as identifiers.
const RESERVED_KEYWORDS: &[&str] = &[
    "if", "else", "for", "while", "do", "switch", "case", "default", "break", "continue",
    "return", "function", "class", "const", "let", "var", "new", "typeof", "instanceof", "in",
    "of", "try", "catch", "finally", "throw", "await", "async", "yield", "import", "export",
    "from", "this", "self", "super", "true", "false", "null", "undefined", "void", "delete",
    "extends", "implements", "interface", "def", "elif", "lambda", "pass", "with", "not", "and",
    "or", "is",
];

/// Built-ins whose calls never resolve to a user definition.
const BUILTIN_CALLS: &[&str] = &[
    "console", "log", "warn", "error", "info", "debug", "Math", "Date", "JSON", "Object", "Array",
    "String", "Number", "Boolean", "Promise", "Symbol", "Map", "Set", "RegExp", "Error",
    "parseInt", "parseFloat", "isNaN", "setTimeout", "setInterval", "clearTimeout",
    "clearInterval", "require", "alert", "print", "len", "range", "str", "int", "isinstance",
];

/// Check whether a token is a reserved keyword
pub fn is_keyword(word: &str) -> bool {
    RESERVED_KEYWORDS.contains(&word)
}

/// Check whether a call-shaped token is excluded from definition lookup
pub fn is_denied_call(name: &str) -> bool {
    is_keyword(name) || BUILTIN_CALLS.contains(&name)
}

fn captures<'a>(pattern: &'static Regex, line: &'a str) -> impl Iterator<Item = &'a str> {
    pattern
        .captures_iter(line)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Names introduced with `const`, `let` or `var`
pub fn declared_names(line: &str) -> impl Iterator<Item = &str> {
    captures(&DECLARATION, line)
}

/// Names on the left of a plain `=`
pub fn assigned_names(line: &str) -> impl Iterator<Item = &str> {
    captures(&ASSIGNMENT, line)
}

/// Names followed by `(`
pub fn call_names(line: &str) -> impl Iterator<Item = &str> {
    captures(&CALL, line)
}

/// Names followed by `.`
pub fn property_access_names(line: &str) -> impl Iterator<Item = &str> {
    captures(&PROPERTY_ACCESS, line)
}

/// Names followed by `[`
pub fn index_access_names(line: &str) -> impl Iterator<Item = &str> {
    captures(&INDEX_ACCESS, line)
}

/// Capitalised bare tokens (types, classes, components)
pub fn pascal_case_names(line: &str) -> impl Iterator<Item = &str> {
    captures(&PASCAL_CASE, line)
}

/// Members reached through `this.` or `self.`
pub fn member_access_names(line: &str) -> impl Iterator<Item = &str> {
    captures(&MEMBER_ACCESS, line)
}

/// Every identifier-shaped word on the line
pub fn words(line: &str) -> HashSet<&str> {
    IDENTIFIER.find_iter(line).map(|m| m.as_str()).collect()
}

/// Check whether a line looks like an import statement
pub fn is_import_statement(line: &str) -> bool {
    IMPORT_STATEMENT.is_match(line)
}

/// Check whether a line is blank or starts with a comment marker
pub fn is_blank_or_comment(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty()
        || trimmed.starts_with("//")
        || trimmed.starts_with("/*")
        || trimmed.starts_with('*')
        || trimmed.starts_with('#')
}

/// Compile a `\bNAME\b` matcher
pub fn word_regex(name: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"\b{}\b", regex::escape(name)))
}

/// Append names to `out` in first-seen order, skipping keywords and duplicates.
pub fn push_unique<'a>(out: &mut Vec<String>, names: impl Iterator<Item = &'a str>) {
    for name in names {
        if !is_keyword(name) && !out.iter().any(|existing| existing == name) {
            out.push(name.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_names() {
        let names: Vec<_> = declared_names("const a = 1; let b; var c_2 = a;").collect();
        assert_eq!(names, vec!["a", "b", "c_2"]);
    }

    #[test]
    fn test_assigned_names_skip_comparisons() {
        let names: Vec<_> = assigned_names("total = a == b; ok = x => x;").collect();
        assert_eq!(names, vec!["total", "ok"]);
        assert_eq!(assigned_names("if (a === b) {}").count(), 0);
        assert_eq!(assigned_names("value =").collect::<Vec<_>>(), vec!["value"]);
    }

    #[test]
    fn test_call_and_access_names() {
        let line = "console.log(items[0], render (x));";
        assert_eq!(call_names(line).collect::<Vec<_>>(), vec!["log", "render"]);
        assert_eq!(property_access_names(line).collect::<Vec<_>>(), vec!["console"]);
        assert_eq!(index_access_names(line).collect::<Vec<_>>(), vec!["items"]);
    }

    #[test]
    fn test_pascal_case_names() {
        let names: Vec<_> = pascal_case_names("const w = new Widget(Config.load());").collect();
        assert_eq!(names, vec!["Widget", "Config"]);
    }

    #[test]
    fn test_member_access_names() {
        let names: Vec<_> = member_access_names("this.count = self.step + other.x").collect();
        assert_eq!(names, vec!["count", "step"]);
    }

    #[test]
    fn test_keyword_and_deny_lists() {
        assert!(is_keyword("if"));
        assert!(!is_keyword("foo"));
        assert!(is_denied_call("console"));
        assert!(is_denied_call("while"));
        assert!(!is_denied_call("fetchUser"));
    }

    #[test]
    fn test_is_blank_or_comment() {
        assert!(is_blank_or_comment("   "));
        assert!(is_blank_or_comment("  // note"));
        assert!(is_blank_or_comment(" * doc"));
        assert!(is_blank_or_comment("# python"));
        assert!(!is_blank_or_comment("else {"));
    }

    #[test]
    fn test_word_regex_respects_boundaries() {
        let re = word_regex("x").unwrap();
        assert!(re.is_match("return x + 1;"));
        assert!(!re.is_match("let xy = 2;"));
    }

    #[test]
    fn test_push_unique_preserves_order() {
        let mut out = Vec::new();
        push_unique(&mut out, ["b", "a", "if", "b"].into_iter());
        assert_eq!(out, vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_is_import_statement() {
        assert!(is_import_statement("import { a } from 'a';"));
        assert!(is_import_statement("const fs = require('fs');"));
        assert!(!is_import_statement("const important = 1;"));
    }
}
