//! Code context construction and the model-input prompt rendering.
//!
//! Unlike relationship discovery, nothing here degrades gracefully: any failure is
//! surfaced to the caller.

use super::class_members::find_enclosing_class;
use super::functions::find_enclosing_function;
use super::patterns;
use super::types::{CodeAnalysisResult, CodeContext};
use crate::config::AnalysisConfig;
use crate::document::Document;
use anyhow::{Context, Result};
use std::fmt::Write;

/// Build the [`CodeContext`] around `target_line`.
pub fn build_code_context(
    document: &dyn Document,
    target_line: usize,
    config: &AnalysisConfig,
) -> Result<CodeContext> {
    document
        .line_at(target_line)
        .context("Failed to read target line")?;

    let function_name = find_enclosing_function(document, target_line)
        .context("Failed to resolve enclosing function")?
        .map(|(_, name)| name);
    let class_name = find_enclosing_class(document, target_line)
        .context("Failed to resolve enclosing class")?
        .map(|(_, name)| name);

    let first = target_line.saturating_sub(config.context_radius);
    let last = (target_line + config.context_radius).min(document.last_line());
    let mut variables = Vec::new();
    for index in first..=last {
        let line = document
            .line_at(index)
            .with_context(|| format!("Failed to read line {} near the target", index))?;
        patterns::push_unique(&mut variables, patterns::declared_names(line));
        patterns::push_unique(&mut variables, patterns::assigned_names(line));
    }

    let mut imports = Vec::new();
    for index in 0..config.context_import_lines.min(document.line_count()) {
        let line = document
            .line_at(index)
            .with_context(|| format!("Failed to read line {} while collecting imports", index))?;
        if patterns::is_import_statement(line) {
            imports.push(line.trim().to_string());
        }
    }

    Ok(CodeContext {
        language_id: document.language_id().to_string(),
        function_name,
        class_name,
        variables,
        imports,
    })
}

/// Render the text handed to the language model for a finished analysis.
///
/// Line numbers in the rendered text are 1-based.
pub fn build_prompt_context(
    document: &dyn Document,
    result: &CodeAnalysisResult,
) -> Result<String> {
    let context = &result.context;
    let selection = result.selection;
    let mut prompt = String::new();

    writeln!(prompt, "Language: {}", context.language_id)?;
    if let Some(function_name) = &context.function_name {
        writeln!(prompt, "Function: {}", function_name)?;
    }
    if let Some(class_name) = &context.class_name {
        writeln!(prompt, "Class: {}", class_name)?;
    }
    if !context.variables.is_empty() {
        writeln!(prompt, "Variables in scope: {}", context.variables.join(", "))?;
    }
    if !context.imports.is_empty() {
        writeln!(prompt, "Imports:")?;
        for import in &context.imports {
            writeln!(prompt, "  {}", import)?;
        }
    }

    let end_line = selection.end_line.max(selection.start_line);
    writeln!(
        prompt,
        "\nSelected code (lines {}-{}):",
        selection.start_line + 1,
        end_line + 1
    )?;
    for index in selection.start_line..=end_line.min(document.last_line()) {
        writeln!(prompt, "{}", document.line_at(index)?)?;
    }

    writeln!(prompt, "\nRelated lines:")?;
    for &index in &result.related_lines {
        writeln!(prompt, "{:>5}: {}", index + 1, document.line_at(index)?)?;
    }

    Ok(prompt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Selection, TextDocument};

    fn sample() -> TextDocument {
        TextDocument::from_lines(
            [
                "import { Store } from './store';",
                "const path = require('path');",
                "",
                "class Cart {",
                "  total(items) {",
                "    let sum = 0;",
                "    for (const item of items) {",
                "      sum = sum + item.price;",
                "    }",
                "    return sum;",
                "  }",
                "}",
            ],
            "javascript",
        )
    }

    #[test]
    fn test_context_fields() {
        let context = build_code_context(&sample(), 7, &AnalysisConfig::default()).unwrap();
        assert_eq!(context.language_id, "javascript");
        assert_eq!(context.function_name.as_deref(), Some("total"));
        assert_eq!(context.class_name.as_deref(), Some("Cart"));
        // lines 2..=11 only; `path` sits outside the radius
        assert_eq!(context.variables, vec!["sum", "item"]);
        assert_eq!(
            context.imports,
            vec![
                "import { Store } from './store';".to_string(),
                "const path = require('path');".to_string()
            ]
        );
    }

    #[test]
    fn test_context_radius_limits_variables() {
        let config = AnalysisConfig {
            context_radius: 0,
            ..AnalysisConfig::default()
        };
        let context = build_code_context(&sample(), 5, &config).unwrap();
        assert_eq!(context.variables, vec!["sum"]);
    }

    #[test]
    fn test_import_scan_limit() {
        let config = AnalysisConfig {
            context_import_lines: 1,
            ..AnalysisConfig::default()
        };
        let context = build_code_context(&sample(), 5, &config).unwrap();
        assert_eq!(context.imports.len(), 1);
    }

    #[test]
    fn test_out_of_range_target_fails() {
        assert!(build_code_context(&sample(), 40, &AnalysisConfig::default()).is_err());
    }

    #[test]
    fn test_prompt_rendering() {
        let document = sample();
        let result = CodeAnalysisResult {
            selection: Selection::new(9, 9),
            related_lines: vec![5, 9],
            context: build_code_context(&document, 9, &AnalysisConfig::default()).unwrap(),
        };

        let prompt = build_prompt_context(&document, &result).unwrap();
        assert!(prompt.starts_with("Language: javascript\n"));
        assert!(prompt.contains("Function: total\n"));
        assert!(prompt.contains("Class: Cart\n"));
        assert!(prompt.contains("Selected code (lines 10-10):\n    return sum;\n"));
        assert!(prompt.contains("    6:     let sum = 0;\n"));
        assert!(prompt.contains("   10:     return sum;\n"));
    }
}
