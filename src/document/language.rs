//! Language identifier detection from file extensions
//!
//! Identifiers follow the lowercase editor convention (`javascript`,
//! `typescriptreact`, ...) and are carried verbatim into the analysis context.

/// Fallback identifier for files without a recognised extension
pub const PLAIN_TEXT: &str = "plaintext";

/// Detect the language identifier for a file extension
pub fn detect_language_id(extension: &str) -> Option<&'static str> {
    let id = match extension.to_lowercase().as_str() {
        "js" | "mjs" | "cjs" => "javascript",
        "jsx" => "javascriptreact",
        "ts" | "mts" | "cts" => "typescript",
        "tsx" => "typescriptreact",
        "py" | "pyi" => "python",
        "rs" => "rust",
        "java" => "java",
        "kt" | "kts" => "kotlin",
        "scala" => "scala",
        "go" => "go",
        "c" | "h" => "c",
        "cpp" | "cc" | "cxx" | "hpp" | "hxx" | "hh" => "cpp",
        "cs" => "csharp",
        "swift" => "swift",
        "rb" => "ruby",
        "php" => "php",
        "dart" => "dart",
        "sh" | "bash" => "shellscript",
        "json" => "json",
        "txt" => PLAIN_TEXT,
        _ => return None,
    };

    Some(id)
}

/// Detect the language identifier for a path, falling back to plain text
pub fn language_id_for_path(path: &std::path::Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(detect_language_id)
        .unwrap_or(PLAIN_TEXT)
}
