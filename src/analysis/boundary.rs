//! Brace-matching block boundary resolution.

use super::types::BlockBoundary;
use crate::document::Document;
use crate::error::DocumentError;

/// Resolve the `{...}` block that starts on `start_line`.
///
/// Counts literal braces with no awareness of strings or comments. The block closes
/// on the line where the depth comes back to zero after having been positive; when
/// that never happens the block runs to the last line of the document.
pub fn resolve_boundary(
    document: &dyn Document,
    start_line: usize,
) -> Result<BlockBoundary, DocumentError> {
    resolve_boundary_from(document, start_line, 0)
}

/// Like [`resolve_boundary`], but ignores everything before `start_column` on the
/// first line (so `} else {` can be resolved from its `else`).
pub fn resolve_boundary_from(
    document: &dyn Document,
    start_line: usize,
    start_column: usize,
) -> Result<BlockBoundary, DocumentError> {
    let mut depth: i64 = 0;
    let mut opened = false;

    for index in start_line..document.line_count() {
        let line = document.line_at(index)?;
        let text = if index == start_line {
            line.get(start_column..).unwrap_or("")
        } else {
            line
        };

        for ch in text.chars() {
            match ch {
                '{' => {
                    depth += 1;
                    if depth > 0 {
                        opened = true;
                    }
                }
                '}' => {
                    depth -= 1;
                    if opened && depth == 0 {
                        return Ok(BlockBoundary::new(start_line, index));
                    }
                }
                _ => {}
            }
        }
    }

    Ok(BlockBoundary::new(
        start_line,
        document.last_line().max(start_line),
    ))
}

/// Byte offset of the first character that is neither whitespace nor `}`.
pub(crate) fn keyword_column(line: &str) -> usize {
    line.find(|c: char| !c.is_whitespace() && c != '}')
        .unwrap_or(line.len())
}
