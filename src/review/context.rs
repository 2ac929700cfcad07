use super::Row;

/// Source lines around one row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineContext {
    /// Previous source line, empty at the start
    pub prev: String,
    /// Source line under review
    pub target: String,
    /// Next source line, empty at the end
    pub next: String,
}

/// Previous, target and next source lines for the 0-based data index `index`
///
/// Boundaries yield empty strings. An index past the end yields an all-empty
/// context rather than panicking.
pub fn extract_context(rows: &[Row], index: usize) -> LineContext {
    let source = |i: usize| rows.get(i).map(|row| row.source_text.clone()).unwrap_or_default();

    if index >= rows.len() {
        return LineContext::default();
    }

    LineContext {
        prev: index.checked_sub(1).map(source).unwrap_or_default(),
        target: source(index),
        next: source(index + 1),
    }
}
