//! Source-map error types.

/// Errors raised when loading or querying a [`SourceMap`](crate::SourceMap).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceMapError {
    /// Entries were supplied out of order. Integrity error: entries from
    /// `flatten()` are always strictly increasing.
    #[error("source map entry {index} starts at line {start_line}, not after line {previous}")]
    NotStrictlyIncreasing {
        index: usize,
        previous: usize,
        start_line: usize,
    },

    /// Nothing has been flattened yet.
    #[error("no source map entries loaded")]
    Empty,

    /// The line is in generated code ahead of the first handler.
    #[error("line {line} comes before the first handler (line {first_start_line})")]
    BeforeFirstHandler {
        line: usize,
        first_start_line: usize,
    },
}
