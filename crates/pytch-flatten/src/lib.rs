//! Flattening of structured programs into a single Python program.
//!
//! This crate lowers a [`StructuredProgram`](pytch_core::StructuredProgram)
//! (stage, sprites, handlers) into one linear Python text for the
//! interpreter, and records a source map so that a line number in that text
//! can be traced back to the handler it came from.
//!
//! # Modules
//!
//! - [`error`] -- Source-map integrity and lookup errors
//! - [`flatten`] -- The flattening pass itself
//! - [`source_map`] -- Mapping between flattened lines and handler lines

pub mod error;
pub mod flatten;
pub mod source_map;

pub use error::SourceMapError;
pub use flatten::{flatten, flatten_with_options};
pub use source_map::{LocationWithinHandler, SourceMap, SourceMapEntry};

use serde::{Deserialize, Serialize};

/// Default columns of indentation added to every line of handler code.
///
/// Translating a column in the flattened text back into a column in the
/// handler's own code means subtracting the indent actually used; see
/// [`FlattenOptions::local_column`].
pub const BODY_INDENT: usize = 8;

/// First number used for generated handler-method names.
pub const GENSYM_SEED: u32 = 1000;

/// Options controlling the flattening pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlattenOptions {
    /// Indentation of handler-body lines (method body inside class body).
    pub body_indent: usize,

    /// Starting value of the per-call method-name counter.
    pub gensym_seed: u32,
}

impl FlattenOptions {
    /// Translates a column in text flattened with these options into a
    /// column within the handler's own code. Returns `None` for columns
    /// inside the indentation.
    pub fn local_column(&self, global_col: usize) -> Option<usize> {
        global_col.checked_sub(self.body_indent)
    }
}

impl Default for FlattenOptions {
    fn default() -> Self {
        FlattenOptions {
            body_indent: BODY_INDENT,
            gensym_seed: GENSYM_SEED,
        }
    }
}

/// Output of a flattening pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlattenResult {
    /// The complete Python program, lines joined with `\n`.
    pub code_text: String,

    /// One entry per handler, in emission order.
    pub map_entries: Vec<SourceMapEntry>,
}
