//! Translation of runtime error locations into handler terms.
//!
//! The interpreter reports errors against the flattened program. An
//! [`ErrorLocation`] re-expresses such a position relative to the handler
//! whose code raised it, ready for display or for moving the cursor there.

use std::fmt;

use serde::{Deserialize, Serialize};

use pytch_flatten::{FlattenOptions, LocationWithinHandler, SourceMap, SourceMapError};

use crate::cursor_warp::CursorWarpTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorLocation {
    pub location: LocationWithinHandler,

    /// Column within the handler's code. `None` if the interpreter gave no
    /// column, or gave one inside the generated indentation.
    pub local_col_no: Option<usize>,
}

impl ErrorLocation {
    /// Resolves a position (`line` one-based, as reported by the
    /// interpreter) in a program flattened with `options`.
    pub fn resolve(
        source_map: &SourceMap,
        options: &FlattenOptions,
        line: usize,
        col_no: Option<usize>,
    ) -> Result<Self, SourceMapError> {
        let location = source_map.local_from_global(line)?;
        Ok(ErrorLocation {
            location,
            local_col_no: col_no.and_then(|col| options.local_column(col)),
        })
    }

    /// Editor line number (one-based) within the handler.
    pub fn local_line_no(&self) -> usize {
        self.location.line_within_handler + 1
    }

    /// A cursor warp to this location.
    pub fn warp_target(&self) -> CursorWarpTarget {
        CursorWarpTarget {
            handler_id: self.location.handler_id,
            line_no: self.local_line_no(),
            col_no: self.local_col_no,
        }
    }
}

impl fmt::Display for ErrorLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}", self.local_line_no())?;
        if let Some(col) = self.local_col_no {
            write!(f, " (position {})", col)?;
        }
        f.write_str(" of your script")
    }
}
