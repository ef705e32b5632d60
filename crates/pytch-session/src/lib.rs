//! Editing session around a structured program.
//!
//! Holds the live program behind a reader/writer lock, tracks which actor
//! the editor is focused on, keeps the source map of the most recent
//! flatten, and owns the mailbox through which "go to this error" requests
//! reach the handler editor that should show them.

pub mod cursor_warp;
pub mod error;
pub mod location;
pub mod state;

pub use cursor_warp::{CursorWarpTarget, PendingCursorWarp};
pub use error::SessionError;
pub use location::ErrorLocation;
pub use state::EditSession;
