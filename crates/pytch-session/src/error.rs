//! Session error types.
//!
//! [`SessionError`] unifies the errors of the layers below so session
//! callers deal with a single type. Name-validity failures, which the core
//! reports as a value rather than an error, become
//! [`SessionError::InvalidName`] here.

use pytch_core::CoreError;
use pytch_flatten::SourceMapError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Program lookup or mutation failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A flattened line could not be resolved.
    #[error(transparent)]
    SourceMap(#[from] SourceMapError),

    /// A proposed sprite name was rejected.
    #[error("cannot use \"{name}\" as a sprite name: {reason}")]
    InvalidName { name: String, reason: String },
}

impl SessionError {
    /// Whether this error should be shown to the user as a friendly message,
    /// as opposed to an integrity failure of the program or source map.
    pub fn is_user_error(&self) -> bool {
        match self {
            SessionError::Core(err) => err.is_user_error(),
            SessionError::SourceMap(_) => false,
            SessionError::InvalidName { .. } => true,
        }
    }
}
