//! Core error types for pytch-core.
//!
//! Uses `thiserror` for structured, matchable error variants. Most variants
//! are integrity errors: they indicate the caller drove the model with IDs
//! that do not exist or are not unique, and should never be reached from a
//! correctly-behaving editor. The few user-input variants are singled out by
//! [`CoreError::is_user_error`].

use crate::actor::ActorKind;
use crate::id::{ActorId, HandlerId};
use thiserror::Error;

/// Core errors produced by the pytch-core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Zero or several actors share the given ID.
    #[error("found {count} actors with id {id}")]
    ActorNotUnique { id: ActorId, count: usize },

    /// Zero or several handlers share the given ID.
    #[error("found {count} handlers with id {id}")]
    HandlerNotUnique { id: HandlerId, count: usize },

    /// Appending a handler whose ID is already present in the actor.
    #[error("actor {actor} already has a handler with id {handler}")]
    DuplicateHandler { actor: ActorId, handler: HandlerId },

    /// A sprite-only operation was applied to the stage.
    #[error("actor {id} should be of kind \"sprite\" but is of kind \"{kind}\"")]
    NotASprite { id: ActorId, kind: ActorKind },

    /// Reorder reached a relative position that valid indices cannot produce.
    #[error("cannot reorder handler {moving} relative to handler {target}")]
    ReorderInconsistent { moving: HandlerId, target: HandlerId },

    /// A sprite with the requested name already exists.
    #[error("already have sprite called \"{name}\"")]
    DuplicateSpriteName { name: String },

    /// The requested sprite name is reserved for the stage.
    #[error("cannot have a sprite called \"{name}\"")]
    ReservedSpriteName { name: String },

    /// Rename guard: the actor's name changed since the rename was requested.
    #[error("actor {id} is called \"{actual}\" but rename expected \"{expected}\"")]
    StaleSpriteName {
        id: ActorId,
        expected: String,
        actual: String,
    },

    /// A program or skeleton violates the stage/sprite structure invariants.
    #[error("malformed program: {reason}")]
    MalformedProgram { reason: String },

    /// An asset name is not of the form `<actorId>/<basename>`.
    #[error("asset name \"{name}\" is not of the form <actorId>/<basename>")]
    InvalidAssetName { name: String },

    /// Two asset names were expected to belong to the same actor.
    #[error("\"{first}\" and \"{second}\" have different actorId")]
    DifferentActorIds { first: String, second: String },

    /// No mime type could be guessed from an asset's basename.
    #[error("could not guess mime type for \"{basename}\"; {reason}")]
    UnknownMimeType { basename: String, reason: String },

    /// The asset-registration collaborator refused an asset.
    #[error("could not register asset \"{basename}\" for actor {actor}: {reason}")]
    AssetRegistration {
        actor: ActorId,
        basename: String,
        reason: String,
    },
}

impl CoreError {
    /// Returns `true` for errors caused by user input (which must be shown
    /// as friendly messages) rather than by an inconsistent caller.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            CoreError::DuplicateSpriteName { .. }
                | CoreError::ReservedSpriteName { .. }
                | CoreError::StaleSpriteName { .. }
        )
    }
}
