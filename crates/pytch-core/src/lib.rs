pub mod actor;
pub mod asset;
pub mod change;
pub mod error;
pub mod event;
pub mod id;
pub mod name;
pub mod program;
pub mod skeleton;

// Re-export commonly used types
pub use actor::{Actor, ActorKind, ActorSummary};
pub use asset::{AssetCatalog, AssetMetaData};
pub use change::{ProgramChange, UpsertKind};
pub use error::CoreError;
pub use event::{EventDescriptor, EventHandler, EventKind};
pub use id::{ActorId, HandlerId};
pub use name::{name_validity, unused_sprite_name, NameOracle, NameValidity, PythonNames};
pub use program::{
    HandlerDeletionDescriptor, HandlerUpsertionAction, HandlerUpsertionDescriptor,
    HandlersReorderingDescriptor, PythonCodeUpdateDescriptor, SpriteUpsertionArgs,
    StructuredProgram,
};
pub use skeleton::{EmbodyContext, NoIdsStructuredProject};
