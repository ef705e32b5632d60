//! Live editing state shared between the editor and the runner.
//!
//! [`EditSession`] wraps the program in a `std::sync::RwLock` so that a
//! flatten always reads one consistent snapshot while mutators hold the
//! write half. The source map of the last flatten sits behind its own lock
//! so that error reports can be resolved while the program is being edited.
//!
//! Locks are always taken in the order program, source map, focus. The
//! cursor-warp mailbox has its own internal lock and is never held across
//! any other.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use pytch_core::{
    name_validity, ActorId, AssetMetaData, CoreError, EventHandler, HandlerDeletionDescriptor,
    HandlerId, HandlerUpsertionDescriptor, HandlersReorderingDescriptor, NameOracle,
    NameValidity, ProgramChange, PythonCodeUpdateDescriptor, PythonNames, SpriteUpsertionArgs,
    StructuredProgram,
};
use pytch_flatten::{
    flatten_with_options, FlattenOptions, FlattenResult, LocationWithinHandler, SourceMap,
};

use crate::cursor_warp::{CursorWarpTarget, PendingCursorWarp};
use crate::error::SessionError;
use crate::location::ErrorLocation;

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn logged(err: SessionError) -> SessionError {
    if err.is_user_error() {
        tracing::warn!(error = %err, "rejected edit");
    } else {
        tracing::error!(error = %err, "program integrity error");
    }
    err
}

/// One user's editing session on one program.
pub struct EditSession {
    program: RwLock<StructuredProgram>,
    source_map: RwLock<SourceMap>,
    focused_actor: RwLock<ActorId>,
    cursor_warp: PendingCursorWarp,
    name_oracle: Arc<dyn NameOracle + Send + Sync>,
    flatten_options: FlattenOptions,
}

impl EditSession {
    /// Creates a session on an empty program, with the stage focused.
    pub fn new() -> Self {
        Self::from_program(StructuredProgram::new_empty())
    }

    /// Creates a session on `program`, with the stage focused.
    pub fn from_program(program: StructuredProgram) -> Self {
        let stage_id = program.stage().id;
        EditSession {
            program: RwLock::new(program),
            source_map: RwLock::new(SourceMap::new()),
            focused_actor: RwLock::new(stage_id),
            cursor_warp: PendingCursorWarp::new(),
            name_oracle: Arc::new(PythonNames),
            flatten_options: FlattenOptions::default(),
        }
    }

    /// Replaces the oracle used to check sprite names.
    pub fn with_name_oracle(mut self, oracle: Arc<dyn NameOracle + Send + Sync>) -> Self {
        self.name_oracle = oracle;
        self
    }

    /// Replaces the options used when flattening and when translating
    /// error columns back into handler columns.
    pub fn with_flatten_options(mut self, options: FlattenOptions) -> Self {
        self.flatten_options = options;
        self
    }

    /// Loads a different program. Focuses its stage and forgets the source
    /// map and any pending cursor warp, which referred to the old program.
    pub fn boot(&self, program: StructuredProgram) {
        let stage_id = program.stage().id;
        let mut current = write(&self.program);
        let mut source_map = write(&self.source_map);
        let mut focused = write(&self.focused_actor);

        *current = program;
        source_map.clear();
        *focused = stage_id;
        self.cursor_warp.take();

        tracing::info!(
            n_actors = current.actors().len(),
            stage_id = %stage_id,
            "booted program"
        );
    }

    // -----------------------------------------------------------------------
    // Program access
    // -----------------------------------------------------------------------

    /// Runs `f` against the current program.
    pub fn with_program<R>(&self, f: impl FnOnce(&StructuredProgram) -> R) -> R {
        f(&read(&self.program))
    }

    /// Returns a copy of the current program.
    pub fn snapshot(&self) -> StructuredProgram {
        read(&self.program).clone()
    }

    /// Runs a mutation against the program, logging any failure.
    pub fn mutate<R>(
        &self,
        f: impl FnOnce(&mut StructuredProgram) -> Result<R, CoreError>,
    ) -> Result<R, SessionError> {
        let mut program = write(&self.program);
        f(&mut program).map_err(|e| logged(e.into()))
    }

    // -----------------------------------------------------------------------
    // Focus
    // -----------------------------------------------------------------------

    pub fn focused_actor(&self) -> ActorId {
        *read(&self.focused_actor)
    }

    /// Focuses the actor with the given ID, which must exist.
    pub fn focus_actor(&self, actor_id: ActorId) -> Result<(), SessionError> {
        let program = read(&self.program);
        program
            .unique_actor_by_id(actor_id)
            .map_err(|e| logged(e.into()))?;
        *write(&self.focused_actor) = actor_id;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Sprite edits
    // -----------------------------------------------------------------------

    fn check_name(&self, existing: &[String], candidate: &str) -> Result<(), SessionError> {
        match name_validity(self.name_oracle.as_ref(), existing, candidate) {
            NameValidity::Valid => Ok(()),
            NameValidity::Invalid { reason } => Err(logged(SessionError::InvalidName {
                name: candidate.to_string(),
                reason,
            })),
        }
    }

    /// Adds a sprite after checking its name, and focuses it.
    pub fn add_sprite(&self, name: &str) -> Result<ActorId, SessionError> {
        self.upsert_sprite(SpriteUpsertionArgs::Insert {
            name: name.to_string(),
        })
    }

    /// Adds or renames a sprite after checking the new name, and focuses it.
    ///
    /// When renaming, the sprite's current name does not count as taken,
    /// but renaming a sprite to the name it already has is refused.
    pub fn upsert_sprite(&self, args: SpriteUpsertionArgs) -> Result<ActorId, SessionError> {
        let mut program = write(&self.program);

        if let SpriteUpsertionArgs::Update {
            name,
            previous_name,
            ..
        } = &args
        {
            if name == previous_name {
                return Err(logged(SessionError::InvalidName {
                    name: name.clone(),
                    reason: "it is the same as the current name".to_string(),
                }));
            }
        }

        let (candidate, ignored) = match &args {
            SpriteUpsertionArgs::Insert { name } => (name.as_str(), None),
            SpriteUpsertionArgs::Update {
                name,
                previous_name,
                ..
            } => (name.as_str(), Some(previous_name.as_str())),
        };
        let existing: Vec<String> = program
            .sprite_names()
            .into_iter()
            .filter(|n| Some(n.as_str()) != ignored)
            .collect();
        self.check_name(&existing, candidate)?;

        let actor_id = program.upsert_sprite(args).map_err(|e| logged(e.into()))?;
        *write(&self.focused_actor) = actor_id;
        Ok(actor_id)
    }

    /// Deletes a sprite and focuses the actor next to where it was.
    pub fn delete_sprite(&self, actor_id: ActorId) -> Result<ActorId, SessionError> {
        let mut program = write(&self.program);
        let adjacent = program
            .delete_sprite(actor_id)
            .map_err(|e| logged(e.into()))?;
        *write(&self.focused_actor) = adjacent;
        Ok(adjacent)
    }

    // -----------------------------------------------------------------------
    // Handler edits
    // -----------------------------------------------------------------------

    pub fn upsert_handler(
        &self,
        descriptor: HandlerUpsertionDescriptor,
    ) -> Result<ProgramChange, SessionError> {
        self.mutate(|program| program.upsert_handler(descriptor))
    }

    pub fn delete_handler(
        &self,
        descriptor: HandlerDeletionDescriptor,
    ) -> Result<EventHandler, SessionError> {
        self.mutate(|program| program.delete_handler(descriptor))
    }

    pub fn reorder_handlers(
        &self,
        descriptor: HandlersReorderingDescriptor,
    ) -> Result<(), SessionError> {
        self.mutate(|program| program.reorder_handlers_of_actor(descriptor))
    }

    pub fn update_python_code(
        &self,
        descriptor: PythonCodeUpdateDescriptor,
    ) -> Result<(), SessionError> {
        self.mutate(|program| program.update_python_code(descriptor))
    }

    // -----------------------------------------------------------------------
    // Flattening and error locations
    // -----------------------------------------------------------------------

    /// Flattens the current program and makes its source map the live one.
    pub fn flatten(&self, assets: &[AssetMetaData]) -> Result<FlattenResult, SessionError> {
        let program = read(&self.program);
        let result = flatten_with_options(&program, assets, &self.flatten_options);
        write(&self.source_map)
            .set_entries(result.map_entries.clone())
            .map_err(|e| logged(e.into()))?;
        Ok(result)
    }

    pub fn source_map(&self) -> SourceMap {
        read(&self.source_map).clone()
    }

    /// Resolves a line of the most recently flattened program.
    pub fn local_from_global(&self, line: usize) -> Result<LocationWithinHandler, SessionError> {
        Ok(read(&self.source_map).local_from_global(line)?)
    }

    /// Resolves an error position in the flattened program, focuses the
    /// actor owning the handler it falls in, and parks a cursor warp for
    /// that handler's editor.
    pub fn go_to_error(
        &self,
        line: usize,
        col_no: Option<usize>,
    ) -> Result<ErrorLocation, SessionError> {
        let program = read(&self.program);
        let location = ErrorLocation::resolve(
            &read(&self.source_map),
            &self.flatten_options,
            line,
            col_no,
        )
        .map_err(|e| logged(e.into()))?;

        // The map may predate deleting the actor or the handler.
        program
            .unique_actor_by_id(location.location.actor_id)
            .and_then(|actor| actor.handler_by_id(location.location.handler_id))
            .map_err(|e| logged(e.into()))?;

        *write(&self.focused_actor) = location.location.actor_id;
        self.cursor_warp.set(location.warp_target());
        tracing::debug!(line, location = %location, "going to error");
        Ok(location)
    }

    pub fn set_cursor_warp(&self, target: CursorWarpTarget) {
        self.cursor_warp.set(target);
    }

    /// Claims the pending cursor warp if it is for `handler_id`.
    pub fn acquire_warp_for_handler(&self, handler_id: HandlerId) -> Option<CursorWarpTarget> {
        self.cursor_warp.acquire_if_for_handler(handler_id)
    }

    pub fn cursor_warp(&self) -> &PendingCursorWarp {
        &self.cursor_warp
    }
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new()
    }
}
