//! StructuredProgram: the whole program as an ordered list of actors.
//!
//! [`StructuredProgram`] is the single entry point for editing. It keeps the
//! structural invariants (non-empty, the stage at index 0 and nowhere else,
//! unique sprite names, unique IDs) by only allowing mutation through its
//! methods. Every mutator either succeeds or returns an error having left
//! the program unchanged.
//!
//! The aggregate is single-writer: methods take `&mut self` and run to
//! completion. Callers sharing a program across threads must serialize
//! access themselves (see `pytch-session`).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::actor::{Actor, ActorKind, ActorSummary, STAGE_NAME};
use crate::change::{ProgramChange, UpsertKind};
use crate::error::CoreError;
use crate::event::{EventDescriptor, EventHandler};
use crate::id::{ActorId, HandlerId};
use crate::skeleton::{EmbodyContext, NoIdsStructuredProject};

/// How to upsert a handler: append a new one, or change an existing one's
/// event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum HandlerUpsertionAction {
    Insert,
    Update {
        #[serde(rename = "handlerId")]
        handler_id: HandlerId,
    },
}

/// Full description of a handler upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerUpsertionDescriptor {
    pub actor_id: ActorId,
    pub action: HandlerUpsertionAction,
    pub event_descriptor: EventDescriptor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerDeletionDescriptor {
    pub actor_id: ActorId,
    pub handler_id: HandlerId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlersReorderingDescriptor {
    pub actor_id: ActorId,
    pub moving_handler_id: HandlerId,
    pub target_handler_id: HandlerId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PythonCodeUpdateDescriptor {
    pub actor_id: ActorId,
    pub handler_id: HandlerId,
    pub code: String,
}

/// Add a sprite, or rename an existing one.
///
/// `previous_name` guards against renaming based on stale state: the
/// update is refused unless the sprite is still called `previous_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SpriteUpsertionArgs {
    Insert {
        name: String,
    },
    #[serde(rename_all = "camelCase")]
    Update {
        actor_id: ActorId,
        name: String,
        previous_name: String,
    },
}

/// Unvalidated serialized form of a program. Converting it into a
/// [`StructuredProgram`] checks every structural invariant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramParts {
    pub actors: Vec<Actor>,
}

/// A whole program: the stage followed by zero or more sprites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProgramParts", into = "ProgramParts")]
pub struct StructuredProgram {
    actors: Vec<Actor>,
}

impl TryFrom<ProgramParts> for StructuredProgram {
    type Error = CoreError;

    fn try_from(parts: ProgramParts) -> Result<Self, Self::Error> {
        StructuredProgram::from_actors(parts.actors)
    }
}

impl From<StructuredProgram> for ProgramParts {
    fn from(program: StructuredProgram) -> Self {
        ProgramParts {
            actors: program.actors,
        }
    }
}

fn malformed(reason: impl Into<String>) -> CoreError {
    CoreError::MalformedProgram {
        reason: reason.into(),
    }
}

/// Checks the stage/sprite structure given each actor's kind and name: a
/// leading stage, no other stage, and unique sprite names none of which is
/// "Stage".
fn check_actor_shape<'a>(
    actors: impl IntoIterator<Item = (ActorKind, &'a str)>,
) -> Result<(), CoreError> {
    let mut sprite_names = HashSet::new();
    let mut saw_stage = false;

    for (idx, (kind, name)) in actors.into_iter().enumerate() {
        match (idx, kind) {
            (0, ActorKind::Stage) => saw_stage = true,
            (0, ActorKind::Sprite) => return Err(malformed("first actor is not the stage")),
            (_, ActorKind::Stage) => {
                return Err(malformed(format!("second stage at index {}", idx)))
            }
            (_, ActorKind::Sprite) => {
                if name == STAGE_NAME {
                    return Err(malformed("sprite called \"Stage\""));
                }
                if !sprite_names.insert(name) {
                    return Err(malformed(format!(
                        "more than one sprite called \"{}\"",
                        name
                    )));
                }
            }
        }
    }

    if !saw_stage {
        return Err(malformed("program has no actors"));
    }
    Ok(())
}

impl StructuredProgram {
    /// Creates a program containing just an empty stage.
    pub fn new_empty() -> Self {
        StructuredProgram {
            actors: vec![Actor::new_empty_stage()],
        }
    }

    /// Creates a small demo program: the stage plus a sprite `Snake` with a
    /// single green-flag handler.
    pub fn new_simple_example() -> Self {
        let mut snake = Actor::new_empty_sprite("Snake");
        snake.handlers.push(EventHandler::new_with_code(
            EventDescriptor::GreenFlag,
            "self.say_for_seconds(\"Hello world\", 2.0)",
        ));

        StructuredProgram {
            actors: vec![Actor::new_empty_stage(), snake],
        }
    }

    /// Builds a program from already-identified actors, checking every
    /// structural invariant.
    pub fn from_actors(actors: Vec<Actor>) -> Result<Self, CoreError> {
        let program = StructuredProgram { actors };
        program.validate()?;
        Ok(program)
    }

    /// Embodies an ID-free skeleton, minting fresh IDs for every actor and
    /// handler and registering each declared asset with `ctx`.
    pub fn from_skeleton<C: EmbodyContext + ?Sized>(
        skeleton: &NoIdsStructuredProject,
        ctx: &mut C,
    ) -> Result<Self, CoreError> {
        // Check the shape before minting IDs, so a rejected skeleton
        // registers no assets.
        check_actor_shape(skeleton.actors.iter().map(|a| (a.kind, a.name.as_str())))?;

        let actors = skeleton
            .actors
            .iter()
            .map(|a| Actor::from_skeleton(a, ctx))
            .collect::<Result<Vec<_>, _>>()?;

        let program = StructuredProgram::from_actors(actors)?;
        tracing::debug!(
            n_actors = program.actors.len(),
            "embodied program from skeleton"
        );
        Ok(program)
    }

    fn validate(&self) -> Result<(), CoreError> {
        check_actor_shape(self.actors.iter().map(|a| (a.kind, a.name.as_str())))?;

        let mut actor_ids = HashSet::new();
        let mut handler_ids = HashSet::new();

        for actor in &self.actors {
            if !actor_ids.insert(actor.id) {
                return Err(CoreError::ActorNotUnique {
                    id: actor.id,
                    count: 2,
                });
            }
            for handler in &actor.handlers {
                if !handler_ids.insert(handler.id) {
                    return Err(CoreError::HandlerNotUnique {
                        id: handler.id,
                        count: 2,
                    });
                }
            }
        }

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Read-only accessors
    // -----------------------------------------------------------------------

    /// All actors, the stage first.
    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    /// The stage, always `actors()[0]`.
    pub fn stage(&self) -> &Actor {
        &self.actors[0]
    }

    fn actor_index_by_id(&self, actor_id: ActorId) -> Result<usize, CoreError> {
        let matching: Vec<usize> = self
            .actors
            .iter()
            .enumerate()
            .filter(|(_, a)| a.id == actor_id)
            .map(|(idx, _)| idx)
            .collect();

        match matching.as_slice() {
            [idx] => Ok(*idx),
            _ => Err(CoreError::ActorNotUnique {
                id: actor_id,
                count: matching.len(),
            }),
        }
    }

    /// Returns the unique actor with the given ID.
    pub fn unique_actor_by_id(&self, actor_id: ActorId) -> Result<&Actor, CoreError> {
        let idx = self.actor_index_by_id(actor_id)?;
        Ok(&self.actors[idx])
    }

    fn unique_actor_by_id_mut(&mut self, actor_id: ActorId) -> Result<&mut Actor, CoreError> {
        let idx = self.actor_index_by_id(actor_id)?;
        Ok(&mut self.actors[idx])
    }

    /// Returns the structural summary of the unique actor with the given ID.
    pub fn unique_actor_summary_by_id(&self, actor_id: ActorId) -> Result<ActorSummary, CoreError> {
        self.unique_actor_by_id(actor_id).map(Actor::summary)
    }

    /// Returns the unique handler with the given ID, searching every actor.
    ///
    /// If the owning actor is known, [`Actor::handler_by_id`] is cheaper.
    pub fn unique_handler_by_id_globally(
        &self,
        handler_id: HandlerId,
    ) -> Result<&EventHandler, CoreError> {
        self.unique_located_handler(handler_id).map(|(_, h)| h)
    }

    /// Returns the owning actor's ID along with the unique handler with
    /// the given ID.
    pub fn unique_located_handler(
        &self,
        handler_id: HandlerId,
    ) -> Result<(ActorId, &EventHandler), CoreError> {
        let mut matching = self.actors.iter().flat_map(|actor| {
            actor
                .handlers
                .iter()
                .filter(move |h| h.id == handler_id)
                .map(move |h| (actor.id, h))
        });

        match (matching.next(), matching.next()) {
            (Some(found), None) => Ok(found),
            (first, _) => Err(CoreError::HandlerNotUnique {
                id: handler_id,
                count: first.map_or(0, |_| 2 + matching.count()),
            }),
        }
    }

    /// Names of all sprites, in program order.
    pub fn sprite_names(&self) -> Vec<String> {
        self.actors
            .iter()
            .filter(|a| a.kind == ActorKind::Sprite)
            .map(|a| a.name.clone())
            .collect()
    }

    /// Whether some sprite is called `name`.
    pub fn has_sprite_by_name(&self, name: &str) -> bool {
        self.actors
            .iter()
            .any(|a| a.kind == ActorKind::Sprite && a.name == name)
    }

    // -----------------------------------------------------------------------
    // Sprite mutators
    // -----------------------------------------------------------------------

    /// Appends a new empty sprite called `name` and returns its ID.
    ///
    /// Name syntax is not checked here; see [`crate::name::name_validity`].
    pub fn add_sprite(&mut self, name: &str) -> Result<ActorId, CoreError> {
        if name == STAGE_NAME {
            return Err(CoreError::ReservedSpriteName {
                name: name.to_string(),
            });
        }
        if self.has_sprite_by_name(name) {
            return Err(CoreError::DuplicateSpriteName {
                name: name.to_string(),
            });
        }

        let sprite = Actor::new_empty_sprite(name);
        let id = sprite.id;
        self.actors.push(sprite);
        tracing::debug!(actor_id = %id, name, "added sprite");
        Ok(id)
    }

    /// Adds or renames a sprite, returning the affected actor's ID.
    pub fn upsert_sprite(&mut self, args: SpriteUpsertionArgs) -> Result<ActorId, CoreError> {
        match args {
            SpriteUpsertionArgs::Insert { name } => self.add_sprite(&name),
            SpriteUpsertionArgs::Update {
                actor_id,
                name,
                previous_name,
            } => {
                let actor = self.unique_actor_by_id(actor_id)?;
                if actor.kind != ActorKind::Sprite {
                    return Err(CoreError::NotASprite {
                        id: actor_id,
                        kind: actor.kind,
                    });
                }
                if actor.name != previous_name {
                    return Err(CoreError::StaleSpriteName {
                        id: actor_id,
                        expected: previous_name,
                        actual: actor.name.clone(),
                    });
                }

                if name == STAGE_NAME {
                    return Err(CoreError::ReservedSpriteName { name });
                }
                let collides = self
                    .actors
                    .iter()
                    .any(|a| a.kind == ActorKind::Sprite && a.id != actor_id && a.name == name);
                if collides {
                    return Err(CoreError::DuplicateSpriteName { name });
                }

                let actor = self.unique_actor_by_id_mut(actor_id)?;
                tracing::debug!(actor_id = %actor_id, from = %actor.name, to = %name, "renamed sprite");
                actor.name = name;
                Ok(actor_id)
            }
        }
    }

    /// Deletes the sprite with the given ID.
    ///
    /// Returns the ID of the actor now adjacent to where the sprite was: the
    /// one after it, or the one before it if the sprite was last.
    pub fn delete_sprite(&mut self, actor_id: ActorId) -> Result<ActorId, CoreError> {
        let target_idx = self.actor_index_by_id(actor_id)?;

        let target_kind = self.actors[target_idx].kind;
        if target_kind != ActorKind::Sprite {
            return Err(CoreError::NotASprite {
                id: actor_id,
                kind: target_kind,
            });
        }

        // The stage is at index 0, so a sprite always has a predecessor.
        let target_is_last = target_idx == self.actors.len() - 1;
        let adjacent_idx = if target_is_last {
            target_idx - 1
        } else {
            target_idx + 1
        };
        let adjacent_id = self.actors[adjacent_idx].id;

        self.actors.remove(target_idx);
        tracing::debug!(actor_id = %actor_id, adjacent = %adjacent_id, "deleted sprite");
        Ok(adjacent_id)
    }

    // -----------------------------------------------------------------------
    // Handler mutators
    // -----------------------------------------------------------------------

    /// Inserts a new handler with empty code, or replaces the event of an
    /// existing handler leaving its code alone.
    pub fn upsert_handler(
        &mut self,
        descriptor: HandlerUpsertionDescriptor,
    ) -> Result<ProgramChange, CoreError> {
        let HandlerUpsertionDescriptor {
            actor_id,
            action,
            event_descriptor,
        } = descriptor;
        let actor = self.unique_actor_by_id_mut(actor_id)?;

        let (upsert_kind, handler_id) = match action {
            HandlerUpsertionAction::Insert => {
                let handler = EventHandler::new_with_empty_code(event_descriptor);
                let handler_id = handler.id;
                actor.append_handler(handler)?;
                (UpsertKind::Insert, handler_id)
            }
            HandlerUpsertionAction::Update { handler_id } => {
                let handler = actor.handler_by_id_mut(handler_id)?;
                handler.event = event_descriptor;
                (UpsertKind::Update, handler_id)
            }
        };

        tracing::debug!(actor_id = %actor_id, handler_id = %handler_id, ?upsert_kind, "upserted handler");
        Ok(ProgramChange::ScriptUpserted {
            upsert_kind,
            handler_id,
        })
    }

    /// Deletes a handler, returning it.
    pub fn delete_handler(
        &mut self,
        descriptor: HandlerDeletionDescriptor,
    ) -> Result<EventHandler, CoreError> {
        let actor = self.unique_actor_by_id_mut(descriptor.actor_id)?;
        actor.delete_handler_by_id(descriptor.handler_id)
    }

    /// Moves one handler of an actor to the position of another; see
    /// [`Actor::reorder_handlers`].
    pub fn reorder_handlers_of_actor(
        &mut self,
        descriptor: HandlersReorderingDescriptor,
    ) -> Result<(), CoreError> {
        let actor = self.unique_actor_by_id_mut(descriptor.actor_id)?;
        actor.reorder_handlers(descriptor.moving_handler_id, descriptor.target_handler_id)
    }

    /// Replaces the code of a handler.
    pub fn update_python_code(
        &mut self,
        descriptor: PythonCodeUpdateDescriptor,
    ) -> Result<(), CoreError> {
        let actor = self.unique_actor_by_id_mut(descriptor.actor_id)?;
        let handler = actor.handler_by_id_mut(descriptor.handler_id)?;
        handler.python_code = descriptor.code;
        Ok(())
    }
}

impl Default for StructuredProgram {
    fn default() -> Self {
        Self::new_empty()
    }
}
