//! Actors: the stage and sprites, each owning an ordered handler list.
//!
//! All handler lookups demand exactly one match. Duplicate handler IDs
//! inside one actor are an integrity violation and are reported as
//! [`CoreError::HandlerNotUnique`] rather than silently resolved.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::CoreError;
use crate::event::EventHandler;
use crate::id::{ActorId, HandlerId};
use crate::skeleton::{EmbodyContext, NoIdActor};

/// Name the stage always has; reserved for sprites.
pub const STAGE_NAME: &str = "Stage";

/// Whether an actor is the (unique) stage or one of the sprites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorKind {
    Stage,
    Sprite,
}

impl ActorKind {
    /// The `pytch` base class an actor of this kind derives from.
    pub fn base_class_name(self) -> &'static str {
        match self {
            ActorKind::Stage => "Stage",
            ActorKind::Sprite => "Sprite",
        }
    }

    /// The class attribute listing this kind's images.
    pub fn appearances_attribute(self) -> &'static str {
        match self {
            ActorKind::Stage => "Backdrops",
            ActorKind::Sprite => "Costumes",
        }
    }
}

impl fmt::Display for ActorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActorKind::Stage => f.write_str("stage"),
            ActorKind::Sprite => f.write_str("sprite"),
        }
    }
}

/// A stage or sprite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub kind: ActorKind,
    pub name: String,
    pub handlers: Vec<EventHandler>,
}

/// Structural view of an actor: its kind and handler order, without code.
///
/// Observers compare summaries to decide whether the handler list changed
/// shape; code edits leave the summary equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorSummary {
    pub kind: ActorKind,
    #[serde(rename = "handlerIds")]
    pub handler_ids: SmallVec<[HandlerId; 8]>,
}

impl Actor {
    /// Creates a new stage with no handlers.
    pub fn new_empty_stage() -> Self {
        Actor {
            id: ActorId::new_random(),
            kind: ActorKind::Stage,
            name: STAGE_NAME.to_string(),
            handlers: Vec::new(),
        }
    }

    /// Creates a new sprite called `name` with no handlers.
    pub fn new_empty_sprite(name: impl Into<String>) -> Self {
        Actor {
            id: ActorId::new_random(),
            kind: ActorKind::Sprite,
            name: name.into(),
            handlers: Vec::new(),
        }
    }

    /// Embodies an ID-free actor, minting IDs for it and its handlers and
    /// registering each declared asset with `ctx`.
    pub fn from_skeleton<C: EmbodyContext + ?Sized>(
        skeleton: &NoIdActor,
        ctx: &mut C,
    ) -> Result<Self, CoreError> {
        let id = ActorId::new_random();
        let handlers = skeleton
            .handlers
            .iter()
            .map(|h| EventHandler::new_with_code(h.event.clone(), h.python_code.clone()))
            .collect();

        for asset in &skeleton.assets {
            ctx.register_actor_asset(id, &asset.file_basename)?;
        }

        Ok(Actor {
            id,
            kind: skeleton.kind,
            name: skeleton.name.clone(),
            handlers,
        })
    }

    /// Returns the kind and handler order of this actor.
    pub fn summary(&self) -> ActorSummary {
        ActorSummary {
            kind: self.kind,
            handler_ids: self.handlers.iter().map(|h| h.id).collect(),
        }
    }

    /// Returns the index of the unique handler with the given ID.
    pub fn handler_index_by_id(&self, handler_id: HandlerId) -> Result<usize, CoreError> {
        let mut matching = self
            .handlers
            .iter()
            .enumerate()
            .filter(|(_, h)| h.id == handler_id)
            .map(|(idx, _)| idx);

        match (matching.next(), matching.next()) {
            (Some(idx), None) => Ok(idx),
            (first, _) => {
                let count = first.map_or(0, |_| 2 + matching.count());
                Err(CoreError::HandlerNotUnique {
                    id: handler_id,
                    count,
                })
            }
        }
    }

    /// Returns the unique handler with the given ID.
    pub fn handler_by_id(&self, handler_id: HandlerId) -> Result<&EventHandler, CoreError> {
        let idx = self.handler_index_by_id(handler_id)?;
        Ok(&self.handlers[idx])
    }

    /// Mutable variant of [`handler_by_id`](Self::handler_by_id).
    pub fn handler_by_id_mut(
        &mut self,
        handler_id: HandlerId,
    ) -> Result<&mut EventHandler, CoreError> {
        let idx = self.handler_index_by_id(handler_id)?;
        Ok(&mut self.handlers[idx])
    }

    /// Returns whether any handler has the given ID. Never fails.
    pub fn has_handler_by_id(&self, handler_id: HandlerId) -> bool {
        self.handlers.iter().any(|h| h.id == handler_id)
    }

    /// Removes and returns the unique handler with the given ID.
    pub fn delete_handler_by_id(&mut self, handler_id: HandlerId) -> Result<EventHandler, CoreError> {
        let idx = self.handler_index_by_id(handler_id)?;
        Ok(self.handlers.remove(idx))
    }

    /// Appends `handler`, rejecting it if its ID is already present.
    pub fn append_handler(&mut self, handler: EventHandler) -> Result<(), CoreError> {
        if self.has_handler_by_id(handler.id) {
            return Err(CoreError::DuplicateHandler {
                actor: self.id,
                handler: handler.id,
            });
        }
        self.handlers.push(handler);
        Ok(())
    }

    /// Moves the handler `moving_id` into the position currently held by
    /// `target_id`.
    ///
    /// The moving handler ends up after the target if the target was after
    /// it, and before the target if the target was before it:
    ///
    /// ```text
    /// [a, b, M, c, d, T, e, f]  ->  [a, b, c, d, T, M, e, f]
    /// [T, a, b, c, M, d, e, f]  ->  [M, T, a, b, c, d, e, f]
    /// ```
    ///
    /// Both IDs must identify exactly one handler. The list is untouched if
    /// the two IDs are equal, or if any lookup fails.
    pub fn reorder_handlers(
        &mut self,
        moving_id: HandlerId,
        target_id: HandlerId,
    ) -> Result<(), CoreError> {
        let moving_idx = self.handler_index_by_id(moving_id)?;
        let target_idx = self.handler_index_by_id(target_id)?;

        if moving_id == target_id {
            return Ok(());
        }

        match target_idx.cmp(&moving_idx) {
            // After removal, everything from moving_idx onwards shifts down
            // by one, so inserting at target_idx lands just after the target.
            Ordering::Greater | Ordering::Less => {
                let handler = self.handlers.remove(moving_idx);
                self.handlers.insert(target_idx, handler);
                Ok(())
            }
            Ordering::Equal => Err(CoreError::ReorderInconsistent {
                moving: moving_id,
                target: target_id,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventDescriptor;

    fn sprite_with_handlers(n: usize) -> (Actor, Vec<HandlerId>) {
        let mut sprite = Actor::new_empty_sprite("Banana");
        for _ in 0..n {
            let handler = EventHandler::new_with_empty_code(EventDescriptor::Clicked);
            sprite.append_handler(handler).unwrap();
        }
        let ids = sprite.handlers.iter().map(|h| h.id).collect();
        (sprite, ids)
    }

    fn handler_ids(actor: &Actor) -> Vec<HandlerId> {
        actor.handlers.iter().map(|h| h.id).collect()
    }

    #[test]
    fn create_new_stage() {
        let stage = Actor::new_empty_stage();
        assert_eq!(stage.kind, ActorKind::Stage);
        assert!(stage.handlers.is_empty());
        assert_eq!(stage.name, "Stage");
    }

    #[test]
    fn create_new_sprite() {
        let sprite = Actor::new_empty_sprite("Banana");
        assert_eq!(sprite.kind, ActorKind::Sprite);
        assert!(sprite.handlers.is_empty());
        assert_eq!(sprite.name, "Banana");
    }

    #[test]
    fn append_rejects_duplicate() {
        let mut sprite = Actor::new_empty_sprite("Banana");
        let handler = EventHandler::new_with_empty_code(EventDescriptor::Clicked);
        sprite.append_handler(handler.clone()).unwrap();
        assert_eq!(sprite.handlers.len(), 1);

        let err = sprite.append_handler(handler).unwrap_err();
        assert!(err.to_string().contains("already has a handler"));
        assert_eq!(sprite.handlers.len(), 1);
    }

    #[test]
    fn lookup_requires_exactly_one_match() {
        let (mut sprite, ids) = sprite_with_handlers(3);
        assert_eq!(sprite.handler_index_by_id(ids[1]).unwrap(), 1);
        assert!(sprite.has_handler_by_id(ids[2]));

        let missing = HandlerId::new_random();
        assert!(!sprite.has_handler_by_id(missing));
        assert_eq!(
            sprite.handler_by_id(missing).unwrap_err(),
            CoreError::HandlerNotUnique {
                id: missing,
                count: 0
            }
        );

        // Force a duplicate past append_handler()'s guard.
        let dup = sprite.handlers[0].clone();
        sprite.handlers.push(dup);
        assert_eq!(
            sprite.handler_index_by_id(ids[0]).unwrap_err(),
            CoreError::HandlerNotUnique {
                id: ids[0],
                count: 2
            }
        );
    }

    #[test]
    fn delete_handler_returns_it() {
        let (mut sprite, ids) = sprite_with_handlers(3);
        let removed = sprite.delete_handler_by_id(ids[1]).unwrap();
        assert_eq!(removed.id, ids[1]);
        assert_eq!(handler_ids(&sprite), vec![ids[0], ids[2]]);
        assert!(sprite.delete_handler_by_id(ids[1]).is_err());
    }

    #[test]
    fn reorder_moving_before_target() {
        let (mut sprite, ids) = sprite_with_handlers(8);
        // [a, b, moving, c, d, target, e, f]
        let (a, b, moving, c, d, target, e, f) = (
            ids[0], ids[1], ids[2], ids[3], ids[4], ids[5], ids[6], ids[7],
        );
        sprite.reorder_handlers(moving, target).unwrap();
        assert_eq!(handler_ids(&sprite), vec![a, b, c, d, target, moving, e, f]);
    }

    #[test]
    fn reorder_target_before_moving() {
        let (mut sprite, ids) = sprite_with_handlers(8);
        // [target, a, b, c, moving, d, e, f]
        let (target, a, b, c, moving, d, e, f) = (
            ids[0], ids[1], ids[2], ids[3], ids[4], ids[5], ids[6], ids[7],
        );
        sprite.reorder_handlers(moving, target).unwrap();
        assert_eq!(handler_ids(&sprite), vec![moving, target, a, b, c, d, e, f]);
    }

    #[test]
    fn reorder_onto_itself_is_noop() {
        let (mut sprite, ids) = sprite_with_handlers(4);
        sprite.reorder_handlers(ids[2], ids[2]).unwrap();
        assert_eq!(handler_ids(&sprite), ids);
    }

    #[test]
    fn reorder_unknown_id_leaves_list_alone() {
        let (mut sprite, ids) = sprite_with_handlers(4);
        assert!(sprite
            .reorder_handlers(ids[0], HandlerId::new_random())
            .is_err());
        assert!(sprite
            .reorder_handlers(HandlerId::new_random(), ids[0])
            .is_err());
        assert_eq!(handler_ids(&sprite), ids);
    }

    #[test]
    fn summary_equality_tracks_structure_only() {
        let (mut sprite, ids) = sprite_with_handlers(3);
        let before = sprite.summary();

        sprite.handler_by_id_mut(ids[0]).unwrap().python_code = "self.hide()".into();
        assert_eq!(sprite.summary(), before);

        sprite.reorder_handlers(ids[0], ids[2]).unwrap();
        assert_ne!(sprite.summary(), before);

        let mut as_stage = before.clone();
        as_stage.kind = ActorKind::Stage;
        assert_ne!(as_stage, before);
    }
}
