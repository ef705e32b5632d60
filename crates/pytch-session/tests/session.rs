//! Integration tests for `EditSession`: focus, error navigation, and use
//! from several threads.

use std::sync::Arc;
use std::thread;

use pytch_core::{
    AssetCatalog, EventDescriptor, HandlerDeletionDescriptor, HandlerId, HandlerUpsertionAction,
    HandlerUpsertionDescriptor, NoIdsStructuredProject, ProgramChange, StructuredProgram,
};
use pytch_session::{CursorWarpTarget, EditSession, SessionError};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn booted_from_skeleton(json: &str) -> (EditSession, Vec<pytch_core::AssetMetaData>) {
    let skeleton = NoIdsStructuredProject::from_json(json).unwrap();
    let mut catalog = AssetCatalog::new();
    let program = StructuredProgram::from_skeleton(&skeleton, &mut catalog).unwrap();
    let session = EditSession::new();
    session.boot(program);
    (session, catalog.into_assets())
}

const TWO_SPRITES: &str = r#"{
    "actors": [
        {"kind": "stage", "name": "Stage"},
        {"kind": "sprite", "name": "Cat",
         "handlers": [{"event": {"kind": "green-flag"}, "pythonCode": "self.show()\nself.say(x)"}],
         "assets": [{"fileBasename": "cat.png"}]},
        {"kind": "sprite", "name": "Dog",
         "handlers": [{"event": {"kind": "message-received", "message": "bark"}, "code": "pass"}]}
    ]
}"#;

// ---------------------------------------------------------------------------
// Focus
// ---------------------------------------------------------------------------

#[test]
fn boot_focuses_stage_and_forgets_source_map() {
    let (session, assets) = booted_from_skeleton(TWO_SPRITES);
    session.flatten(&assets).unwrap();
    assert!(!session.source_map().is_empty());

    session.boot(StructuredProgram::new_simple_example());
    let stage_id = session.with_program(|p| p.stage().id);
    assert_eq!(session.focused_actor(), stage_id);
    assert!(session.source_map().is_empty());
}

#[test]
fn delete_sprite_focuses_neighbour() {
    let (session, _) = booted_from_skeleton(TWO_SPRITES);
    let ids: Vec<_> = session.with_program(|p| p.actors().iter().map(|a| a.id).collect());

    let adjacent = session.delete_sprite(ids[1]).unwrap();
    assert_eq!(adjacent, ids[2]);
    assert_eq!(session.focused_actor(), ids[2]);

    let adjacent = session.delete_sprite(ids[2]).unwrap();
    assert_eq!(adjacent, ids[0]);
    assert_eq!(session.focused_actor(), ids[0]);

    let err = session.delete_sprite(ids[0]).unwrap_err();
    assert!(matches!(err, SessionError::Core(_)));
    assert!(!err.is_user_error());
}

// ---------------------------------------------------------------------------
// Error locations
// ---------------------------------------------------------------------------

#[test]
fn go_to_error_in_second_sprite() {
    let (session, assets) = booted_from_skeleton(TWO_SPRITES);
    let result = session.flatten(&assets).unwrap();
    assert_eq!(result.map_entries.len(), 2);

    let dog = session.with_program(|p| p.actors()[2].clone());
    let dog_entry = result.map_entries[1];
    assert_eq!(dog_entry.handler_id, dog.handlers[0].id);

    let location = session.go_to_error(dog_entry.start_line, Some(8)).unwrap();
    assert_eq!(location.location.actor_id, dog.id);
    assert_eq!(location.local_col_no, Some(0));
    assert_eq!(session.focused_actor(), dog.id);

    let cat_handler = result.map_entries[0].handler_id;
    assert!(session.acquire_warp_for_handler(cat_handler).is_none());
    assert_eq!(
        session.acquire_warp_for_handler(dog.handlers[0].id),
        Some(CursorWarpTarget {
            handler_id: dog.handlers[0].id,
            line_no: 1,
            col_no: Some(0),
        })
    );
}

#[test]
fn go_to_error_after_deleting_actor_fails() {
    let (session, assets) = booted_from_skeleton(TWO_SPRITES);
    let result = session.flatten(&assets).unwrap();
    let cat_id = result.map_entries[0].actor_id;
    session.delete_sprite(cat_id).unwrap();

    let err = session
        .go_to_error(result.map_entries[0].start_line, None)
        .unwrap_err();
    assert!(matches!(err, SessionError::Core(_)));
    assert!(!session.cursor_warp().is_pending());
}

#[test]
fn go_to_error_in_deleted_handler_fails() {
    let session = EditSession::from_program(StructuredProgram::new_simple_example());
    let result = session.flatten(&[]).unwrap();
    let entry = result.map_entries[0];
    let stage_id = session.with_program(|p| p.stage().id);

    session
        .delete_handler(HandlerDeletionDescriptor {
            actor_id: entry.actor_id,
            handler_id: entry.handler_id,
        })
        .unwrap();
    session.focus_actor(stage_id).unwrap();

    let err = session.go_to_error(entry.start_line, None).unwrap_err();
    assert!(matches!(err, SessionError::Core(_)));
    assert!(!err.is_user_error());
    assert_eq!(session.focused_actor(), stage_id);
    assert!(!session.cursor_warp().is_pending());
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[test]
fn only_one_editor_claims_the_warp() {
    let session = Arc::new(EditSession::new());
    let target_handler = HandlerId::new_random();
    session.set_cursor_warp(CursorWarpTarget {
        handler_id: target_handler,
        line_no: 4,
        col_no: None,
    });

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let session = Arc::clone(&session);
            thread::spawn(move || {
                let handler_id = if i % 2 == 0 {
                    target_handler
                } else {
                    HandlerId::new_random()
                };
                session.acquire_warp_for_handler(handler_id).is_some()
            })
        })
        .collect();

    let n_claimed = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|claimed| *claimed)
        .count();
    assert_eq!(n_claimed, 1);
}

#[test]
fn flatten_sees_consistent_program_while_editing() {
    let session = Arc::new(EditSession::new());
    let actor_id = session.add_sprite("Cat").unwrap();

    let writer = {
        let session = Arc::clone(&session);
        thread::spawn(move || {
            for _ in 0..50 {
                let change = session
                    .upsert_handler(HandlerUpsertionDescriptor {
                        actor_id,
                        action: HandlerUpsertionAction::Insert,
                        event_descriptor: EventDescriptor::Clicked,
                    })
                    .unwrap();
                let ProgramChange::ScriptUpserted { .. } = change;
            }
        })
    };

    for _ in 0..50 {
        let result = session.flatten(&[]).unwrap();
        let n_handlers = result.code_text.matches("@pytch.when_this_sprite_clicked").count();
        assert_eq!(result.map_entries.len(), n_handlers);
    }

    writer.join().unwrap();
    let result = session.flatten(&[]).unwrap();
    assert_eq!(result.map_entries.len(), 50);
}
