//! Single-slot mailbox for pending cursor moves.
//!
//! A "go to this error" request may name a handler whose editor does not
//! exist yet. The request is parked in a [`PendingCursorWarp`]; each handler
//! editor, as it is created, asks for a warp addressed to its own handler,
//! and only the matching one receives it.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use pytch_core::HandlerId;

/// Where to put the cursor, within one handler's code.
///
/// `line_no` is one-based, as editors number lines; `col_no` is the column
/// within the handler's own code, if known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorWarpTarget {
    pub handler_id: HandlerId,
    pub line_no: usize,
    pub col_no: Option<usize>,
}

#[derive(Debug, Default)]
pub struct PendingCursorWarp {
    slot: Mutex<Option<CursorWarpTarget>>,
}

impl PendingCursorWarp {
    pub fn new() -> Self {
        Self::default()
    }

    // The slot holds plain data, so a panic elsewhere cannot leave it
    // half-written.
    fn slot(&self) -> MutexGuard<'_, Option<CursorWarpTarget>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Parks `target`, replacing any unclaimed target.
    pub fn set(&self, target: CursorWarpTarget) {
        let mut slot = self.slot();
        if let Some(existing) = slot.as_ref() {
            tracing::warn!(
                existing_handler = %existing.handler_id,
                new_handler = %target.handler_id,
                "replacing unclaimed cursor warp"
            );
        }
        *slot = Some(target);
    }

    /// Takes the pending target if it is for `handler_id`. Otherwise leaves
    /// the slot untouched and returns `None`.
    pub fn acquire_if_for_handler(&self, handler_id: HandlerId) -> Option<CursorWarpTarget> {
        let mut slot = self.slot();
        let is_for_handler = slot.as_ref().map_or(false, |t| t.handler_id == handler_id);
        if is_for_handler {
            slot.take()
        } else {
            None
        }
    }

    /// Removes and returns the pending target, whichever handler it is for.
    pub fn take(&self) -> Option<CursorWarpTarget> {
        self.slot().take()
    }

    /// The pending target, without claiming it.
    pub fn peek(&self) -> Option<CursorWarpTarget> {
        *self.slot()
    }

    pub fn is_pending(&self) -> bool {
        self.slot().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target_for(handler_id: HandlerId) -> CursorWarpTarget {
        CursorWarpTarget {
            handler_id,
            line_no: 3,
            col_no: Some(4),
        }
    }

    #[test]
    fn matching_handler_takes_target_once() {
        let warp = PendingCursorWarp::new();
        let h = HandlerId::new_random();
        warp.set(target_for(h));

        assert_eq!(warp.acquire_if_for_handler(h), Some(target_for(h)));
        assert_eq!(warp.acquire_if_for_handler(h), None);
        assert!(!warp.is_pending());
    }

    #[test]
    fn other_handler_does_not_clear_target() {
        let warp = PendingCursorWarp::new();
        let h = HandlerId::new_random();
        warp.set(target_for(h));

        assert_eq!(warp.acquire_if_for_handler(HandlerId::new_random()), None);
        assert_eq!(warp.peek(), Some(target_for(h)));
        assert_eq!(warp.acquire_if_for_handler(h), Some(target_for(h)));
    }

    #[test]
    fn later_set_wins() {
        let warp = PendingCursorWarp::new();
        let (h1, h2) = (HandlerId::new_random(), HandlerId::new_random());
        warp.set(target_for(h1));
        warp.set(target_for(h2));

        assert_eq!(warp.acquire_if_for_handler(h1), None);
        assert_eq!(warp.acquire_if_for_handler(h2), Some(target_for(h2)));
    }

    #[test]
    fn empty_slot_yields_nothing() {
        let warp = PendingCursorWarp::new();
        assert_eq!(warp.acquire_if_for_handler(HandlerId::new_random()), None);
        assert_eq!(warp.peek(), None);
    }

    #[test]
    fn target_json_shape() {
        let h = HandlerId::new_random();
        let json = serde_json::to_value(CursorWarpTarget {
            handler_id: h,
            line_no: 2,
            col_no: None,
        })
        .unwrap();
        assert_eq!(json["handlerId"], h.to_string());
        assert_eq!(json["lineNo"], 2);
        assert!(json["colNo"].is_null());
    }
}
