//! Change notifications emitted by program mutations.

use serde::{Deserialize, Serialize};

use crate::id::HandlerId;

/// Whether a handler upsert created a new handler or changed an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertKind {
    Insert,
    Update,
}

/// A structural change observers may want to react to, e.g. by scrolling
/// a freshly inserted script into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ProgramChange {
    ScriptUpserted {
        #[serde(rename = "upsertKind")]
        upsert_kind: UpsertKind,
        #[serde(rename = "handlerId")]
        handler_id: HandlerId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn script_upserted_json_shape() {
        let change = ProgramChange::ScriptUpserted {
            upsert_kind: UpsertKind::Insert,
            handler_id: HandlerId(Uuid::nil()),
        };
        let json = serde_json::to_value(change).unwrap();
        assert_eq!(json["kind"], "script-upserted");
        assert_eq!(json["upsertKind"], "insert");
    }

    #[test]
    fn equality_compares_all_fields() {
        let id = HandlerId::new_random();
        let a = ProgramChange::ScriptUpserted {
            upsert_kind: UpsertKind::Insert,
            handler_id: id,
        };
        let b = ProgramChange::ScriptUpserted {
            upsert_kind: UpsertKind::Update,
            handler_id: id,
        };
        assert_eq!(a, a);
        assert_ne!(a, b);
    }
}
