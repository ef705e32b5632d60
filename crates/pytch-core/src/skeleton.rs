//! ID-free program templates.
//!
//! A skeleton describes actors, handlers and declared assets without any
//! identifiers. Embodying it (see
//! [`StructuredProgram::from_skeleton`](crate::program::StructuredProgram::from_skeleton))
//! mints fresh IDs for everything and tells an [`EmbodyContext`] about each
//! declared asset so the asset can be stored under the new actor's ID.

use serde::{Deserialize, Serialize};

use crate::actor::ActorKind;
use crate::error::CoreError;
use crate::event::EventDescriptor;
use crate::id::ActorId;

/// An asset declared by a skeleton actor, named by its file basename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDescriptor {
    #[serde(rename = "fileBasename")]
    pub file_basename: String,
}

/// A handler without an ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoIdEventHandler {
    pub event: EventDescriptor,
    #[serde(rename = "pythonCode", alias = "code", default)]
    pub python_code: String,
}

/// An actor without IDs, along with the assets it declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoIdActor {
    pub kind: ActorKind,
    pub name: String,
    #[serde(default)]
    pub handlers: Vec<NoIdEventHandler>,
    #[serde(default)]
    pub assets: Vec<AssetDescriptor>,
}

/// A whole program without IDs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoIdsStructuredProject {
    pub actors: Vec<NoIdActor>,
}

impl NoIdsStructuredProject {
    /// Parses a skeleton from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Collaborator told about every asset a skeleton declares.
///
/// Called once per declared asset, after the owning actor's ID has been
/// minted, so the implementation can store the asset under
/// `"<actorId>/<basename>"`.
pub trait EmbodyContext {
    fn register_actor_asset(&mut self, actor_id: ActorId, basename: &str)
        -> Result<(), CoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_skeleton_json() {
        let json = r#"{
            "actors": [
                {"kind": "stage", "name": "Stage", "handlers": [],
                 "assets": [{"fileBasename": "sky.png"}]},
                {"kind": "sprite", "name": "Cat",
                 "handlers": [
                    {"event": {"kind": "clicked"}, "pythonCode": "self.hide()"},
                    {"event": {"kind": "key-pressed", "keyName": "a"}, "code": "pass"}
                 ]}
            ]
        }"#;

        let skeleton = NoIdsStructuredProject::from_json(json).unwrap();
        assert_eq!(skeleton.actors.len(), 2);
        assert_eq!(skeleton.actors[0].kind, ActorKind::Stage);
        assert_eq!(skeleton.actors[0].assets[0].file_basename, "sky.png");

        let cat = &skeleton.actors[1];
        assert!(cat.assets.is_empty());
        assert_eq!(cat.handlers[0].python_code, "self.hide()");
        assert_eq!(cat.handlers[1].python_code, "pass");
        assert_eq!(
            cat.handlers[1].event,
            EventDescriptor::KeyPressed {
                key_name: "a".into()
            }
        );
    }

    #[test]
    fn rejects_unknown_actor_kind() {
        let json = r#"{"actors": [{"kind": "backdrop", "name": "X"}]}"#;
        assert!(NoIdsStructuredProject::from_json(json).is_err());
    }
}
