//! Event descriptors and the handlers bound to them.
//!
//! [`EventDescriptor`] is the closed set of events a handler can respond
//! to. Each kind has a fixed arity (0 or 1 string argument) and a fixed
//! Python decorator emitted ahead of the handler's method when the program
//! is flattened.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::HandlerId;

/// The kind of an event, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    GreenFlag,
    KeyPressed,
    MessageReceived,
    StartAsClone,
    Clicked,
}

impl EventKind {
    /// Every event kind, in the order the hat-block chooser lists them.
    pub const ALL: [EventKind; 5] = [
        EventKind::GreenFlag,
        EventKind::KeyPressed,
        EventKind::MessageReceived,
        EventKind::StartAsClone,
        EventKind::Clicked,
    ];

    /// Number of string arguments carried by events of this kind.
    pub fn arity(self) -> usize {
        match self {
            EventKind::GreenFlag | EventKind::StartAsClone | EventKind::Clicked => 0,
            EventKind::KeyPressed | EventKind::MessageReceived => 1,
        }
    }

    /// Name of the single argument, for kinds which have one.
    pub fn maybe_argument_name(self) -> Option<&'static str> {
        match self {
            EventKind::GreenFlag | EventKind::StartAsClone | EventKind::Clicked => None,
            EventKind::KeyPressed => Some("key"),
            EventKind::MessageReceived => Some("message"),
        }
    }

    /// The kebab-case tag used in serialized programs.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::GreenFlag => "green-flag",
            EventKind::KeyPressed => "key-pressed",
            EventKind::MessageReceived => "message-received",
            EventKind::StartAsClone => "start-as-clone",
            EventKind::Clicked => "clicked",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event a handler is bound to, with its payload where the kind has one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum EventDescriptor {
    GreenFlag,
    KeyPressed {
        #[serde(rename = "keyName")]
        key_name: String,
    },
    MessageReceived {
        message: String,
    },
    StartAsClone,
    Clicked,
}

impl EventDescriptor {
    /// Returns the payload-free kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            EventDescriptor::GreenFlag => EventKind::GreenFlag,
            EventDescriptor::KeyPressed { .. } => EventKind::KeyPressed,
            EventDescriptor::MessageReceived { .. } => EventKind::MessageReceived,
            EventDescriptor::StartAsClone => EventKind::StartAsClone,
            EventDescriptor::Clicked => EventKind::Clicked,
        }
    }

    /// The decorator line emitted ahead of a handler body.
    pub fn decorator(&self) -> String {
        match self {
            EventDescriptor::GreenFlag => "@pytch.when_green_flag_clicked".to_string(),
            EventDescriptor::KeyPressed { key_name } => {
                format!("@pytch.when_key_pressed(\"{}\")", key_name)
            }
            EventDescriptor::MessageReceived { message } => {
                format!("@pytch.when_I_receive(\"{}\")", message)
            }
            EventDescriptor::StartAsClone => "@pytch.when_I_start_as_a_clone".to_string(),
            EventDescriptor::Clicked => "@pytch.when_this_sprite_clicked".to_string(),
        }
    }
}

/// One event binding plus the Python code run when the event fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventHandler {
    pub id: HandlerId,
    pub event: EventDescriptor,
    #[serde(rename = "pythonCode")]
    pub python_code: String,
}

impl EventHandler {
    /// Creates a handler for `event` with a fresh ID and empty code.
    pub fn new_with_empty_code(event: EventDescriptor) -> Self {
        EventHandler {
            id: HandlerId::new_random(),
            event,
            python_code: String::new(),
        }
    }

    /// Creates a handler for `event` with a fresh ID and the given code.
    pub fn new_with_code(event: EventDescriptor, python_code: impl Into<String>) -> Self {
        EventHandler {
            python_code: python_code.into(),
            ..EventHandler::new_with_empty_code(event)
        }
    }
}
