//! Stable ID newtypes for program entities.
//!
//! Actors and handlers are identified by distinct newtype wrappers over a
//! random UUID, so an `ActorId` cannot be accidentally used where a
//! `HandlerId` is expected. IDs are minted when an entity is created and
//! never reused or mutated afterwards.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Actor (stage or sprite) identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub Uuid);

/// Event-handler identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandlerId(pub Uuid);

impl ActorId {
    /// Creates and returns a new random `ActorId`.
    pub fn new_random() -> Self {
        ActorId(Uuid::new_v4())
    }
}

impl HandlerId {
    /// Creates and returns a new random `HandlerId`.
    pub fn new_random() -> Self {
        HandlerId(Uuid::new_v4())
    }
}

// Display implementations -- hyphenated UUID form, which is also the form
// used as the directory component of asset names.

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ActorId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(ActorId)
    }
}

impl FromStr for HandlerId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(HandlerId)
    }
}

/// Returns `true` iff the two slices hold the same IDs in the same order.
pub fn eq_arrays<T: PartialEq>(x: &[T], y: &[T]) -> bool {
    x.len() == y.len() && x.iter().zip(y).all(|(a, b)| a == b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_are_distinct() {
        let a = ActorId::new_random();
        let b = ActorId::new_random();
        assert_ne!(a, b);
        assert_ne!(HandlerId::new_random(), HandlerId::new_random());
    }

    #[test]
    fn eq_arrays_is_order_and_length_sensitive() {
        let xs = vec![
            HandlerId::new_random(),
            HandlerId::new_random(),
            HandlerId::new_random(),
        ];
        let ys = xs.clone();
        assert!(eq_arrays(&xs, &ys));
        assert!(!eq_arrays(&xs[..2], &xs));

        let mut zs = xs.clone();
        zs[2] = HandlerId::new_random();
        assert!(!eq_arrays(&zs, &xs));

        let mut swapped = xs.clone();
        swapped.swap(0, 1);
        assert!(!eq_arrays(&swapped, &xs));
    }

    #[test]
    fn display_and_parse_agree() {
        let id = ActorId::new_random();
        let back: ActorId = id.to_string().parse().unwrap();
        assert_eq!(id, back);
        assert!("not-a-uuid".parse::<HandlerId>().is_err());
    }

    #[test]
    fn serde_is_transparent() {
        let id = HandlerId(Uuid::from_u128(7));
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
        let back: HandlerId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
