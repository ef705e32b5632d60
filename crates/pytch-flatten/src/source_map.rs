//! Correspondence between lines of the flattened program and handler code.
//!
//! Each [`SourceMapEntry`] marks where one handler's code starts in the
//! flattened text; only the start line is recorded, and the chunk runs until
//! the next entry. Entries must be strictly increasing, which lets
//! [`SourceMap::local_from_global`] binary-search them.

use serde::{Deserialize, Serialize};

use pytch_core::{ActorId, HandlerId};

use crate::error::SourceMapError;

/// Start of one handler's code within the flattened program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMapEntry {
    /// One-based line number of the handler's first line of code, counted
    /// the way interpreter tracebacks count them.
    pub start_line: usize,
    pub actor_id: ActorId,
    pub handler_id: HandlerId,
}

/// A line of code within a particular handler of a particular actor, as a
/// zero-based index into that handler's lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationWithinHandler {
    pub actor_id: ActorId,
    pub handler_id: HandlerId,
    pub line_within_handler: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMap {
    entries: Vec<SourceMapEntry>,
}

fn check_strictly_increasing(entries: &[SourceMapEntry]) -> Result<(), SourceMapError> {
    for (index, pair) in entries.windows(2).enumerate() {
        if pair[1].start_line <= pair[0].start_line {
            return Err(SourceMapError::NotStrictlyIncreasing {
                index: index + 1,
                previous: pair[0].start_line,
                start_line: pair[1].start_line,
            });
        }
    }
    Ok(())
}

impl SourceMap {
    /// Creates an empty source map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source map holding `entries`.
    pub fn from_entries(entries: Vec<SourceMapEntry>) -> Result<Self, SourceMapError> {
        let mut map = SourceMap::new();
        map.set_entries(entries)?;
        Ok(map)
    }

    /// Replaces all entries. On error the previous entries are kept.
    pub fn set_entries(&mut self, entries: Vec<SourceMapEntry>) -> Result<(), SourceMapError> {
        check_strictly_increasing(&entries)?;
        self.entries = entries;
        Ok(())
    }

    /// Drops all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[SourceMapEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves a line of the flattened program to a line within a handler.
    ///
    /// Uses the entry with the greatest start line not after `line`. Lines
    /// past the end of the last handler still resolve to that handler; the
    /// flattened program has nothing after its last handler.
    pub fn local_from_global(&self, line: usize) -> Result<LocationWithinHandler, SourceMapError> {
        let first = self.entries.first().ok_or(SourceMapError::Empty)?;

        let n_at_or_before = self.entries.partition_point(|e| e.start_line <= line);
        if n_at_or_before == 0 {
            return Err(SourceMapError::BeforeFirstHandler {
                line,
                first_start_line: first.start_line,
            });
        }

        let entry = &self.entries[n_at_or_before - 1];
        Ok(LocationWithinHandler {
            actor_id: entry.actor_id,
            handler_id: entry.handler_id,
            line_within_handler: line - entry.start_line,
        })
    }

    /// Returns the line of the flattened program holding the given line of
    /// the given handler, if that handler was flattened.
    pub fn global_from_local(&self, handler_id: HandlerId, line_within_handler: usize) -> Option<usize> {
        self.entries
            .iter()
            .find(|e| e.handler_id == handler_id)
            .map(|e| e.start_line + line_within_handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(start_line: usize) -> SourceMapEntry {
        SourceMapEntry {
            start_line,
            actor_id: ActorId::new_random(),
            handler_id: HandlerId::new_random(),
        }
    }

    #[test]
    fn resolves_to_greatest_start_not_after_line() {
        let entries = vec![entry(7), entry(12), entry(20)];
        let map = SourceMap::from_entries(entries.clone()).unwrap();

        let loc = map.local_from_global(7).unwrap();
        assert_eq!(loc.handler_id, entries[0].handler_id);
        assert_eq!(loc.line_within_handler, 0);

        let loc = map.local_from_global(15).unwrap();
        assert_eq!(loc.handler_id, entries[1].handler_id);
        assert_eq!(loc.actor_id, entries[1].actor_id);
        assert_eq!(loc.line_within_handler, 3);

        let loc = map.local_from_global(25).unwrap();
        assert_eq!(loc.handler_id, entries[2].handler_id);
        assert_eq!(loc.line_within_handler, 5);
    }

    #[test]
    fn lines_before_first_entry_are_errors() {
        let map = SourceMap::from_entries(vec![entry(7)]).unwrap();
        assert_eq!(
            map.local_from_global(3).unwrap_err(),
            SourceMapError::BeforeFirstHandler {
                line: 3,
                first_start_line: 7
            }
        );
        assert_eq!(
            SourceMap::new().local_from_global(3).unwrap_err(),
            SourceMapError::Empty
        );
    }

    #[test]
    fn rejects_non_increasing_entries() {
        let err = SourceMap::from_entries(vec![entry(7), entry(7)]).unwrap_err();
        assert!(matches!(
            err,
            SourceMapError::NotStrictlyIncreasing { index: 1, .. }
        ));
        assert!(SourceMap::from_entries(vec![entry(9), entry(4)]).is_err());
    }

    #[test]
    fn failed_set_keeps_previous_entries() {
        let good = vec![entry(5), entry(9)];
        let mut map = SourceMap::from_entries(good.clone()).unwrap();
        assert!(map.set_entries(vec![entry(9), entry(5)]).is_err());
        assert_eq!(map.entries(), good.as_slice());

        map.clear();
        assert!(map.is_empty());
    }

    #[test]
    fn global_from_local_inverts_lookup() {
        let entries = vec![entry(7), entry(12)];
        let map = SourceMap::from_entries(entries.clone()).unwrap();
        let global = map.global_from_local(entries[1].handler_id, 2).unwrap();
        assert_eq!(global, 14);
        let back = map.local_from_global(global).unwrap();
        assert_eq!(back.handler_id, entries[1].handler_id);
        assert_eq!(back.line_within_handler, 2);

        assert!(map.global_from_local(HandlerId::new_random(), 0).is_none());
    }
}
