//! Roster snapshots fetched from the external membership list.
//!
//! Entries are never persisted; a `Roster` is a comparison snapshot taken at
//! fetch time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One member of the external game-account roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub name: String,
    pub rank: String,
    /// Join date as reported upstream, when present.
    pub joined: Option<DateTime<Utc>>,
}

/// A fetched roster snapshot with case-insensitive lookups.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    entries: Vec<RosterEntry>,
}

impl Roster {
    pub fn new(entries: Vec<RosterEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Exact name match, ignoring case; returns the canonical entry.
    pub fn find(&self, name: &str) -> Option<&RosterEntry> {
        self.entries
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Lowercased name set for bulk membership tests.
    pub fn normalized_names(&self) -> HashSet<String> {
        self.entries
            .iter()
            .map(|entry| entry.name.to_ascii_lowercase())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Roster {
        Roster::new(vec![RosterEntry {
            name: "Foo.1234".into(),
            rank: "Member".into(),
            joined: None,
        }])
    }

    #[test]
    fn test_find_is_case_insensitive_and_canonical() {
        let r = roster();
        let entry = r.find("FOO.1234").unwrap();
        assert_eq!(entry.name, "Foo.1234");
        assert!(r.find("missing.0000").is_none());
    }
}
