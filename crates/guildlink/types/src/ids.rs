//! Identifiers for community members and game accounts.
//!
//! Both identifiers are opaque strings wrapped in newtypes for type safety.
//! Game identities compare case-insensitively everywhere (the roster is the
//! only source of canonical casing), so `GameId` offers `matches` instead of
//! leaning on `PartialEq` for lookups.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a community (platform) member.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlatformId(String);

impl PlatformId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A game-account identity as reported by the roster, e.g. `Example.1234`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against another identity string.
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }

    /// Lowercased form, used as the key in claim and crosscheck sets.
    pub fn normalized(&self) -> String {
        self.0.to_ascii_lowercase()
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two game-identity associations a member record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Main,
    Alt,
}

impl Slot {
    pub fn opposite(self) -> Self {
        match self {
            Slot::Main => Slot::Alt,
            Slot::Alt => Slot::Main,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Main => write!(f, "main"),
            Slot::Alt => write!(f, "alt"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_id_matches_ignores_case() {
        let id = GameId::new("Example.1234");
        assert!(id.matches("example.1234"));
        assert!(id.matches("EXAMPLE.1234"));
        assert!(!id.matches("Other.1234"));
    }

    #[test]
    fn test_slot_opposite_is_involutive() {
        assert_eq!(Slot::Main.opposite(), Slot::Alt);
        assert_eq!(Slot::Main.opposite().opposite(), Slot::Main);
    }
}
