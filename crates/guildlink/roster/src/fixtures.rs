//! Roster fakes shared by workflow tests.

use crate::{RosterError, RosterSource};
use async_trait::async_trait;
use guildlink_types::{Roster, RosterEntry};

/// A fixed roster snapshot.
#[derive(Debug, Clone, Default)]
pub struct StaticRoster {
    entries: Vec<RosterEntry>,
}

impl StaticRoster {
    pub fn with_entries(entries: Vec<RosterEntry>) -> Self {
        Self { entries }
    }

    /// Entries with rank `Member` and no join date.
    pub fn with_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: names
                .into_iter()
                .map(|name| RosterEntry {
                    name: name.into(),
                    rank: "Member".to_string(),
                    joined: None,
                })
                .collect(),
        }
    }
}

#[async_trait]
impl RosterSource for StaticRoster {
    async fn fetch(&self) -> Result<Roster, RosterError> {
        Ok(Roster::new(self.entries.clone()))
    }
}

/// Always fails, as an exhausted upstream would.
#[derive(Debug, Default)]
pub struct UnavailableRoster;

#[async_trait]
impl RosterSource for UnavailableRoster {
    async fn fetch(&self) -> Result<Roster, RosterError> {
        Err(RosterError::Exhausted {
            attempts: 3,
            last: "roster returned status 503".to_string(),
        })
    }
}
