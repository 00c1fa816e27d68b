//! Member records: per-person linkage and status state.

use crate::ids::{GameId, PlatformId, Slot};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Whether a linked game identity is currently part of the external roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MembershipStatus {
    Member,
    #[default]
    None,
}

impl MembershipStatus {
    /// Stored representation: `Member` or the `-` sentinel.
    pub fn as_str(self) -> &'static str {
        match self {
            MembershipStatus::Member => "Member",
            MembershipStatus::None => "-",
        }
    }

    pub fn from_store(value: &str) -> Self {
        if value == "Member" {
            MembershipStatus::Member
        } else {
            MembershipStatus::None
        }
    }
}

impl fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One game-identity slot on a member record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SlotState {
    /// `None` when the slot is unlinked (stored as a sentinel).
    pub game_id: Option<GameId>,
    pub status: MembershipStatus,
}

impl SlotState {
    pub fn linked(game_id: GameId, status: MembershipStatus) -> Self {
        Self {
            game_id: Some(game_id),
            status,
        }
    }

    pub fn unlinked() -> Self {
        Self::default()
    }

    /// Case-insensitive test against a roster name.
    pub fn holds(&self, name: &str) -> bool {
        self.game_id.as_ref().is_some_and(|id| id.matches(name))
    }
}

/// A member's birthday, stored as `dd.mm.yyyy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Birthday {
    pub day: u32,
    pub month: u32,
    pub year: i32,
}

/// Rejected birthday input.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid birthday {day:02}.{month:02}.{year}")]
pub struct InvalidBirthday {
    pub day: u32,
    pub month: u32,
    pub year: i32,
}

impl Birthday {
    /// Validates day 1-31, month 1-12, year 1900..=current year.
    pub fn new(day: u32, month: u32, year: i32) -> Result<Self, InvalidBirthday> {
        let current_year = Utc::now().year();
        if (1..=31).contains(&day) && (1..=12).contains(&month) && (1900..=current_year).contains(&year)
        {
            Ok(Self { day, month, year })
        } else {
            Err(InvalidBirthday { day, month, year })
        }
    }

    /// Parses the stored `dd.mm.yyyy` form; returns `None` for sentinels and
    /// malformed values.
    pub fn parse(value: &str) -> Option<Self> {
        let date = NaiveDate::parse_from_str(value, "%d.%m.%Y").ok()?;
        Some(Self {
            day: date.day(),
            month: date.month(),
            year: date.year(),
        })
    }

    /// Day-and-month match used by the celebratory sweep.
    pub fn is_on(&self, date: NaiveDate) -> bool {
        self.day == date.day() && self.month == date.month()
    }
}

impl fmt::Display for Birthday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}.{:02}.{}", self.day, self.month, self.year)
    }
}

/// Per-person linkage and moderation state, keyed by platform identity.
///
/// The store enforces uniqueness: a non-sentinel game identity appears as
/// main or alt of at most one record, case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRecord {
    pub platform_id: PlatformId,
    pub main: SlotState,
    pub alt: SlotState,
    /// `None` when the member is not on the watchlist.
    pub watchlist_reason: Option<String>,
    /// Mirrors the number of stored warning records for this member.
    pub warning_count: u32,
    pub last_warning_at: Option<DateTime<Utc>>,
    pub birthday: Option<Birthday>,
}

impl MemberRecord {
    /// A freshly provisioned record with sentinel identity values.
    pub fn provisioned(platform_id: PlatformId) -> Self {
        Self {
            platform_id,
            main: SlotState::unlinked(),
            alt: SlotState::unlinked(),
            watchlist_reason: None,
            warning_count: 0,
            last_warning_at: None,
            birthday: None,
        }
    }

    pub fn slot(&self, slot: Slot) -> &SlotState {
        match slot {
            Slot::Main => &self.main,
            Slot::Alt => &self.alt,
        }
    }

    pub fn slot_mut(&mut self, slot: Slot) -> &mut SlotState {
        match slot {
            Slot::Main => &mut self.main,
            Slot::Alt => &mut self.alt,
        }
    }

    /// Which slot, if any, holds `name` (case-insensitive).
    pub fn holding_slot(&self, name: &str) -> Option<Slot> {
        if self.main.holds(name) {
            Some(Slot::Main)
        } else if self.alt.holds(name) {
            Some(Slot::Alt)
        } else {
            None
        }
    }

    /// A member counts as linked once the main slot carries an identity.
    pub fn is_linked(&self) -> bool {
        self.main.game_id.is_some()
    }

    pub fn on_watchlist(&self) -> bool {
        self.watchlist_reason.is_some()
    }
}
