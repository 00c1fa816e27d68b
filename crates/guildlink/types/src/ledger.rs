//! Moderation ledger records: warnings and bans.

use crate::ids::PlatformId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single issued warning. Warnings decay: records older than the retention
/// window are purged whenever a new warning is added for the same member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningRecord {
    pub id: i64,
    pub member: PlatformId,
    pub reason: String,
    pub issued_at: DateTime<Utc>,
}

/// Escalation tier selected from the post-purge warning total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningTier {
    First,
    Second,
    Final,
}

impl WarningTier {
    pub fn from_total(total: u32) -> Self {
        match total {
            0 | 1 => WarningTier::First,
            2 => WarningTier::Second,
            _ => WarningTier::Final,
        }
    }
}

/// A recorded ban, keyed by platform identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BanRecord {
    pub platform_id: PlatformId,
    pub reason: String,
    pub recorded_at: DateTime<Utc>,
}
