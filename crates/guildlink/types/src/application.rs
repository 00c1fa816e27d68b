//! Application records: immutable snapshots of the two-stage intake survey.

use crate::ids::{GameId, PlatformId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stage-one answers, collected before the staging break.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageOneAnswers {
    pub joined_how: String,
    pub timezone: String,
    pub has_commander_tag: String,
}

/// Stage-two answers; the last two questions are optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTwoAnswers {
    pub content_preference: String,
    pub has_led_event: String,
    pub event_interest: Option<String>,
    pub changes_suggested: Option<String>,
}

/// Payload for persisting a completed application.
#[derive(Debug, Clone)]
pub struct ApplicationDraft {
    pub platform_id: PlatformId,
    /// Game identity at submission time; later relinks do not rewrite it.
    pub game_id: GameId,
    pub stage_one: StageOneAnswers,
    pub stage_two: StageTwoAnswers,
}

/// A persisted application, keyed by an increasing id. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: i64,
    pub submitted_at: DateTime<Utc>,
    pub platform_id: PlatformId,
    pub game_id: GameId,
    pub stage_one: StageOneAnswers,
    pub stage_two: StageTwoAnswers,
}
