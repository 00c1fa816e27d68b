//! Store error types.

use guildlink_types::{GameId, PlatformId};
use thiserror::Error;

/// Failures surfaced by the identity store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Another member record already holds the claimed game identity.
    #[error("game identity {game_id} is already claimed by {holder}")]
    ClaimConflict { game_id: GameId, holder: PlatformId },

    /// No member record for the given platform identity.
    #[error("no member record for {0}")]
    UnknownMember(PlatformId),

    /// No warning record with the given id for the member.
    #[error("no warning record {0}")]
    UnknownWarning(i64),

    /// The backing database failed.
    #[error("store backend error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
