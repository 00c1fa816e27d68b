//! Workflow error types.
//!
//! Business failures are terminal and surfaced verbatim; store and roster
//! failures are soft failures with state unchanged.

use guildlink_roster::RosterError;
use guildlink_store::StoreError;
use guildlink_types::{GameId, InvalidBirthday, PlatformId};
use thiserror::Error;

/// Failures of the linking operations.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The claimed identity is absent from the roster snapshot.
    #[error("{0} was not found in the roster")]
    NotFoundInRoster(String),

    /// Another member record holds the claimed identity.
    #[error("game identity {game_id} is already linked to {holder}")]
    ConflictingClaim { game_id: GameId, holder: PlatformId },

    /// Every requested value already matches the current one.
    #[error("the requested values match the current assignment")]
    NoChange,

    /// No member record for the target.
    #[error("no member record for {0}")]
    UnknownMember(PlatformId),

    /// The roster could not be fetched; nothing was written.
    #[error(transparent)]
    Upstream(#[from] RosterError),

    /// The store failed; nothing was written.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<StoreError> for LinkError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ClaimConflict { game_id, holder } => {
                LinkError::ConflictingClaim { game_id, holder }
            }
            StoreError::UnknownMember(id) => LinkError::UnknownMember(id),
            other => LinkError::StoreUnavailable(other.to_string()),
        }
    }
}

/// Failures of the member profile operations.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("no member record matches {0}")]
    UnknownMember(String),

    #[error(transparent)]
    InvalidBirthday(#[from] InvalidBirthday),

    #[error(transparent)]
    Upstream(#[from] RosterError),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<StoreError> for ProfileError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UnknownMember(id) => ProfileError::UnknownMember(id.to_string()),
            other => ProfileError::StoreUnavailable(other.to_string()),
        }
    }
}
