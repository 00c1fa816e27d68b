//! Moderation error types.

use guildlink_store::StoreError;
use guildlink_types::GatewayError;
use thiserror::Error;

/// Failures of the moderation ledger operations.
#[derive(Debug, Error)]
pub enum ModerationError {
    /// No member record matches the given identifier.
    #[error("no member record matches {0}")]
    UnknownMember(String),

    /// The 1-based ordinal is outside `[1, count]`.
    #[error("warning ordinal {given} is out of range (member has {count})")]
    InvalidOrdinal { given: usize, count: usize },

    /// Clearing a member who is not listed.
    #[error("{0} is not on the watchlist")]
    NotOnWatchlist(String),

    /// The platform's authoritative ban set could not be read.
    #[error("platform unavailable: {0}")]
    PlatformUnavailable(String),

    /// The store failed; nothing was written.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<StoreError> for ModerationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UnknownMember(id) => ModerationError::UnknownMember(id.to_string()),
            other => ModerationError::StoreUnavailable(other.to_string()),
        }
    }
}

impl From<GatewayError> for ModerationError {
    fn from(err: GatewayError) -> Self {
        ModerationError::PlatformUnavailable(err.to_string())
    }
}
