//! Intake error types.

use guildlink_store::StoreError;
use thiserror::Error;

/// Failures of the application intake operations.
#[derive(Debug, Error)]
pub enum IntakeError {
    /// The submitter has no linked game identity.
    #[error("a linked game identity is required before applying")]
    IdentityRequired,

    /// Stage two arrived without staged stage-one answers (never staged,
    /// already consumed, or expired).
    #[error("stage-one answers are missing or expired")]
    StageOneMissing,

    /// No application record with the given id.
    #[error("no application record {0}")]
    NotFound(i64),

    /// The store failed; nothing was written.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<StoreError> for IntakeError {
    fn from(err: StoreError) -> Self {
        IntakeError::StoreUnavailable(err.to_string())
    }
}
