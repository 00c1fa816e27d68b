//! Runtime assembly errors.

use guildlink_roster::RosterError;
use guildlink_store::StoreError;
use thiserror::Error;

/// Failures while assembling or running the engine.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("roster client error: {0}")]
    Roster(#[from] RosterError),
}
