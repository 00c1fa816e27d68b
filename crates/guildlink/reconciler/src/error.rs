//! Reconciliation error types.

use guildlink_roster::RosterError;
use guildlink_store::StoreError;
use guildlink_types::GatewayError;
use thiserror::Error;

/// Failures of the reconciliation engine.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A cycle is already in flight; the engine never runs concurrently
    /// with itself.
    #[error("a reconciliation cycle is already running")]
    AlreadyRunning,

    /// The community membership could not be read; the cycle aborts before
    /// any mutation.
    #[error("platform unavailable: {0}")]
    PlatformUnavailable(String),

    /// The roster could not be fetched for a read-only report.
    #[error(transparent)]
    UpstreamUnavailable(#[from] RosterError),

    /// The store failed mid-cycle.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<GatewayError> for ReconcileError {
    fn from(err: GatewayError) -> Self {
        ReconcileError::PlatformUnavailable(err.to_string())
    }
}

impl From<StoreError> for ReconcileError {
    fn from(err: StoreError) -> Self {
        ReconcileError::StoreUnavailable(err.to_string())
    }
}
