//! Roster Source client.
//!
//! Read-only accessor to the external authoritative membership list. The
//! HTTP client wraps every fetch in bounded retry with exponential backoff;
//! exhaustion is a soft failure the calling workflow surfaces without
//! partial writes.

#![deny(unsafe_code)]

mod client;
pub mod fixtures;

pub use client::{HttpRosterSource, RetryPolicy};

use async_trait::async_trait;
use guildlink_types::Roster;
use thiserror::Error;

/// Failures fetching the roster.
#[derive(Debug, Error)]
pub enum RosterError {
    /// The request never produced a response.
    #[error("roster transport error: {0}")]
    Transport(String),

    /// Any non-success response is a hard failure for the caller.
    #[error("roster returned status {0}")]
    Status(u16),

    /// The response body did not decode.
    #[error("roster payload malformed: {0}")]
    Malformed(String),

    /// Bounded retry ran out of attempts.
    #[error("roster unavailable after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: String },
}

/// The external authoritative membership list.
#[async_trait]
pub trait RosterSource: Send + Sync {
    /// Fetch a fresh roster snapshot.
    async fn fetch(&self) -> Result<Roster, RosterError>;
}
