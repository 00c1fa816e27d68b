//! Application Intake.
//!
//! Stage-one answers are held in an ephemeral, TTL-evicting staging store
//! scoped by submitter; stage two merges them into one immutable
//! application record. Abandoned stage-one submissions expire instead of
//! accumulating.

#![deny(unsafe_code)]

mod error;
mod service;
mod staging;

pub use error::IntakeError;
pub use service::IntakeService;
pub use staging::{StagingStore, DEFAULT_STAGING_TTL};
