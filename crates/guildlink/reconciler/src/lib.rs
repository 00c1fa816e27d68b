//! Reconciliation Engine.
//!
//! A single-flight background job that provisions and prunes member records
//! against the community's membership, resyncs roster status fields, sweeps
//! celebratory roles, and produces the on-demand crosscheck report.

#![deny(unsafe_code)]

mod crosscheck;
mod engine;
mod error;
mod schedule;

pub use crosscheck::{CrosscheckConfig, CrosscheckReport};
pub use engine::{CycleReport, Reconciler};
pub use error::ReconcileError;
pub use schedule::next_run_delay;
