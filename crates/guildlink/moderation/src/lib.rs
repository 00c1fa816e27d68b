//! Moderation Ledger.
//!
//! Warnings with time decay, the watchlist, and ban records reconciled
//! against the platform's authoritative ban set.

#![deny(unsafe_code)]

mod bans;
mod error;
mod warnings;
mod watchlist;

pub use bans::BanService;
pub use error::ModerationError;
pub use warnings::{WarningOutcome, WarningService, WARNING_RETENTION_DAYS};
pub use watchlist::WatchlistService;
