//! Identity Store: persistence for member, warning, ban, and application
//! records.
//!
//! The store is the serialization point for the cross-record uniqueness
//! invariant: `commit_link` re-checks claimants and writes in one
//! transaction, so of two concurrent conflicting claims exactly one commits.

#![deny(unsafe_code)]

mod error;
mod memory;
mod sqlite;
mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryIdentityStore;
pub use sqlite::SqliteIdentityStore;
pub use traits::{
    ApplicationStore, BanStore, IdentityStore, LinkWrite, MemberStore, WarningStore,
};
