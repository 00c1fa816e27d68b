//! Storage interfaces for the four persisted tables.

use crate::StoreResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use guildlink_types::{
    ApplicationDraft, ApplicationRecord, BanRecord, Birthday, MemberRecord, MembershipStatus,
    PlatformId, SlotState, WarningRecord,
};
use std::collections::HashSet;

/// A pending slot write. `None` preserves the slot's current value; a swap
/// writes both slots in one call so the exchange is atomic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkWrite {
    pub main: Option<SlotState>,
    pub alt: Option<SlotState>,
}

impl LinkWrite {
    pub fn is_empty(&self) -> bool {
        self.main.is_none() && self.alt.is_none()
    }
}

/// Storage interface for member records.
#[async_trait]
pub trait MemberStore: Send + Sync {
    /// Create a sentinel record if none exists; returns the current record.
    async fn ensure_member(&self, platform_id: &PlatformId) -> StoreResult<MemberRecord>;

    async fn get_member(&self, platform_id: &PlatformId) -> StoreResult<Option<MemberRecord>>;

    /// Lookup by platform identity first, then by main, then by alt game
    /// identity (case-insensitive).
    async fn resolve_member(&self, identifier: &str) -> StoreResult<Option<MemberRecord>>;

    async fn list_members(&self) -> StoreResult<Vec<MemberRecord>>;

    /// Delete a record, cascading its warning records. Returns whether a
    /// record existed.
    async fn delete_member(&self, platform_id: &PlatformId) -> StoreResult<bool>;

    /// Atomically re-check the uniqueness invariant and apply the slot
    /// write. Fails `ClaimConflict` when any written identity is held by
    /// another record at commit time; no mutation occurs in that case.
    async fn commit_link(
        &self,
        platform_id: &PlatformId,
        write: LinkWrite,
    ) -> StoreResult<MemberRecord>;

    /// Reconciliation status resync for one record.
    async fn set_statuses(
        &self,
        platform_id: &PlatformId,
        main: MembershipStatus,
        alt: MembershipStatus,
    ) -> StoreResult<()>;

    async fn set_birthday(
        &self,
        platform_id: &PlatformId,
        birthday: Option<Birthday>,
    ) -> StoreResult<()>;

    /// `None` clears the watchlist entry.
    async fn set_watchlist(
        &self,
        platform_id: &PlatformId,
        reason: Option<String>,
    ) -> StoreResult<()>;

    /// All claimed game identities, lowercased, sentinels excluded.
    async fn claimed_game_ids(&self) -> StoreResult<HashSet<String>>;
}

/// Storage interface for warning records.
///
/// The bookkeeping operations recompute `warning_count` from the warnings
/// table inside the same transaction, keeping the mirrored count accurate
/// and clamped at zero by construction.
#[async_trait]
pub trait WarningStore: Send + Sync {
    /// Purge records issued before `purge_before`, insert a new record
    /// timestamped `issued_at`, refresh the member's count and
    /// last-warning date. Returns the new record and the post-purge total.
    async fn record_warning(
        &self,
        member: &PlatformId,
        reason: &str,
        issued_at: DateTime<Utc>,
        purge_before: DateTime<Utc>,
    ) -> StoreResult<(WarningRecord, u32)>;

    /// Warning records for a member, oldest first.
    async fn warnings_for(&self, member: &PlatformId) -> StoreResult<Vec<WarningRecord>>;

    /// Delete one warning record and refresh the member's count. Returns
    /// the new total.
    async fn remove_warning(&self, member: &PlatformId, warning_id: i64) -> StoreResult<u32>;
}

/// Storage interface for ban records.
#[async_trait]
pub trait BanStore: Send + Sync {
    async fn upsert_ban(&self, ban: BanRecord) -> StoreResult<()>;
    async fn get_ban(&self, platform_id: &PlatformId) -> StoreResult<Option<BanRecord>>;
    /// Newest first.
    async fn list_bans(&self) -> StoreResult<Vec<BanRecord>>;
    async fn delete_ban(&self, platform_id: &PlatformId) -> StoreResult<bool>;
}

/// Storage interface for application records.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn insert_application(
        &self,
        draft: ApplicationDraft,
        submitted_at: DateTime<Utc>,
    ) -> StoreResult<ApplicationRecord>;

    /// Newest first.
    async fn list_applications(&self) -> StoreResult<Vec<ApplicationRecord>>;

    async fn get_application(&self, id: i64) -> StoreResult<Option<ApplicationRecord>>;

    /// Returns whether a record existed.
    async fn delete_application(&self, id: i64) -> StoreResult<bool>;
}

/// The full identity store surface the workflows consume.
pub trait IdentityStore:
    MemberStore + WarningStore + BanStore + ApplicationStore + Send + Sync
{
}

impl<T> IdentityStore for T where
    T: MemberStore + WarningStore + BanStore + ApplicationStore + Send + Sync
{
}
