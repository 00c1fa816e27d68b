//! In-memory identity store for tests and embedded use.
//!
//! All tables live behind one async mutex: every operation is a single
//! critical section, which gives the same check-then-act serialization the
//! SQLite backend gets from its transactions.

use crate::error::{StoreError, StoreResult};
use crate::traits::{ApplicationStore, BanStore, LinkWrite, MemberStore, WarningStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use guildlink_types::{
    ApplicationDraft, ApplicationRecord, BanRecord, Birthday, MemberRecord, MembershipStatus,
    PlatformId, WarningRecord,
};
use std::collections::{BTreeMap, HashSet};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Inner {
    members: BTreeMap<String, MemberRecord>,
    warnings: BTreeMap<i64, WarningRecord>,
    next_warning_id: i64,
    bans: BTreeMap<String, BanRecord>,
    applications: BTreeMap<i64, ApplicationRecord>,
    next_application_id: i64,
}

impl Inner {
    fn member_mut(&mut self, platform_id: &PlatformId) -> StoreResult<&mut MemberRecord> {
        self.members
            .get_mut(platform_id.as_str())
            .ok_or_else(|| StoreError::UnknownMember(platform_id.clone()))
    }

    /// Another record (not `platform_id`) holding `name`, case-insensitive.
    fn claimant_of(&self, platform_id: &PlatformId, name: &str) -> Option<&MemberRecord> {
        self.members
            .values()
            .find(|record| record.platform_id != *platform_id && record.holding_slot(name).is_some())
    }

    fn warnings_for(&self, member: &PlatformId) -> Vec<WarningRecord> {
        let mut records: Vec<WarningRecord> = self
            .warnings
            .values()
            .filter(|w| w.member == *member)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.issued_at.cmp(&b.issued_at).then(a.id.cmp(&b.id)));
        records
    }

    fn refresh_warning_count(&mut self, member: &PlatformId) -> StoreResult<u32> {
        let total = self.warnings.values().filter(|w| w.member == *member).count() as u32;
        self.member_mut(member)?.warning_count = total;
        Ok(total)
    }
}

/// Identity store backed by in-process maps.
#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    inner: Mutex<Inner>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MemberStore for MemoryIdentityStore {
    async fn ensure_member(&self, platform_id: &PlatformId) -> StoreResult<MemberRecord> {
        let mut inner = self.inner.lock().await;
        let record = inner
            .members
            .entry(platform_id.as_str().to_string())
            .or_insert_with(|| MemberRecord::provisioned(platform_id.clone()));
        Ok(record.clone())
    }

    async fn get_member(&self, platform_id: &PlatformId) -> StoreResult<Option<MemberRecord>> {
        let inner = self.inner.lock().await;
        Ok(inner.members.get(platform_id.as_str()).cloned())
    }

    async fn resolve_member(&self, identifier: &str) -> StoreResult<Option<MemberRecord>> {
        let inner = self.inner.lock().await;
        if let Some(record) = inner.members.get(identifier) {
            return Ok(Some(record.clone()));
        }
        if let Some(record) = inner.members.values().find(|r| r.main.holds(identifier)) {
            return Ok(Some(record.clone()));
        }
        Ok(inner
            .members
            .values()
            .find(|r| r.alt.holds(identifier))
            .cloned())
    }

    async fn list_members(&self) -> StoreResult<Vec<MemberRecord>> {
        let inner = self.inner.lock().await;
        Ok(inner.members.values().cloned().collect())
    }

    async fn delete_member(&self, platform_id: &PlatformId) -> StoreResult<bool> {
        let mut inner = self.inner.lock().await;
        let existed = inner.members.remove(platform_id.as_str()).is_some();
        if existed {
            inner.warnings.retain(|_, w| w.member != *platform_id);
        }
        Ok(existed)
    }

    async fn commit_link(
        &self,
        platform_id: &PlatformId,
        write: LinkWrite,
    ) -> StoreResult<MemberRecord> {
        let mut inner = self.inner.lock().await;

        // Re-check the uniqueness invariant against committed state before
        // touching anything.
        for slot in [&write.main, &write.alt].into_iter().flatten() {
            if let Some(game_id) = &slot.game_id {
                if let Some(holder) = inner.claimant_of(platform_id, game_id.as_str()) {
                    return Err(StoreError::ClaimConflict {
                        game_id: game_id.clone(),
                        holder: holder.platform_id.clone(),
                    });
                }
            }
        }

        let record = inner
            .members
            .entry(platform_id.as_str().to_string())
            .or_insert_with(|| MemberRecord::provisioned(platform_id.clone()));
        if let Some(main) = write.main {
            record.main = main;
        }
        if let Some(alt) = write.alt {
            record.alt = alt;
        }
        Ok(record.clone())
    }

    async fn set_statuses(
        &self,
        platform_id: &PlatformId,
        main: MembershipStatus,
        alt: MembershipStatus,
    ) -> StoreResult<()> {
        let mut inner = self.inner.lock().await;
        let record = inner.member_mut(platform_id)?;
        record.main.status = main;
        record.alt.status = alt;
        Ok(())
    }

    async fn set_birthday(
        &self,
        platform_id: &PlatformId,
        birthday: Option<Birthday>,
    ) -> StoreResult<()> {
        let mut inner = self.inner.lock().await;
        inner.member_mut(platform_id)?.birthday = birthday;
        Ok(())
    }

    async fn set_watchlist(
        &self,
        platform_id: &PlatformId,
        reason: Option<String>,
    ) -> StoreResult<()> {
        let mut inner = self.inner.lock().await;
        inner.member_mut(platform_id)?.watchlist_reason = reason;
        Ok(())
    }

    async fn claimed_game_ids(&self) -> StoreResult<HashSet<String>> {
        let inner = self.inner.lock().await;
        let mut claimed = HashSet::new();
        for record in inner.members.values() {
            for slot in [&record.main, &record.alt] {
                if let Some(game_id) = &slot.game_id {
                    claimed.insert(game_id.normalized());
                }
            }
        }
        Ok(claimed)
    }
}

#[async_trait]
impl WarningStore for MemoryIdentityStore {
    async fn record_warning(
        &self,
        member: &PlatformId,
        reason: &str,
        issued_at: DateTime<Utc>,
        purge_before: DateTime<Utc>,
    ) -> StoreResult<(WarningRecord, u32)> {
        let mut inner = self.inner.lock().await;
        // Member must exist; warnings cascade from member records.
        inner.member_mut(member)?;

        inner
            .warnings
            .retain(|_, w| w.member != *member || w.issued_at >= purge_before);

        inner.next_warning_id += 1;
        let record = WarningRecord {
            id: inner.next_warning_id,
            member: member.clone(),
            reason: reason.to_string(),
            issued_at,
        };
        inner.warnings.insert(record.id, record.clone());

        let total = inner.refresh_warning_count(member)?;
        inner.member_mut(member)?.last_warning_at = Some(issued_at);
        Ok((record, total))
    }

    async fn warnings_for(&self, member: &PlatformId) -> StoreResult<Vec<WarningRecord>> {
        let inner = self.inner.lock().await;
        Ok(inner.warnings_for(member))
    }

    async fn remove_warning(&self, member: &PlatformId, warning_id: i64) -> StoreResult<u32> {
        let mut inner = self.inner.lock().await;
        match inner.warnings.get(&warning_id) {
            Some(w) if w.member == *member => {
                inner.warnings.remove(&warning_id);
            }
            _ => return Err(StoreError::UnknownWarning(warning_id)),
        }
        inner.refresh_warning_count(member)
    }
}

#[async_trait]
impl BanStore for MemoryIdentityStore {
    async fn upsert_ban(&self, ban: BanRecord) -> StoreResult<()> {
        let mut inner = self.inner.lock().await;
        inner.bans.insert(ban.platform_id.as_str().to_string(), ban);
        Ok(())
    }

    async fn get_ban(&self, platform_id: &PlatformId) -> StoreResult<Option<BanRecord>> {
        let inner = self.inner.lock().await;
        Ok(inner.bans.get(platform_id.as_str()).cloned())
    }

    async fn list_bans(&self) -> StoreResult<Vec<BanRecord>> {
        let inner = self.inner.lock().await;
        let mut bans: Vec<BanRecord> = inner.bans.values().cloned().collect();
        bans.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        Ok(bans)
    }

    async fn delete_ban(&self, platform_id: &PlatformId) -> StoreResult<bool> {
        let mut inner = self.inner.lock().await;
        Ok(inner.bans.remove(platform_id.as_str()).is_some())
    }
}

#[async_trait]
impl ApplicationStore for MemoryIdentityStore {
    async fn insert_application(
        &self,
        draft: ApplicationDraft,
        submitted_at: DateTime<Utc>,
    ) -> StoreResult<ApplicationRecord> {
        let mut inner = self.inner.lock().await;
        inner.next_application_id += 1;
        let record = ApplicationRecord {
            id: inner.next_application_id,
            submitted_at,
            platform_id: draft.platform_id,
            game_id: draft.game_id,
            stage_one: draft.stage_one,
            stage_two: draft.stage_two,
        };
        inner.applications.insert(record.id, record.clone());
        Ok(record)
    }

    async fn list_applications(&self) -> StoreResult<Vec<ApplicationRecord>> {
        let inner = self.inner.lock().await;
        Ok(inner.applications.values().rev().cloned().collect())
    }

    async fn get_application(&self, id: i64) -> StoreResult<Option<ApplicationRecord>> {
        let inner = self.inner.lock().await;
        Ok(inner.applications.get(&id).cloned())
    }

    async fn delete_application(&self, id: i64) -> StoreResult<bool> {
        let mut inner = self.inner.lock().await;
        Ok(inner.applications.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use guildlink_types::{GameId, SlotState};
    use std::sync::Arc;

    fn linked(name: &str) -> Option<SlotState> {
        Some(SlotState::linked(GameId::new(name), MembershipStatus::Member))
    }

    #[tokio::test]
    async fn test_commit_link_rejects_claim_held_by_other_record() {
        let store = MemoryIdentityStore::new();
        let d1 = PlatformId::new("d1");
        let d2 = PlatformId::new("d2");

        store
            .commit_link(
                &d1,
                LinkWrite {
                    main: linked("Foo.1234"),
                    alt: None,
                },
            )
            .await
            .unwrap();

        let err = store
            .commit_link(
                &d2,
                LinkWrite {
                    // Case differs; the claim still conflicts.
                    main: linked("foo.1234"),
                    alt: None,
                },
            )
            .await
            .unwrap_err();

        match err {
            StoreError::ClaimConflict { holder, .. } => assert_eq!(holder, d1),
            other => panic!("unexpected error: {other}"),
        }
        // Loser mutated nothing.
        assert!(store.get_member(&d2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_conflicting_claims_have_one_winner() {
        let store = Arc::new(MemoryIdentityStore::new());
        let claim = |id: &str| {
            let store = store.clone();
            let member = PlatformId::new(id);
            tokio::spawn(async move {
                store
                    .commit_link(
                        &member,
                        LinkWrite {
                            main: Some(SlotState::linked(
                                GameId::new("Foo.1234"),
                                MembershipStatus::Member,
                            )),
                            alt: None,
                        },
                    )
                    .await
            })
        };

        let (first, second) = tokio::join!(claim("d1"), claim("d2"));
        let outcomes = [first.unwrap(), second.unwrap()];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(outcomes
            .iter()
            .any(|r| matches!(r, Err(StoreError::ClaimConflict { .. }))));
    }

    #[tokio::test]
    async fn test_delete_member_cascades_warnings() {
        let store = MemoryIdentityStore::new();
        let d1 = PlatformId::new("d1");
        store.ensure_member(&d1).await.unwrap();
        let now = Utc::now();
        store
            .record_warning(&d1, "afk", now, now - Duration::days(90))
            .await
            .unwrap();

        assert!(store.delete_member(&d1).await.unwrap());
        assert!(store.warnings_for(&d1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_warning_purges_expired_then_counts() {
        let store = MemoryIdentityStore::new();
        let d1 = PlatformId::new("d1");
        store.ensure_member(&d1).await.unwrap();

        let now = Utc::now();
        let old = now - Duration::days(91);
        store
            .record_warning(&d1, "old", old, old - Duration::days(90))
            .await
            .unwrap();

        let (_, total) = store
            .record_warning(&d1, "new", now, now - Duration::days(90))
            .await
            .unwrap();
        assert_eq!(total, 1);
        let remaining = store.warnings_for(&d1).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].reason, "new");
    }

    #[tokio::test]
    async fn test_resolve_member_prefers_platform_then_main_then_alt() {
        let store = MemoryIdentityStore::new();
        let d1 = PlatformId::new("d1");
        store
            .commit_link(
                &d1,
                LinkWrite {
                    main: linked("Foo.1234"),
                    alt: linked("Bar.5678"),
                },
            )
            .await
            .unwrap();

        for id in ["d1", "foo.1234", "BAR.5678"] {
            let record = store.resolve_member(id).await.unwrap().unwrap();
            assert_eq!(record.platform_id, d1);
        }
        assert!(store.resolve_member("nobody").await.unwrap().is_none());
    }
}
