//! Warning bookkeeping with lazy decay.
//!
//! Decay runs only when a new warning is added for the member; there is no
//! independent background sweep. A member who never receives another warning
//! keeps their stored count until the next add.

use crate::error::ModerationError;
use chrono::{Duration, Utc};
use guildlink_store::{IdentityStore, MemberStore, WarningStore};
use guildlink_types::{
    DomainEvent, EventEnvelope, EventSink, MemberRecord, PlatformId, WarningRecord, WarningTier,
};
use std::sync::Arc;
use tracing::info;

/// Retention window; older records are purged on the next add.
pub const WARNING_RETENTION_DAYS: i64 = 90;

/// Result of adding a warning: the stored record, the post-purge total, and
/// the escalation tier the caller renders.
#[derive(Debug, Clone)]
pub struct WarningOutcome {
    pub warning: WarningRecord,
    pub total: u32,
    pub tier: WarningTier,
}

/// Warning operations over the identity store.
pub struct WarningService {
    store: Arc<dyn IdentityStore>,
    events: Arc<dyn EventSink>,
    retention: Duration,
}

impl WarningService {
    pub fn new(store: Arc<dyn IdentityStore>, events: Arc<dyn EventSink>) -> Self {
        Self {
            store,
            events,
            retention: Duration::days(WARNING_RETENTION_DAYS),
        }
    }

    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    /// Purge expired records, insert a new one timestamped now, and return
    /// the new total with its escalation tier.
    pub async fn add_warning(
        &self,
        identifier: &str,
        reason: &str,
    ) -> Result<WarningOutcome, ModerationError> {
        let record = self.resolve(identifier).await?;
        let now = Utc::now();
        let (warning, total) = self
            .store
            .record_warning(&record.platform_id, reason, now, now - self.retention)
            .await?;
        let tier = WarningTier::from_total(total);

        info!(member = %record.platform_id, total, "warning added");
        self.events
            .publish(EventEnvelope::new(DomainEvent::WarningEscalated {
                member: record.platform_id,
                tier,
                total,
            }))
            .await;

        Ok(WarningOutcome {
            warning,
            total,
            tier,
        })
    }

    /// Delete the `ordinal`-th warning (1-based, oldest first). Returns the
    /// new total.
    pub async fn remove_warning(
        &self,
        identifier: &str,
        ordinal: usize,
    ) -> Result<u32, ModerationError> {
        let record = self.resolve(identifier).await?;
        let warnings = self.store.warnings_for(&record.platform_id).await?;
        if ordinal == 0 || ordinal > warnings.len() {
            return Err(ModerationError::InvalidOrdinal {
                given: ordinal,
                count: warnings.len(),
            });
        }
        let total = self
            .store
            .remove_warning(&record.platform_id, warnings[ordinal - 1].id)
            .await?;
        info!(member = %record.platform_id, ordinal, total, "warning removed");
        Ok(total)
    }

    /// Stored warnings oldest first, the ordering `remove_warning` indexes.
    pub async fn list_warnings(
        &self,
        identifier: &str,
    ) -> Result<Vec<WarningRecord>, ModerationError> {
        let record = self.resolve(identifier).await?;
        Ok(self.store.warnings_for(&record.platform_id).await?)
    }

    async fn resolve(&self, identifier: &str) -> Result<MemberRecord, ModerationError> {
        self.store
            .resolve_member(identifier)
            .await?
            .ok_or_else(|| ModerationError::UnknownMember(identifier.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guildlink_store::{MemberStore, MemoryIdentityStore, WarningStore};
    use guildlink_types::{NullEventSink, RecordingEventSink};

    async fn setup() -> (WarningService, Arc<MemoryIdentityStore>, PlatformId) {
        let store = Arc::new(MemoryIdentityStore::new());
        let d1 = PlatformId::new("d1");
        store.ensure_member(&d1).await.unwrap();
        let service = WarningService::new(store.clone(), Arc::new(NullEventSink));
        (service, store, d1)
    }

    #[tokio::test]
    async fn test_expired_warning_is_purged_on_next_add() {
        let (service, store, d1) = setup().await;

        // Seed a warning issued 91 days ago.
        let old = Utc::now() - Duration::days(91);
        store
            .record_warning(&d1, "stale", old, old - Duration::days(90))
            .await
            .unwrap();

        let outcome = service.add_warning("d1", "fresh").await.unwrap();
        assert_eq!(outcome.total, 1);
        assert_eq!(outcome.tier, WarningTier::First);

        let warnings = service.list_warnings("d1").await.unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].reason, "fresh");
    }

    #[tokio::test]
    async fn test_escalation_tiers() {
        let (service, _, _) = setup().await;
        assert_eq!(
            service.add_warning("d1", "one").await.unwrap().tier,
            WarningTier::First
        );
        assert_eq!(
            service.add_warning("d1", "two").await.unwrap().tier,
            WarningTier::Second
        );
        assert_eq!(
            service.add_warning("d1", "three").await.unwrap().tier,
            WarningTier::Final
        );
        assert_eq!(
            service.add_warning("d1", "four").await.unwrap().tier,
            WarningTier::Final
        );
    }

    #[tokio::test]
    async fn test_add_then_remove_first_leaves_none() {
        let (service, store, d1) = setup().await;
        service.add_warning("d1", "afk").await.unwrap();

        let total = service.remove_warning("d1", 1).await.unwrap();
        assert_eq!(total, 0);
        assert!(service.list_warnings("d1").await.unwrap().is_empty());
        assert_eq!(
            store.get_member(&d1).await.unwrap().unwrap().warning_count,
            0
        );
    }

    #[tokio::test]
    async fn test_remove_ordinal_is_oldest_first() {
        let (service, _, _) = setup().await;
        service.add_warning("d1", "first").await.unwrap();
        service.add_warning("d1", "second").await.unwrap();

        service.remove_warning("d1", 1).await.unwrap();
        let remaining = service.list_warnings("d1").await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].reason, "second");
    }

    #[tokio::test]
    async fn test_invalid_ordinal() {
        let (service, _, _) = setup().await;
        service.add_warning("d1", "only").await.unwrap();

        for ordinal in [0, 2] {
            let err = service.remove_warning("d1", ordinal).await.unwrap_err();
            assert!(matches!(
                err,
                ModerationError::InvalidOrdinal { count: 1, .. }
            ));
        }
    }

    #[tokio::test]
    async fn test_escalation_event_is_published() {
        let store = Arc::new(MemoryIdentityStore::new());
        let d1 = PlatformId::new("d1");
        store.ensure_member(&d1).await.unwrap();
        let events = Arc::new(RecordingEventSink::new());
        let service = WarningService::new(store, events.clone());

        service.add_warning("d1", "afk").await.unwrap();
        let published = events.drain();
        assert!(matches!(
            &published[0].event,
            DomainEvent::WarningEscalated {
                tier: WarningTier::First,
                total: 1,
                ..
            }
        ));
    }
}
