//! Link, admin-link, and unlink operations.

use crate::error::LinkError;
use guildlink_roster::RosterSource;
use guildlink_store::{IdentityStore, LinkWrite, MemberStore, StoreError};
use guildlink_types::{
    CommunityRole, DomainEvent, EventEnvelope, EventSink, GameId, MemberRecord, MembershipStatus,
    PlatformId, RoleDelta, RoleManager, Slot, SlotState,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Result of a successful linking operation.
///
/// `role_sync_applied` is the partial-success flag: the record write has
/// committed either way, and a failed role sync is reported rather than
/// rolled back so the presentation layer can compensate.
#[derive(Debug, Clone)]
pub struct LinkOutcome {
    pub record: MemberRecord,
    pub swapped: bool,
    pub role_sync_applied: bool,
}

/// Admin request: either slot may be set in one call; omitted fields
/// preserve their current value.
#[derive(Debug, Clone, Default)]
pub struct AdminLinkRequest {
    pub main: Option<String>,
    pub alt: Option<String>,
}

/// The identity linking workflow.
pub struct LinkingService {
    store: Arc<dyn IdentityStore>,
    roster: Arc<dyn RosterSource>,
    roles: Arc<dyn RoleManager>,
    events: Arc<dyn EventSink>,
}

impl LinkingService {
    pub fn new(
        store: Arc<dyn IdentityStore>,
        roster: Arc<dyn RosterSource>,
        roles: Arc<dyn RoleManager>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            store,
            roster,
            roles,
            events,
        }
    }

    /// Link `claimed` into `slot` for `member`.
    ///
    /// Claiming the opposite slot's current value is a swap: both slots are
    /// exchanged atomically, statuses carried with their values, and no
    /// roster re-verification happens for the already-verified identity.
    pub async fn link_identity(
        &self,
        member: &PlatformId,
        claimed: &str,
        slot: Slot,
    ) -> Result<LinkOutcome, LinkError> {
        let roster = self.roster.fetch().await?;
        let entry = roster
            .find(claimed)
            .ok_or_else(|| LinkError::NotFoundInRoster(claimed.to_string()))?;
        let current = self.store.ensure_member(member).await?;

        let (write, swapped) = if current.slot(slot.opposite()).holds(&entry.name) {
            (
                LinkWrite {
                    main: Some(current.alt.clone()),
                    alt: Some(current.main.clone()),
                },
                true,
            )
        } else if current.slot(slot).holds(&entry.name) {
            return Err(LinkError::NoChange);
        } else {
            let fresh = SlotState::linked(GameId::new(entry.name.clone()), MembershipStatus::Member);
            let write = match slot {
                Slot::Main => LinkWrite {
                    main: Some(fresh),
                    alt: None,
                },
                Slot::Alt => LinkWrite {
                    main: None,
                    alt: Some(fresh),
                },
            };
            (write, false)
        };

        let record = self.commit(member, write).await?;
        info!(member = %member, slot = %slot, swapped, "identity linked");
        let role_sync_applied = self.sync_verified_role(member).await;
        Ok(LinkOutcome {
            record,
            swapped,
            role_sync_applied,
        })
    }

    /// Set either or both slots of an arbitrary target in one call.
    ///
    /// Swap, no-change, and conflict rules apply per slot, evaluated
    /// jointly: the exchange is applied first, explicit fresh assignments
    /// on top, and only then is the result compared against the current
    /// assignment.
    pub async fn admin_link_identity(
        &self,
        member: &PlatformId,
        request: AdminLinkRequest,
    ) -> Result<LinkOutcome, LinkError> {
        let main_req = normalize_request(request.main.as_deref());
        let alt_req = normalize_request(request.alt.as_deref());
        if main_req.is_none() && alt_req.is_none() {
            return Err(LinkError::NoChange);
        }

        let roster = self.roster.fetch().await?;
        let current = self.store.ensure_member(member).await?;

        let mut final_main = current.main.clone();
        let mut final_alt = current.alt.clone();
        let mut swapped = false;

        // A request naming the opposite slot's current value is a swap.
        if main_req.is_some_and(|req| current.alt.holds(req))
            || alt_req.is_some_and(|req| current.main.holds(req))
        {
            std::mem::swap(&mut final_main, &mut final_alt);
            swapped = true;
        }

        if let Some(req) = main_req {
            if !final_main.holds(req) {
                let entry = roster
                    .find(req)
                    .ok_or_else(|| LinkError::NotFoundInRoster(req.to_string()))?;
                final_main =
                    SlotState::linked(GameId::new(entry.name.clone()), MembershipStatus::Member);
            }
        }
        if let Some(req) = alt_req {
            if !final_alt.holds(req) {
                let entry = roster
                    .find(req)
                    .ok_or_else(|| LinkError::NotFoundInRoster(req.to_string()))?;
                final_alt =
                    SlotState::linked(GameId::new(entry.name.clone()), MembershipStatus::Member);
            }
        }

        if final_main == current.main && final_alt == current.alt {
            return Err(LinkError::NoChange);
        }

        let write = LinkWrite {
            main: (final_main != current.main).then_some(final_main),
            alt: (final_alt != current.alt).then_some(final_alt),
        };
        let record = self.commit(member, write).await?;
        info!(member = %member, swapped, "identities updated by admin");
        let role_sync_applied = self.sync_verified_role(member).await;
        Ok(LinkOutcome {
            record,
            swapped,
            role_sync_applied,
        })
    }

    /// Reset a slot to its sentinel and emit `MemberUnlinked`.
    pub async fn unlink_identity(
        &self,
        member: &PlatformId,
        slot: Slot,
    ) -> Result<MemberRecord, LinkError> {
        let current = self
            .store
            .get_member(member)
            .await?
            .ok_or_else(|| LinkError::UnknownMember(member.clone()))?;
        let Some(game_id) = current.slot(slot).game_id.clone() else {
            return Err(LinkError::NoChange);
        };

        let write = match slot {
            Slot::Main => LinkWrite {
                main: Some(SlotState::unlinked()),
                alt: None,
            },
            Slot::Alt => LinkWrite {
                main: None,
                alt: Some(SlotState::unlinked()),
            },
        };
        let record = self.store.commit_link(member, write).await?;
        info!(member = %member, slot = %slot, game_id = %game_id, "identity unlinked");
        self.events
            .publish(EventEnvelope::new(DomainEvent::MemberUnlinked {
                member: member.clone(),
                slot,
                game_id,
            }))
            .await;
        Ok(record)
    }

    async fn commit(
        &self,
        member: &PlatformId,
        write: LinkWrite,
    ) -> Result<MemberRecord, LinkError> {
        match self.store.commit_link(member, write).await {
            Ok(record) => Ok(record),
            Err(StoreError::ClaimConflict { game_id, holder }) => {
                warn!(
                    claimant = %member,
                    holder = %holder,
                    game_id = %game_id,
                    "conflicting identity claim"
                );
                self.events
                    .publish(EventEnvelope::new(DomainEvent::ConflictDetected {
                        claimed: game_id.clone(),
                        claimant: member.clone(),
                        holder: holder.clone(),
                    }))
                    .await;
                Err(LinkError::ConflictingClaim { game_id, holder })
            }
            Err(other) => Err(other.into()),
        }
    }

    async fn sync_verified_role(&self, member: &PlatformId) -> bool {
        match self
            .roles
            .apply(member, RoleDelta::grant(CommunityRole::Verified))
            .await
        {
            Ok(()) => true,
            Err(err) => {
                warn!(member = %member, error = %err, "record committed but role sync failed");
                false
            }
        }
    }
}

fn normalize_request(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use guildlink_roster::fixtures::StaticRoster;
    use guildlink_store::MemoryIdentityStore;
    use guildlink_types::fixtures::RecordingRoleManager;
    use guildlink_types::RecordingEventSink;

    struct Harness {
        service: LinkingService,
        roles: Arc<RecordingRoleManager>,
        events: Arc<RecordingEventSink>,
    }

    fn setup(names: &[&str]) -> Harness {
        let store = Arc::new(MemoryIdentityStore::new());
        let roster = Arc::new(StaticRoster::with_names(names.iter().copied()));
        let roles = Arc::new(RecordingRoleManager::new());
        let events = Arc::new(RecordingEventSink::new());
        Harness {
            service: LinkingService::new(store, roster, roles.clone(), events.clone()),
            roles,
            events,
        }
    }

    #[tokio::test]
    async fn test_link_sets_member_status_and_syncs_role() {
        let h = setup(&["Foo.1234"]);
        let d1 = PlatformId::new("d1");

        let outcome = h
            .service
            .link_identity(&d1, "foo.1234", Slot::Main)
            .await
            .unwrap();

        // Canonical roster casing is stored, not the claimant's.
        assert_eq!(outcome.record.main.game_id.as_ref().unwrap().as_str(), "Foo.1234");
        assert_eq!(outcome.record.main.status, MembershipStatus::Member);
        assert!(!outcome.swapped);
        assert!(outcome.role_sync_applied);
        assert!(h.roles.granted(&d1, CommunityRole::Verified));
    }

    #[tokio::test]
    async fn test_conflicting_claim_fails_and_notifies() {
        let h = setup(&["Foo.1234"]);
        let d1 = PlatformId::new("d1");
        let d2 = PlatformId::new("d2");

        h.service
            .link_identity(&d1, "Foo.1234", Slot::Main)
            .await
            .unwrap();
        let err = h
            .service
            .link_identity(&d2, "Foo.1234", Slot::Main)
            .await
            .unwrap_err();

        assert!(matches!(err, LinkError::ConflictingClaim { ref holder, .. } if *holder == d1));
        let events = h.events.drain();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0].event,
            DomainEvent::ConflictDetected { claimant, holder, .. }
                if *claimant == d2 && *holder == d1
        ));

        // The holder's record is untouched by the failed claim.
        let still_linked = h
            .service
            .link_identity(&d1, "Foo.1234", Slot::Main)
            .await
            .unwrap_err();
        assert!(matches!(still_linked, LinkError::NoChange));
    }

    #[tokio::test]
    async fn test_swap_carries_statuses_and_is_involutive() {
        let h = setup(&["Foo.1234", "Bar.5678"]);
        let d1 = PlatformId::new("d1");

        h.service
            .link_identity(&d1, "Foo.1234", Slot::Main)
            .await
            .unwrap();
        let outcome = h
            .service
            .link_identity(&d1, "Bar.5678", Slot::Alt)
            .await
            .unwrap();
        let original = outcome.record;

        // Claiming the current alt for main swaps the slots.
        let swapped = h
            .service
            .link_identity(&d1, "Bar.5678", Slot::Main)
            .await
            .unwrap();
        assert!(swapped.swapped);
        assert_eq!(swapped.record.main, original.alt);
        assert_eq!(swapped.record.alt, original.main);

        // Applying the swap again restores the original assignment.
        let restored = h
            .service
            .link_identity(&d1, "Foo.1234", Slot::Main)
            .await
            .unwrap();
        assert!(restored.swapped);
        assert_eq!(restored.record.main, original.main);
        assert_eq!(restored.record.alt, original.alt);
    }

    #[tokio::test]
    async fn test_relink_same_value_is_no_change() {
        let h = setup(&["Foo.1234"]);
        let d1 = PlatformId::new("d1");
        h.service
            .link_identity(&d1, "Foo.1234", Slot::Main)
            .await
            .unwrap();
        let err = h
            .service
            .link_identity(&d1, "FOO.1234", Slot::Main)
            .await
            .unwrap_err();
        assert!(matches!(err, LinkError::NoChange));
    }

    #[tokio::test]
    async fn test_unknown_identity_is_rejected_without_mutation() {
        let h = setup(&["Foo.1234"]);
        let d1 = PlatformId::new("d1");
        let err = h
            .service
            .link_identity(&d1, "Ghost.0000", Slot::Main)
            .await
            .unwrap_err();
        assert!(matches!(err, LinkError::NotFoundInRoster(_)));
        assert!(h.roles.applied().is_empty());
    }

    #[tokio::test]
    async fn test_admin_pure_swap_with_noop_is_not_a_conflict() {
        let h = setup(&["Foo.1234", "Bar.5678"]);
        let d1 = PlatformId::new("d1");
        h.service
            .link_identity(&d1, "Foo.1234", Slot::Main)
            .await
            .unwrap();
        h.service
            .link_identity(&d1, "Bar.5678", Slot::Alt)
            .await
            .unwrap();

        // Swap main while restating alt's future value: jointly a pure swap.
        let outcome = h
            .service
            .admin_link_identity(
                &d1,
                AdminLinkRequest {
                    main: Some("Bar.5678".into()),
                    alt: Some("Foo.1234".into()),
                },
            )
            .await
            .unwrap();
        assert!(outcome.swapped);
        assert_eq!(outcome.record.main.game_id.as_ref().unwrap().as_str(), "Bar.5678");
        assert_eq!(outcome.record.alt.game_id.as_ref().unwrap().as_str(), "Foo.1234");
        assert!(h.events.drain().is_empty());
    }

    #[tokio::test]
    async fn test_admin_omitted_slot_is_preserved() {
        let h = setup(&["Foo.1234", "Bar.5678", "Baz.9999"]);
        let d1 = PlatformId::new("d1");
        h.service
            .admin_link_identity(
                &d1,
                AdminLinkRequest {
                    main: Some("Foo.1234".into()),
                    alt: Some("Bar.5678".into()),
                },
            )
            .await
            .unwrap();

        let outcome = h
            .service
            .admin_link_identity(
                &d1,
                AdminLinkRequest {
                    main: Some("Baz.9999".into()),
                    alt: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(outcome.record.main.game_id.as_ref().unwrap().as_str(), "Baz.9999");
        assert_eq!(outcome.record.alt.game_id.as_ref().unwrap().as_str(), "Bar.5678");
    }

    #[tokio::test]
    async fn test_admin_identical_values_are_no_change() {
        let h = setup(&["Foo.1234", "Bar.5678"]);
        let d1 = PlatformId::new("d1");
        h.service
            .admin_link_identity(
                &d1,
                AdminLinkRequest {
                    main: Some("Foo.1234".into()),
                    alt: Some("Bar.5678".into()),
                },
            )
            .await
            .unwrap();

        let err = h
            .service
            .admin_link_identity(
                &d1,
                AdminLinkRequest {
                    main: Some("foo.1234".into()),
                    alt: Some("bar.5678".into()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LinkError::NoChange));
    }

    #[tokio::test]
    async fn test_role_sync_failure_reports_partial_success() {
        let h = setup(&["Foo.1234"]);
        let d1 = PlatformId::new("d1");
        h.roles.fail_next(true);

        let outcome = h
            .service
            .link_identity(&d1, "Foo.1234", Slot::Main)
            .await
            .unwrap();
        // The write committed; only the side effect is reported as failed.
        assert!(outcome.record.is_linked());
        assert!(!outcome.role_sync_applied);
    }

    #[tokio::test]
    async fn test_unlink_resets_slot_and_emits_event() {
        let h = setup(&["Foo.1234"]);
        let d1 = PlatformId::new("d1");
        h.service
            .link_identity(&d1, "Foo.1234", Slot::Main)
            .await
            .unwrap();

        let record = h.service.unlink_identity(&d1, Slot::Main).await.unwrap();
        assert!(record.main.game_id.is_none());
        assert_eq!(record.main.status, MembershipStatus::None);

        let events = h.events.drain();
        assert!(matches!(
            &events[0].event,
            DomainEvent::MemberUnlinked { slot: Slot::Main, .. }
        ));

        let err = h.service.unlink_identity(&d1, Slot::Main).await.unwrap_err();
        assert!(matches!(err, LinkError::NoChange));
    }
}
