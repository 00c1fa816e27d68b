//! The reconciliation cycle.

use crate::crosscheck::{CrosscheckConfig, CrosscheckReport};
use crate::error::ReconcileError;
use chrono::{NaiveDate, Utc};
use guildlink_roster::RosterSource;
use guildlink_store::{IdentityStore, MemberStore};
use guildlink_types::{
    Announcer, CommunityGateway, CommunityRole, MembershipStatus, PlatformId, RoleDelta,
    RoleManager,
};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// What one cycle did. `partial` is set when the roster fetch failed: the
/// provision/prune steps already committed stay committed, and the status
/// and birthday steps were skipped for this cycle.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub provisioned: u32,
    pub pruned: u32,
    pub statuses_synced: u32,
    pub celebrated: Vec<PlatformId>,
    pub partial: bool,
}

/// Periodic batch job keeping member records consistent with the community
/// membership and the external roster.
pub struct Reconciler {
    store: Arc<dyn IdentityStore>,
    roster: Arc<dyn RosterSource>,
    community: Arc<dyn CommunityGateway>,
    roles: Arc<dyn RoleManager>,
    announcer: Arc<dyn Announcer>,
    run_guard: Mutex<()>,
}

impl Reconciler {
    pub fn new(
        store: Arc<dyn IdentityStore>,
        roster: Arc<dyn RosterSource>,
        community: Arc<dyn CommunityGateway>,
        roles: Arc<dyn RoleManager>,
        announcer: Arc<dyn Announcer>,
    ) -> Self {
        Self {
            store,
            roster,
            community,
            roles,
            announcer,
            run_guard: Mutex::new(()),
        }
    }

    /// Run one cycle now. Fails `AlreadyRunning` instead of interleaving
    /// with a cycle already in flight.
    pub async fn run_cycle(&self) -> Result<CycleReport, ReconcileError> {
        let Ok(_guard) = self.run_guard.try_lock() else {
            return Err(ReconcileError::AlreadyRunning);
        };
        self.run_locked(Utc::now().date_naive()).await
    }

    /// As `run_cycle`, with the sweep date injected.
    pub async fn run_cycle_on(&self, today: NaiveDate) -> Result<CycleReport, ReconcileError> {
        let Ok(_guard) = self.run_guard.try_lock() else {
            return Err(ReconcileError::AlreadyRunning);
        };
        self.run_locked(today).await
    }

    async fn run_locked(&self, today: NaiveDate) -> Result<CycleReport, ReconcileError> {
        let mut report = CycleReport::default();
        let community_ids = self.community.member_ids().await?;

        // Provision: every community member gets a record.
        let known: HashSet<PlatformId> = self
            .store
            .list_members()
            .await?
            .into_iter()
            .map(|record| record.platform_id)
            .collect();
        for platform_id in &community_ids {
            if !known.contains(platform_id) {
                self.store.ensure_member(platform_id).await?;
                report.provisioned += 1;
            }
        }

        // Prune: records for departed members go away, warnings cascading.
        for platform_id in &known {
            if !community_ids.contains(platform_id) {
                self.store.delete_member(platform_id).await?;
                report.pruned += 1;
                info!(member = %platform_id, "pruned departed member");
            }
        }

        // One roster fetch feeds the status resync; failure aborts the rest
        // of the cycle without reverting what already committed.
        let roster = match self.roster.fetch().await {
            Ok(roster) => roster,
            Err(err) => {
                warn!(error = %err, "roster unavailable, skipping status and birthday sweep");
                report.partial = true;
                return Ok(report);
            }
        };
        let roster_names = roster.normalized_names();

        let members = self.store.list_members().await?;
        for record in &members {
            let main = slot_status(&roster_names, record.main.game_id.as_ref());
            let alt = slot_status(&roster_names, record.alt.game_id.as_ref());
            if let Err(err) = self
                .store
                .set_statuses(&record.platform_id, main, alt)
                .await
            {
                // The record may have raced a concurrent deletion.
                warn!(member = %record.platform_id, error = %err, "status resync skipped");
                continue;
            }
            report.statuses_synced += 1;
        }

        // Birthday sweep: desired celebratory role state per record, one
        // batched announcement only if someone celebrates today.
        for record in &members {
            let celebrates = record.birthday.is_some_and(|b| b.is_on(today));
            let delta = if celebrates {
                report.celebrated.push(record.platform_id.clone());
                RoleDelta::grant(CommunityRole::Birthday)
            } else {
                RoleDelta::revoke(CommunityRole::Birthday)
            };
            if let Err(err) = self.roles.apply(&record.platform_id, delta).await {
                warn!(member = %record.platform_id, error = %err, "celebratory role sync failed");
            }
        }
        if !report.celebrated.is_empty() {
            if let Err(err) = self.announcer.announce_birthdays(&report.celebrated).await {
                warn!(error = %err, "birthday announcement failed");
            }
        }

        info!(
            provisioned = report.provisioned,
            pruned = report.pruned,
            statuses_synced = report.statuses_synced,
            celebrated = report.celebrated.len(),
            "reconciliation cycle finished"
        );
        Ok(report)
    }

    /// Read-only report of roster entries no record claims, excluding the
    /// configured ranks.
    pub async fn crosscheck(
        &self,
        config: &CrosscheckConfig,
    ) -> Result<CrosscheckReport, ReconcileError> {
        let roster = self.roster.fetch().await?;
        let claimed = self.store.claimed_game_ids().await?;

        let unlinked = roster
            .entries()
            .iter()
            .filter(|entry| !claimed.contains(&entry.name.to_ascii_lowercase()))
            .filter(|entry| !config.is_excluded(&entry.rank))
            .cloned()
            .collect();
        Ok(CrosscheckReport::new(unlinked, config.page_size))
    }
}

fn slot_status(
    roster_names: &HashSet<String>,
    game_id: Option<&guildlink_types::GameId>,
) -> MembershipStatus {
    match game_id {
        Some(id) if roster_names.contains(&id.normalized()) => MembershipStatus::Member,
        _ => MembershipStatus::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration;
    use guildlink_roster::fixtures::{StaticRoster, UnavailableRoster};
    use guildlink_store::{LinkWrite, MemberStore, MemoryIdentityStore, WarningStore};
    use guildlink_types::fixtures::{RecordingAnnouncer, RecordingRoleManager, StaticCommunity};
    use guildlink_types::{GameId, SlotState};

    fn linked(name: &str) -> Option<SlotState> {
        Some(SlotState::linked(GameId::new(name), MembershipStatus::Member))
    }

    struct Harness {
        store: Arc<MemoryIdentityStore>,
        roles: Arc<RecordingRoleManager>,
        announcer: Arc<RecordingAnnouncer>,
    }

    fn reconciler(
        community: &[&str],
        roster: Arc<dyn RosterSource>,
        store: Arc<MemoryIdentityStore>,
    ) -> (Reconciler, Harness) {
        let roles = Arc::new(RecordingRoleManager::new());
        let announcer = Arc::new(RecordingAnnouncer::new());
        let engine = Reconciler::new(
            store.clone(),
            roster,
            Arc::new(StaticCommunity::with_members(community.iter().copied())),
            roles.clone(),
            announcer.clone(),
        );
        (
            engine,
            Harness {
                store,
                roles,
                announcer,
            },
        )
    }

    #[tokio::test]
    async fn test_provision_and_prune_with_cascade() {
        let store = Arc::new(MemoryIdentityStore::new());
        let d3 = PlatformId::new("d3");
        store.ensure_member(&PlatformId::new("d1")).await.unwrap();
        store.ensure_member(&d3).await.unwrap();
        let now = Utc::now();
        store
            .record_warning(&d3, "afk", now, now - Duration::days(90))
            .await
            .unwrap();

        let (engine, h) = reconciler(
            &["d1", "d2"],
            Arc::new(StaticRoster::with_names(["Foo.1234"])),
            store,
        );
        let report = engine.run_cycle().await.unwrap();

        assert_eq!(report.provisioned, 1); // d2
        assert_eq!(report.pruned, 1); // d3
        assert!(!report.partial);
        assert!(h.store.get_member(&d3).await.unwrap().is_none());
        assert!(h.store.warnings_for(&d3).await.unwrap().is_empty());
        assert!(h
            .store
            .get_member(&PlatformId::new("d2"))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_status_resync_is_case_insensitive() {
        let store = Arc::new(MemoryIdentityStore::new());
        let d1 = PlatformId::new("d1");
        store
            .commit_link(
                &d1,
                LinkWrite {
                    main: linked("FOO.1234"),
                    alt: linked("Gone.0000"),
                },
            )
            .await
            .unwrap();

        let (engine, h) = reconciler(
            &["d1"],
            Arc::new(StaticRoster::with_names(["Foo.1234"])),
            store,
        );
        engine.run_cycle().await.unwrap();

        let record = h.store.get_member(&d1).await.unwrap().unwrap();
        assert_eq!(record.main.status, MembershipStatus::Member);
        assert_eq!(record.alt.status, MembershipStatus::None);
    }

    #[tokio::test]
    async fn test_roster_failure_keeps_membership_steps_and_reports_partial() {
        let store = Arc::new(MemoryIdentityStore::new());
        let d1 = PlatformId::new("d1");
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
        store.ensure_member(&PlatformId::new("d3")).await.unwrap();

        let (engine, h) = reconciler(&["d1", "d2"], Arc::new(UnavailableRoster), store);
        let report = engine.run_cycle().await.unwrap();

        assert!(report.partial);
        assert_eq!(report.provisioned, 1);
        assert_eq!(report.pruned, 1);
        assert_eq!(report.statuses_synced, 0);
        // Prior status survives the aborted resync.
        let record = h.store.get_member(&d1).await.unwrap().unwrap();
        assert_eq!(record.main.status, MembershipStatus::Member);
        assert!(h.announcer.batches().is_empty());
    }

    #[tokio::test]
    async fn test_birthday_sweep_announces_one_batch() {
        let store = Arc::new(MemoryIdentityStore::new());
        let d1 = PlatformId::new("d1");
        let d2 = PlatformId::new("d2");
        store.ensure_member(&d1).await.unwrap();
        store.ensure_member(&d2).await.unwrap();

        let today = Utc::now().date_naive();
        store
            .set_birthday(
                &d1,
                Some(
                    guildlink_types::Birthday::new(
                        chrono::Datelike::day(&today),
                        chrono::Datelike::month(&today),
                        1990,
                    )
                    .unwrap(),
                ),
            )
            .await
            .unwrap();

        let (engine, h) = reconciler(
            &["d1", "d2"],
            Arc::new(StaticRoster::with_names(["Foo.1234"])),
            store,
        );
        let report = engine.run_cycle_on(today).await.unwrap();

        assert_eq!(report.celebrated, vec![d1.clone()]);
        assert!(h.roles.granted(&d1, CommunityRole::Birthday));
        assert_eq!(h.announcer.batches(), vec![vec![d1]]);
    }

    #[tokio::test]
    async fn test_no_birthdays_means_no_announcement() {
        let store = Arc::new(MemoryIdentityStore::new());
        store.ensure_member(&PlatformId::new("d1")).await.unwrap();
        let (engine, h) = reconciler(
            &["d1"],
            Arc::new(StaticRoster::with_names(["Foo.1234"])),
            store,
        );
        let report = engine.run_cycle().await.unwrap();
        assert!(report.celebrated.is_empty());
        assert!(h.announcer.batches().is_empty());
    }

    #[tokio::test]
    async fn test_crosscheck_reports_unclaimed_entries() {
        let store = Arc::new(MemoryIdentityStore::new());
        store
            .commit_link(
                &PlatformId::new("d1"),
                LinkWrite {
                    main: linked("Foo.1234"),
                    alt: None,
                },
            )
            .await
            .unwrap();

        let roster = StaticRoster::with_names(["Foo.1234", "Baz.9999"]);
        let (engine, _) = reconciler(&["d1"], Arc::new(roster), store);

        let report = engine
            .crosscheck(&CrosscheckConfig::default())
            .await
            .unwrap();
        let names: Vec<&str> = report.unlinked.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Baz.9999"]);
    }

    #[tokio::test]
    async fn test_crosscheck_excludes_configured_ranks() {
        let store = Arc::new(MemoryIdentityStore::new());
        let roster = StaticRoster::with_entries(vec![
            guildlink_types::RosterEntry {
                name: "Active.1111".into(),
                rank: "Member".into(),
                joined: None,
            },
            guildlink_types::RosterEntry {
                name: "Dormant.2222".into(),
                rank: "Legacy Member".into(),
                joined: None,
            },
        ]);
        let (engine, _) = reconciler(&[], Arc::new(roster), store);

        let report = engine
            .crosscheck(&CrosscheckConfig::default())
            .await
            .unwrap();
        let names: Vec<&str> = report.unlinked.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Active.1111"]);
    }

    /// A community gateway that stalls until told to proceed.
    struct StallingCommunity {
        release: tokio::sync::Semaphore,
    }

    #[async_trait]
    impl CommunityGateway for StallingCommunity {
        async fn member_ids(
            &self,
        ) -> Result<HashSet<PlatformId>, guildlink_types::GatewayError> {
            let _permit = self.release.acquire().await.map_err(|_| {
                guildlink_types::GatewayError::Unavailable("closed".into())
            })?;
            Ok(HashSet::new())
        }

        async fn ban_entries(
            &self,
        ) -> Result<Vec<guildlink_types::PlatformBanEntry>, guildlink_types::GatewayError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_cycles_are_single_flight() {
        let store = Arc::new(MemoryIdentityStore::new());
        let community = Arc::new(StallingCommunity {
            release: tokio::sync::Semaphore::new(0),
        });
        let engine = Arc::new(Reconciler::new(
            store,
            Arc::new(StaticRoster::with_names(["Foo.1234"])),
            community.clone(),
            Arc::new(RecordingRoleManager::new()),
            Arc::new(RecordingAnnouncer::new()),
        ));

        let first = {
            let engine = engine.clone();
            tokio::spawn(async move { engine.run_cycle().await })
        };
        tokio::task::yield_now().await;

        // The first cycle is parked on the gateway; a second attempt must
        // refuse rather than interleave.
        let err = engine.run_cycle().await.unwrap_err();
        assert!(matches!(err, ReconcileError::AlreadyRunning));

        community.release.add_permits(1);
        first.await.unwrap().unwrap();
        assert!(engine.run_cycle().await.is_ok());
    }
}
