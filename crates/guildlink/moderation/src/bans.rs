//! Ban records and reconciliation against the platform's authoritative set.

use crate::error::ModerationError;
use chrono::Utc;
use guildlink_store::{BanStore, IdentityStore};
use guildlink_types::{BanRecord, CommunityGateway, PlatformId};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

const NO_REASON: &str = "No reason provided";

/// Ban ledger over the identity store and the community gateway.
pub struct BanService {
    store: Arc<dyn IdentityStore>,
    community: Arc<dyn CommunityGateway>,
}

impl BanService {
    pub fn new(store: Arc<dyn IdentityStore>, community: Arc<dyn CommunityGateway>) -> Self {
        Self { store, community }
    }

    /// Upsert a ban record timestamped now.
    pub async fn record_ban(
        &self,
        member: &PlatformId,
        reason: &str,
    ) -> Result<BanRecord, ModerationError> {
        let ban = BanRecord {
            platform_id: member.clone(),
            reason: reason.to_string(),
            recorded_at: Utc::now(),
        };
        self.store.upsert_ban(ban.clone()).await?;
        info!(member = %member, "ban recorded");
        Ok(ban)
    }

    /// List ban records, newest first.
    ///
    /// Unfiltered listings reconcile against the platform's authoritative
    /// ban set first: entries missing locally are backfilled (timestamped
    /// now) and local records absent upstream are pruned. A filtered
    /// listing does neither.
    pub async fn list_bans(
        &self,
        filter: Option<&PlatformId>,
    ) -> Result<Vec<BanRecord>, ModerationError> {
        if let Some(member) = filter {
            return Ok(self.store.get_ban(member).await?.into_iter().collect());
        }

        let authoritative = self.community.ban_entries().await?;
        let local = self.store.list_bans().await?;
        let local_ids: HashSet<&str> = local.iter().map(|b| b.platform_id.as_str()).collect();
        let authoritative_ids: HashSet<&str> = authoritative
            .iter()
            .map(|entry| entry.platform_id.as_str())
            .collect();

        for entry in &authoritative {
            if !local_ids.contains(entry.platform_id.as_str()) {
                debug!(member = %entry.platform_id, "backfilling ban record");
                self.store
                    .upsert_ban(BanRecord {
                        platform_id: entry.platform_id.clone(),
                        reason: entry
                            .reason
                            .clone()
                            .unwrap_or_else(|| NO_REASON.to_string()),
                        recorded_at: Utc::now(),
                    })
                    .await?;
            }
        }

        for ban in &local {
            if !authoritative_ids.contains(ban.platform_id.as_str()) {
                debug!(member = %ban.platform_id, "pruning stale ban record");
                self.store.delete_ban(&ban.platform_id).await?;
            }
        }

        Ok(self.store.list_bans().await?)
    }
}
