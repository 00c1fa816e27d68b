//! Member profile operations: birthday upkeep and member resolution.

use crate::error::ProfileError;
use guildlink_roster::RosterSource;
use guildlink_store::{IdentityStore, MemberStore};
use guildlink_types::{
    Birthday, CommunityRole, MemberRecord, PlatformId, RoleDelta, RoleManager,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::warn;

/// A resolved record plus the roster join date of its main identity.
#[derive(Debug, Clone)]
pub struct MemberProfile {
    pub record: MemberRecord,
    pub joined: Option<DateTime<Utc>>,
}

/// Outcome of a profile mutation with a post-commit side effect.
#[derive(Debug, Clone, Copy)]
pub struct ProfileUpdate {
    pub role_sync_applied: bool,
}

/// Profile operations over the identity store.
pub struct ProfileService {
    store: Arc<dyn IdentityStore>,
    roster: Arc<dyn RosterSource>,
    roles: Arc<dyn RoleManager>,
}

impl ProfileService {
    pub fn new(
        store: Arc<dyn IdentityStore>,
        roster: Arc<dyn RosterSource>,
        roles: Arc<dyn RoleManager>,
    ) -> Self {
        Self {
            store,
            roster,
            roles,
        }
    }

    /// Validate and store a birthday as `dd.mm.yyyy`.
    pub async fn set_birthday(
        &self,
        member: &PlatformId,
        day: u32,
        month: u32,
        year: i32,
    ) -> Result<Birthday, ProfileError> {
        let birthday = Birthday::new(day, month, year)?;
        self.store.set_birthday(member, Some(birthday)).await?;
        Ok(birthday)
    }

    /// Reset the birthday sentinel and revoke the celebratory role.
    pub async fn clear_birthday(&self, member: &PlatformId) -> Result<ProfileUpdate, ProfileError> {
        self.store.set_birthday(member, None).await?;
        let role_sync_applied = match self
            .roles
            .apply(member, RoleDelta::revoke(CommunityRole::Birthday))
            .await
        {
            Ok(()) => true,
            Err(err) => {
                warn!(member = %member, error = %err, "birthday cleared but role revoke failed");
                false
            }
        };
        Ok(ProfileUpdate { role_sync_applied })
    }

    /// Lookup by platform identity, then main, then alt game identity.
    pub async fn resolve_member(&self, identifier: &str) -> Result<MemberRecord, ProfileError> {
        self.store
            .resolve_member(identifier)
            .await?
            .ok_or_else(|| ProfileError::UnknownMember(identifier.to_string()))
    }

    /// Resolved record plus the roster join date for the main identity.
    pub async fn member_profile(&self, identifier: &str) -> Result<MemberProfile, ProfileError> {
        let record = self.resolve_member(identifier).await?;
        let roster = self.roster.fetch().await?;
        let joined = record
            .main
            .game_id
            .as_ref()
            .and_then(|game_id| roster.find(game_id.as_str()))
            .and_then(|entry| entry.joined);
        Ok(MemberProfile { record, joined })
    }
}
