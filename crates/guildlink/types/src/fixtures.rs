//! In-process collaborator fakes shared by workflow tests.

use crate::gateway::{
    Announcer, CommunityGateway, CommunityRole, GatewayError, PlatformBanEntry, RoleDelta,
    RoleManager,
};
use crate::ids::PlatformId;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Records every applied role delta; can be told to fail.
#[derive(Debug, Default)]
pub struct RecordingRoleManager {
    deltas: Mutex<Vec<(PlatformId, RoleDelta)>>,
    fail: AtomicBool,
}

impl RecordingRoleManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn applied(&self) -> Vec<(PlatformId, RoleDelta)> {
        self.deltas.lock().map(|d| d.clone()).unwrap_or_default()
    }

    pub fn granted(&self, member: &PlatformId, role: CommunityRole) -> bool {
        self.applied()
            .iter()
            .any(|(m, delta)| m == member && delta.add.contains(&role))
    }
}

#[async_trait]
impl RoleManager for RecordingRoleManager {
    async fn apply(&self, member: &PlatformId, delta: RoleDelta) -> Result<(), GatewayError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(GatewayError::Unavailable("role sync refused".into()));
        }
        if let Ok(mut deltas) = self.deltas.lock() {
            deltas.push((member.clone(), delta));
        }
        Ok(())
    }
}

/// Records announced birthday batches.
#[derive(Debug, Default)]
pub struct RecordingAnnouncer {
    batches: Mutex<Vec<Vec<PlatformId>>>,
}

impl RecordingAnnouncer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batches(&self) -> Vec<Vec<PlatformId>> {
        self.batches.lock().map(|b| b.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Announcer for RecordingAnnouncer {
    async fn announce_birthdays(&self, members: &[PlatformId]) -> Result<(), GatewayError> {
        if let Ok(mut batches) = self.batches.lock() {
            batches.push(members.to_vec());
        }
        Ok(())
    }
}

/// A fixed community membership and ban set.
#[derive(Debug, Default)]
pub struct StaticCommunity {
    members: HashSet<PlatformId>,
    bans: Vec<PlatformBanEntry>,
}

impl StaticCommunity {
    pub fn with_members<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            members: ids.into_iter().map(|id| PlatformId::new(id)).collect(),
            bans: Vec::new(),
        }
    }

    pub fn with_bans(mut self, bans: Vec<PlatformBanEntry>) -> Self {
        self.bans = bans;
        self
    }
}

#[async_trait]
impl CommunityGateway for StaticCommunity {
    async fn member_ids(&self) -> Result<HashSet<PlatformId>, GatewayError> {
        Ok(self.members.clone())
    }

    async fn ban_entries(&self) -> Result<Vec<PlatformBanEntry>, GatewayError> {
        Ok(self.bans.clone())
    }
}
