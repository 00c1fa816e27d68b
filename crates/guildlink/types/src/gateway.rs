//! Trait seams to the external platform collaborators.
//!
//! The community connection itself (sessions, command parsing, rendering) is
//! out of scope; these traits carry only the data contracts the engine
//! needs: the current member-id set, the authoritative ban set, desired
//! role-state changes, and the batched celebratory announcement.

use crate::ids::PlatformId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Failure talking to the community platform.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("platform gateway unavailable: {0}")]
    Unavailable(String),

    #[error("platform rejected the request: {0}")]
    Rejected(String),
}

/// Read-only view of the community platform's membership and ban state.
#[async_trait]
pub trait CommunityGateway: Send + Sync {
    /// Identifiers of everyone currently in the community.
    async fn member_ids(&self) -> Result<HashSet<PlatformId>, GatewayError>;

    /// The platform's authoritative ban set.
    async fn ban_entries(&self) -> Result<Vec<PlatformBanEntry>, GatewayError>;
}

/// One entry of the platform's authoritative ban set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformBanEntry {
    pub platform_id: PlatformId,
    pub reason: Option<String>,
}

/// Roles the engine manages on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommunityRole {
    /// Granted when a member verifies a game identity.
    Verified,
    /// Granted for the day of a member's birthday.
    Birthday,
}

/// Desired add/remove role-set for one member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDelta {
    pub add: Vec<CommunityRole>,
    pub remove: Vec<CommunityRole>,
}

impl RoleDelta {
    pub fn grant(role: CommunityRole) -> Self {
        Self {
            add: vec![role],
            remove: Vec::new(),
        }
    }

    pub fn revoke(role: CommunityRole) -> Self {
        Self {
            add: Vec::new(),
            remove: vec![role],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}

/// Applies desired role state; called after record writes commit.
#[async_trait]
pub trait RoleManager: Send + Sync {
    async fn apply(&self, member: &PlatformId, delta: RoleDelta) -> Result<(), GatewayError>;
}

/// Posts the single batched celebratory announcement.
#[async_trait]
pub trait Announcer: Send + Sync {
    async fn announce_birthdays(&self, members: &[PlatformId]) -> Result<(), GatewayError>;
}
