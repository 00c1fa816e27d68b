//! Watchlist upkeep on member records.

use crate::error::ModerationError;
use guildlink_store::{IdentityStore, MemberStore};
use guildlink_types::MemberRecord;
use std::sync::Arc;
use tracing::info;

/// Watchlist operations. Listing state lives on the member record itself.
pub struct WatchlistService {
    store: Arc<dyn IdentityStore>,
}

impl WatchlistService {
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self { store }
    }

    /// Put a member on the watchlist. Repeating an identical call is
    /// accepted and leaves the same state.
    pub async fn set(&self, identifier: &str, reason: &str) -> Result<(), ModerationError> {
        let record = self.resolve(identifier).await?;
        self.store
            .set_watchlist(&record.platform_id, Some(reason.to_string()))
            .await?;
        info!(member = %record.platform_id, "added to watchlist");
        Ok(())
    }

    /// Take a member off the watchlist; fails `NotOnWatchlist` when the
    /// member is not currently listed.
    pub async fn clear(&self, identifier: &str) -> Result<(), ModerationError> {
        let record = self.resolve(identifier).await?;
        if !record.on_watchlist() {
            return Err(ModerationError::NotOnWatchlist(identifier.to_string()));
        }
        self.store.set_watchlist(&record.platform_id, None).await?;
        info!(member = %record.platform_id, "removed from watchlist");
        Ok(())
    }

    async fn resolve(&self, identifier: &str) -> Result<MemberRecord, ModerationError> {
        self.store
            .resolve_member(identifier)
            .await?
            .ok_or_else(|| ModerationError::UnknownMember(identifier.to_string()))
    }
}
