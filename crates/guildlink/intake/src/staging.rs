//! Per-submitter staging state for stage-one answers.

use dashmap::DashMap;
use guildlink_types::{GameId, PlatformId, StageOneAnswers};
use std::time::{Duration, Instant};
use tracing::debug;

/// Default eviction window for abandoned stage-one submissions.
pub const DEFAULT_STAGING_TTL: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone)]
struct StagedEntry {
    game_id: GameId,
    answers: StageOneAnswers,
    staged_at: Instant,
}

/// Ephemeral staging store scoped by submitter id with TTL-based eviction.
#[derive(Debug)]
pub struct StagingStore {
    entries: DashMap<PlatformId, StagedEntry>,
    ttl: Duration,
}

impl StagingStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Stage (or restage) a submitter's answers together with the game
    /// identity snapshot taken at stage-one time.
    pub fn stage(&self, submitter: PlatformId, game_id: GameId, answers: StageOneAnswers) {
        self.entries.insert(
            submitter,
            StagedEntry {
                game_id,
                answers,
                staged_at: Instant::now(),
            },
        );
    }

    /// Remove and return a submitter's staged answers; expired entries are
    /// evicted and reported as absent.
    pub fn take(&self, submitter: &PlatformId) -> Option<(GameId, StageOneAnswers)> {
        let (_, entry) = self.entries.remove(submitter)?;
        if entry.staged_at.elapsed() > self.ttl {
            debug!(submitter = %submitter, "staged answers expired");
            return None;
        }
        Some((entry.game_id, entry.answers))
    }

    /// Drop every expired entry; called opportunistically by the service.
    pub fn evict_expired(&self) {
        self.entries
            .retain(|_, entry| entry.staged_at.elapsed() <= self.ttl);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for StagingStore {
    fn default() -> Self {
        Self::new(DEFAULT_STAGING_TTL)
    }
}
