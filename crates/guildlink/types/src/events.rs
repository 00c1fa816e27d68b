//! Domain events emitted by the workflows.
//!
//! The presentation layer consumes these for rendering and moderator
//! notification; the engine never blocks on a sink.

use crate::ids::{GameId, PlatformId, Slot};
use crate::ledger::WarningTier;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use uuid::Uuid;

/// Events with notification value for moderators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainEvent {
    /// A claim on a game identity already held by another member record.
    ConflictDetected {
        claimed: GameId,
        claimant: PlatformId,
        holder: PlatformId,
    },
    /// A warning was added; the tier selects the notification template.
    WarningEscalated {
        member: PlatformId,
        tier: WarningTier,
        total: u32,
    },
    /// A slot was reset to its sentinel.
    MemberUnlinked {
        member: PlatformId,
        slot: Slot,
        game_id: GameId,
    },
}

/// An event with identity and emission time attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: Uuid,
    pub emitted_at: DateTime<Utc>,
    pub event: DomainEvent,
}

impl EventEnvelope {
    pub fn new(event: DomainEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            emitted_at: Utc::now(),
            event,
        }
    }
}

/// Consumer seam for domain events.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, envelope: EventEnvelope);
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct NullEventSink;

#[async_trait]
impl EventSink for NullEventSink {
    async fn publish(&self, _envelope: EventEnvelope) {}
}

/// Buffers events for inspection; used by tests and the runtime's
/// diagnostics surface.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<EventEnvelope>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<EventEnvelope> {
        self.events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> Vec<EventEnvelope> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl EventSink for RecordingEventSink {
    async fn publish(&self, envelope: EventEnvelope) {
        if let Ok(mut events) = self.events.lock() {
            events.push(envelope);
        }
    }
}
