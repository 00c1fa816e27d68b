//! Guildlink domain contracts.
//!
//! Shared vocabulary for the identity linking engine: identifiers, the
//! persisted record types, domain events, and the trait seams to the
//! external collaborators (roster, community platform, role management).

#![deny(unsafe_code)]

mod application;
mod events;
pub mod fixtures;
mod gateway;
mod ids;
mod ledger;
mod member;
mod roster;

pub use application::{ApplicationDraft, ApplicationRecord, StageOneAnswers, StageTwoAnswers};
pub use events::{DomainEvent, EventEnvelope, EventSink, NullEventSink, RecordingEventSink};
pub use gateway::{
    Announcer, CommunityGateway, CommunityRole, GatewayError, PlatformBanEntry, RoleDelta,
    RoleManager,
};
pub use ids::{GameId, PlatformId, Slot};
pub use ledger::{BanRecord, WarningRecord, WarningTier};
pub use member::{Birthday, InvalidBirthday, MemberRecord, MembershipStatus, SlotState};
pub use roster::{Roster, RosterEntry};
