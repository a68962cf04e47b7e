//! Shared vocabulary for Skirmish.
//!
//! Every other crate in the workspace speaks in these types:
//!
//! - **Identity** ([`ParticipantId`], [`CombatantRef`], [`TemplateId`],
//!   [`EncounterId`]) — newtype wrappers so a combatant handle can never be
//!   passed where a player is expected.
//! - **Battle** ([`MatchPair`], [`Side`], [`BattleGroup`], [`Outcome`]) —
//!   who fights whom, with what, and how it ended.
//! - **Geometry** ([`Position`]) — world coordinates for the arena.
//! - **Notices** ([`Notice`]) — the status text delivered to players.
//!
//! ```text
//! Arena (above)  ← queues, encounters, timers
//!     ↕
//! Types (this crate)  ← plain data, no behavior beyond validation
//! ```

mod battle;
mod error;
mod geometry;
mod ids;
mod notice;

pub use battle::{BattleGroup, MatchPair, Outcome, Resolution, Side};
pub use error::TypesError;
pub use geometry::Position;
pub use ids::{CombatantRef, EncounterId, ParticipantId, TemplateId};
pub use notice::Notice;
