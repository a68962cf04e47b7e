//! Matchmaking queue and encounter lifecycle for Skirmish.
//!
//! A single arena runs as one Tokio task (actor model). That task owns the
//! queue, the pending challenges, and every live encounter, and it is the
//! only place any of them are mutated. Timers, dispatch ticks, and commands
//! from the outside all run on it one at a time, so nothing needs a lock.
//!
//! ```text
//! challenge ─→ eligibility ─→ queue ─→ dispatch tick ─→ encounter
//!                                                          │
//!            Summoning ─→ Countdown ─→ Active ─→ Resolved ─┘─→ released
//! ```
//!
//! # Key types
//!
//! - [`Arena`] — the synchronous core; drive it with [`Arena::advance_to`]
//! - [`ArenaHandle`] — send commands to a running arena actor
//! - [`World`] — the collaborator traits the arena calls out to
//! - [`MatchQueue`] — FIFO with O(1) mark-and-skip cancellation
//! - [`Phase`] — encounter lifecycle state machine
//! - [`ArenaConfig`] — team size, intervals, countdown, arena geometry

mod actor;
mod arena;
mod config;
mod eligibility;
mod encounter;
mod error;
mod formation;
mod notify;
mod queue;
mod world;

pub use actor::{spawn_arena, ArenaHandle, DEFAULT_CHANNEL_SIZE};
pub use arena::{Arena, ArenaInfo, ParticipantStatus};
pub use config::{ArenaConfig, Phase};
pub use eligibility::check_eligible;
pub use encounter::{EncounterInfo, EncounterResult, LiveEncounter};
pub use error::{ArenaError, CollaboratorError, Ineligible};
pub use formation::Formation;
pub use notify::Audience;
pub use queue::{MatchQueue, Popped, QueuePlacement, QueueTicket, QueuedMatch};
pub use world::{
    AllianceQuery, CombatantSpawner, LiveParticipant, Notifier, ParticipantDirectory,
    SpawnRequest, World,
};
