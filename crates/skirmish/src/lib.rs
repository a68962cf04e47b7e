//! # Skirmish
//!
//! Matchmaking and encounter orchestration for familiar battles.
//!
//! Two players challenge each other, the pair waits in a queue, and once
//! per battle interval the arena picks the next pair, summons both battle
//! groups, counts down, and lets them fight until one side is wiped out or
//! the match times out. The game world (player lookup, spawning, chat) is
//! supplied through the collaborator traits in [`prelude`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use skirmish::prelude::*;
//!
//! skirmish::init_tracing();
//! let arena = ArenaBuilder::new()
//!     .team_size(3)
//!     .build(World::new(directory, alliances, spawner, notifier))?;
//!
//! arena.challenge(alice, bob).await?;
//! arena.accept(bob).await?;
//! ```

mod builder;
mod error;

pub use builder::ArenaBuilder;
pub use error::SkirmishError;

pub use skirmish_arena as arena;
pub use skirmish_timer as timer;
pub use skirmish_types as types;

use tracing_subscriber::EnvFilter;

/// Installs a `fmt` subscriber filtered by `RUST_LOG` (default `info`).
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

pub mod prelude {
    pub use crate::{init_tracing, ArenaBuilder, SkirmishError};

    pub use skirmish_arena::{
        AllianceQuery, Arena, ArenaConfig, ArenaError, ArenaHandle, ArenaInfo, CollaboratorError,
        CombatantSpawner, EncounterResult, Ineligible, LiveParticipant, Notifier,
        ParticipantDirectory, ParticipantStatus, Phase, QueuePlacement, SpawnRequest, World,
    };
    pub use skirmish_types::{
        BattleGroup, CombatantRef, EncounterId, MatchPair, Notice, Outcome, ParticipantId,
        Position, Resolution, Side, TemplateId,
    };
}
