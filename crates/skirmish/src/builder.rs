//! `ArenaBuilder`: configure an arena and start its actor.

use std::time::Duration;

use skirmish_arena::{spawn_arena, Arena, ArenaConfig, ArenaHandle, World, DEFAULT_CHANNEL_SIZE};

use crate::SkirmishError;

/// Builder for configuring and starting an arena.
///
/// # Example
///
/// ```rust,ignore
/// use skirmish::prelude::*;
///
/// let arena = ArenaBuilder::new()
///     .battle_interval(Duration::from_secs(20))
///     .countdown(3)
///     .build(world)?;
/// ```
#[derive(Debug, Clone)]
pub struct ArenaBuilder {
    config: ArenaConfig,
    channel_size: usize,
}

impl ArenaBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ArenaConfig::default(),
            channel_size: DEFAULT_CHANNEL_SIZE,
        }
    }

    /// Replaces the whole arena configuration.
    pub fn config(mut self, config: ArenaConfig) -> Self {
        self.config = config;
        self
    }

    /// Loads the arena configuration from JSON. Missing fields keep their defaults.
    ///
    /// # Errors
    /// [`SkirmishError::Arena`] if the JSON is malformed or out of range.
    pub fn config_json(mut self, json: &str) -> Result<Self, SkirmishError> {
        self.config = ArenaConfig::from_json(json)?;
        Ok(self)
    }

    pub fn team_size(mut self, team_size: usize) -> Self {
        self.config.team_size = team_size;
        self
    }

    pub fn battle_interval(mut self, interval: Duration) -> Self {
        self.config.battle_interval = interval;
        self
    }

    /// Seconds counted down before a battle starts.
    pub fn countdown(mut self, seconds: u32) -> Self {
        self.config.match_start_countdown = seconds;
        self
    }

    pub fn match_timeout(mut self, timeout: Duration) -> Self {
        self.config.match_timeout = timeout;
        self
    }

    /// Bound of the command channel between handles and the actor.
    pub fn channel_size(mut self, size: usize) -> Self {
        self.channel_size = size;
        self
    }

    /// Builds the arena core without starting an actor.
    ///
    /// Useful for driving the arena by hand, e.g. from a game loop that
    /// already owns a timer.
    pub fn build_core(self, world: World) -> Result<Arena, SkirmishError> {
        Ok(Arena::new(self.config, world)?)
    }

    /// Builds the arena and spawns its actor on the current Tokio runtime.
    ///
    /// # Errors
    /// [`SkirmishError::Arena`] if the configuration is invalid.
    pub fn build(self, world: World) -> Result<ArenaHandle, SkirmishError> {
        let channel_size = self.channel_size;
        let arena = self.build_core(world)?;
        tracing::info!(channel_size, "arena actor spawning");
        Ok(spawn_arena(arena, channel_size))
    }
}

impl Default for ArenaBuilder {
    fn default() -> Self {
        Self::new()
    }
}
