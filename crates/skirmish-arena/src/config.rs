//! Arena configuration and the encounter phase state machine.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use skirmish_types::Position;

use crate::ArenaError;

// ---------------------------------------------------------------------------
// ArenaConfig
// ---------------------------------------------------------------------------

/// Configuration for one arena.
///
/// Every field has a default, so a JSON config only needs the values it
/// wants to change. Durations are written as milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Familiars per side. Every battle group must fill exactly this many slots.
    pub team_size: usize,

    /// Time between dispatch ticks. At most one match starts per interval.
    #[serde(with = "millis")]
    pub battle_interval: Duration,

    /// Seconds counted down before the familiars are allowed to fight.
    pub match_start_countdown: u32,

    /// How long a challenge waits to be accepted.
    #[serde(with = "millis")]
    pub challenge_expiration: Duration,

    /// How long an active encounter may run before it is decided on points.
    #[serde(with = "millis")]
    pub match_timeout: Duration,

    /// Delay between consecutive familiar spawns during summoning.
    #[serde(with = "millis")]
    pub summon_stagger: Duration,

    /// Radius around the arena center whose players see the countdown.
    pub spectate_distance: f32,

    /// Center of the arena floor.
    pub arena_center: Position,

    /// Distance between neighbouring familiars on the same side.
    pub slot_spacing: f32,

    /// Distance from the center to each team's line.
    pub team_separation: f32,

    /// Random jitter (0–max ms) added to the first dispatch tick.
    pub dispatch_jitter_ms: u64,

    /// Number of finished encounters kept for [`ArenaInfo`](crate::ArenaInfo).
    pub result_history: usize,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            team_size: 3,
            battle_interval: Duration::from_secs(30),
            match_start_countdown: 5,
            challenge_expiration: Duration::from_secs(30),
            match_timeout: Duration::from_secs(180),
            summon_stagger: Duration::from_millis(500),
            spectate_distance: 40.0,
            arena_center: Position::default(),
            slot_spacing: 2.5,
            team_separation: 8.0,
            dispatch_jitter_ms: 0,
            result_history: 16,
        }
    }
}

impl ArenaConfig {
    /// Longest countdown accepted, in seconds.
    pub const MAX_COUNTDOWN: u32 = 60;

    /// Parse a config from JSON and validate it.
    ///
    /// # Errors
    /// [`ArenaError::InvalidConfig`] if the JSON is malformed or a value is
    /// out of range.
    pub fn from_json(json: &str) -> Result<Self, ArenaError> {
        let config: ArenaConfig =
            serde_json::from_str(json).map_err(|e| ArenaError::InvalidConfig(e.to_string()))?;
        config.validated()
    }

    /// Reject unusable values and clamp the rest.
    ///
    /// - `team_size` must be at least 1.
    /// - `battle_interval` and `match_timeout` must be non-zero.
    /// - `match_start_countdown` is clamped to `1..=MAX_COUNTDOWN`.
    pub fn validated(mut self) -> Result<Self, ArenaError> {
        if self.team_size == 0 {
            return Err(ArenaError::InvalidConfig("team_size must be at least 1".into()));
        }
        if self.battle_interval.is_zero() {
            return Err(ArenaError::InvalidConfig("battle_interval must be non-zero".into()));
        }
        if self.match_timeout.is_zero() {
            return Err(ArenaError::InvalidConfig("match_timeout must be non-zero".into()));
        }
        let countdown = self.match_start_countdown.clamp(1, Self::MAX_COUNTDOWN);
        if countdown != self.match_start_countdown {
            tracing::warn!(
                requested = self.match_start_countdown,
                clamped = countdown,
                "match_start_countdown out of range, clamping"
            );
            self.match_start_countdown = countdown;
        }
        Ok(self)
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// The lifecycle phase of a live encounter.
///
/// Transitions are strictly ordered:
///
/// ```text
/// Summoning → Countdown → Active → Resolved
/// ```
///
/// - **Summoning**: familiars are being spawned one at a time.
/// - **Countdown**: everyone is in place; a visible count runs to zero.
/// - **Active**: familiars are hostile; ends on timeout or when one side
///   has nothing left standing.
/// - **Resolved**: the result is announced and everything is released.
///
/// A summoning failure skips straight to release without ever reaching
/// `Resolved`; that path is an abort, not a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Summoning,
    Countdown,
    Active,
    Resolved,
}

impl Phase {
    /// The phase that follows this one, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Summoning => Some(Self::Countdown),
            Self::Countdown => Some(Self::Active),
            Self::Active => Some(Self::Resolved),
            Self::Resolved => None,
        }
    }

    /// Returns `true` if moving to `target` follows the strict order.
    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }

    /// Returns `true` while familiars are allowed to fight.
    pub fn is_fighting(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Summoning => write!(f, "Summoning"),
            Self::Countdown => write!(f, "Countdown"),
            Self::Active => write!(f, "Active"),
            Self::Resolved => write!(f, "Resolved"),
        }
    }
}
