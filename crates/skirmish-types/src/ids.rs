//! Identity newtypes.
//!
//! Same pattern throughout: wrap a primitive so the compiler refuses to mix
//! a `CombatantRef` up with a `ParticipantId`, even though both are `u64`
//! underneath. `#[serde(transparent)]` keeps the JSON form a bare number.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A player taking part in arena matchmaking.
///
/// The core never owns player data; it only stores this handle and asks
/// the participant directory for everything else.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ParticipantId(pub u64);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A familiar template a player can put into a battle group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(pub u32);

impl TemplateId {
    /// Sentinel for an unfilled loadout slot.
    pub const EMPTY: TemplateId = TemplateId(0);

    /// Returns `true` if this slot holds the empty sentinel.
    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T-{}", self.0)
    }
}

/// Handle to a combatant spawned in the world by the spawner.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CombatantRef(pub u64);

impl fmt::Display for CombatantRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

/// Identifies one live encounter from promotion to release.
///
/// A pair can fight many times; the encounter ID is what timers hold on to
/// so that a late timer never acts on a newer encounter for the same pair.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EncounterId(pub u64);

impl fmt::Display for EncounterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E-{}", self.0)
    }
}
