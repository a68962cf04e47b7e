//! Who fights whom, with what, and how it ended.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ParticipantId, TemplateId, TypesError};

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// One of the two teams in an encounter.
///
/// Side `A` always belongs to the challenger, side `B` to the challenged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::A, Side::B];

    /// The opposing side.
    pub fn opponent(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => write!(f, "A"),
            Side::B => write!(f, "B"),
        }
    }
}

// ---------------------------------------------------------------------------
// MatchPair
// ---------------------------------------------------------------------------

/// The two participants of a challenge, queued match, or encounter.
///
/// The order is fixed when the challenge is issued: `a` is the challenger
/// and `b` the challenged. Nothing else about the pair is ordered, so the
/// arena looks participants up with [`MatchPair::contains`] and
/// [`MatchPair::side_of`] rather than by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchPair {
    pub a: ParticipantId,
    pub b: ParticipantId,
}

impl MatchPair {
    pub fn new(a: ParticipantId, b: ParticipantId) -> Self {
        Self { a, b }
    }

    /// Returns `true` if `participant` is either side of the pair.
    pub fn contains(&self, participant: ParticipantId) -> bool {
        self.a == participant || self.b == participant
    }

    /// Which side `participant` fights on, if they belong to the pair.
    pub fn side_of(&self, participant: ParticipantId) -> Option<Side> {
        if participant == self.a {
            Some(Side::A)
        } else if participant == self.b {
            Some(Side::B)
        } else {
            None
        }
    }

    /// The participant fighting on `side`.
    pub fn participant(&self, side: Side) -> ParticipantId {
        match side {
            Side::A => self.a,
            Side::B => self.b,
        }
    }

    /// Both participants, challenger first.
    pub fn members(&self) -> [ParticipantId; 2] {
        [self.a, self.b]
    }

    /// Returns `true` if both pairs hold the same two participants, in
    /// either order.
    pub fn same_members(&self, other: &MatchPair) -> bool {
        (self.a == other.a && self.b == other.b) || (self.a == other.b && self.b == other.a)
    }
}

impl fmt::Display for MatchPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} vs {}", self.a, self.b)
    }
}

// ---------------------------------------------------------------------------
// BattleGroup
// ---------------------------------------------------------------------------

/// A validated, immutable snapshot of a participant's loadout.
///
/// Built once at queue time from the player's live loadout. Because the
/// entries are copied into this value, later edits to the live loadout
/// cannot reach an already-queued or already-running match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleGroup {
    entries: Vec<TemplateId>,
}

impl BattleGroup {
    /// Snapshots `entries` into a battle group of exactly `team_size` slots.
    ///
    /// # Errors
    /// - [`TypesError::WrongTeamSize`] if the length differs from `team_size`
    /// - [`TypesError::EmptySlot`] if any slot holds [`TemplateId::EMPTY`]
    pub fn new(entries: &[TemplateId], team_size: usize) -> Result<Self, TypesError> {
        if entries.len() != team_size {
            return Err(TypesError::WrongTeamSize {
                expected: team_size,
                actual: entries.len(),
            });
        }
        if let Some(index) = entries.iter().position(|t| t.is_empty()) {
            return Err(TypesError::EmptySlot { index });
        }
        Ok(Self {
            entries: entries.to_vec(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The template in `slot`, if the slot exists.
    pub fn get(&self, slot: usize) -> Option<TemplateId> {
        self.entries.get(slot).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = TemplateId> + '_ {
        self.entries.iter().copied()
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// How a resolved encounter ended for its participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Victory {
        winner: ParticipantId,
        loser: ParticipantId,
    },
    Tie,
}

impl Outcome {
    /// Compares surviving combatants: strictly more wins, equal ties.
    ///
    /// Used for both resolution paths. On natural completion one side is
    /// at zero, so the comparison reduces to "the emptied side loses".
    pub fn from_remaining(pair: MatchPair, remaining_a: usize, remaining_b: usize) -> Self {
        use std::cmp::Ordering;
        match remaining_a.cmp(&remaining_b) {
            Ordering::Greater => Outcome::Victory {
                winner: pair.a,
                loser: pair.b,
            },
            Ordering::Less => Outcome::Victory {
                winner: pair.b,
                loser: pair.a,
            },
            Ordering::Equal => Outcome::Tie,
        }
    }

    pub fn winner(&self) -> Option<ParticipantId> {
        match self {
            Outcome::Victory { winner, .. } => Some(*winner),
            Outcome::Tie => None,
        }
    }
}

/// What ended an encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    /// One side ran out of combatants.
    Completion,
    /// The match timer ran out.
    Timeout,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Completion => write!(f, "completion"),
            Resolution::Timeout => write!(f, "timeout"),
        }
    }
}
