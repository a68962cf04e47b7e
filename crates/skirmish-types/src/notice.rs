//! Status notices delivered to players and spectators.
//!
//! The arena never formats chat text itself beyond the English fallback in
//! `Display`. A notifier that localizes can match on the variant and use
//! the structured fields instead.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{EncounterId, MatchPair, Outcome, ParticipantId, Resolution, Side};

/// Everything the arena tells the outside world.
///
/// `#[serde(tag = "type")]` gives the internally tagged shape
/// `{ "type": "Countdown", "remaining": 3 }`, which is what chat bridges
/// and client overlays consume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Notice {
    // -- Challenges --

    /// Sent to both: a challenge is waiting for the target to accept.
    ChallengeIssued {
        challenger: ParticipantId,
        target: ParticipantId,
        expires_in_secs: u64,
    },

    /// Sent to both: nobody accepted in time.
    ChallengeExpired { pair: MatchPair },

    /// Sent to the challenger: the target said no.
    ChallengeDeclined { by: ParticipantId },

    /// Sent to both: the accepted challenge failed the eligibility check.
    ChallengeRejected { reason: String },

    // -- Queue --

    /// Sent to both on enqueue: where they stand and how long to wait.
    Queued { position: usize, eta_secs: u64 },

    /// Sent to both: one side left the queue.
    QueueCancelled { by: ParticipantId },

    /// Sent to both: the match reached the front but could not start.
    MatchAbandoned { pair: MatchPair, reason: String },

    // -- Encounter --

    /// Sent to both: the match was picked and familiars are being summoned.
    Summoning { encounter: EncounterId, pair: MatchPair },

    /// Sent to participants and spectators once per second before the fight.
    Countdown { remaining: u32 },

    /// Broadcast near the arena when hostilities open.
    BattleBegins { pair: MatchPair },

    /// Sent to both when the encounter resolves.
    BattleOver {
        pair: MatchPair,
        outcome: Outcome,
        resolution: Resolution,
    },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::ChallengeIssued {
                challenger,
                target,
                expires_in_secs,
            } => write!(
                f,
                "{challenger} challenged {target} to a familiar battle (expires in {expires_in_secs}s)"
            ),
            Notice::ChallengeExpired { pair } => {
                write!(f, "The challenge between {} and {} has expired", pair.a, pair.b)
            }
            Notice::ChallengeDeclined { by } => write!(f, "{by} declined the challenge"),
            Notice::ChallengeRejected { reason } => {
                write!(f, "The challenge could not be queued: {reason}")
            }
            Notice::Queued { position, eta_secs } => write!(
                f,
                "Queued for the arena at position {position}, estimated start in {eta_secs}s"
            ),
            Notice::QueueCancelled { by } => write!(f, "{by} left the arena queue"),
            Notice::MatchAbandoned { pair, reason } => {
                write!(f, "The battle {pair} could not start: {reason}")
            }
            Notice::Summoning { pair, .. } => {
                write!(f, "The battle {pair} is about to begin, summoning familiars")
            }
            Notice::Countdown { remaining } => write!(f, "{remaining}..."),
            Notice::BattleBegins { pair } => write!(f, "Fight! {pair}"),
            Notice::BattleOver {
                outcome, resolution, ..
            } => match (outcome, resolution) {
                (Outcome::Victory { winner, loser }, Resolution::Completion) => {
                    write!(f, "{winner} has defeated {loser}")
                }
                (Outcome::Victory { winner, loser }, Resolution::Timeout) => write!(
                    f,
                    "Time is up! {winner} beats {loser} with more familiars standing"
                ),
                (Outcome::Tie, _) => write!(f, "The battle ended in a tie"),
            },
        }
    }
}

impl Notice {
    /// The side-neutral result notice for a resolved encounter.
    pub fn battle_over(pair: MatchPair, outcome: Outcome, resolution: Resolution) -> Self {
        Notice::BattleOver {
            pair,
            outcome,
            resolution,
        }
    }

    /// Returns `true` for the once-per-second countdown notices.
    pub fn is_countdown(&self) -> bool {
        matches!(self, Notice::Countdown { .. })
    }

    /// For a result notice, which side won (if any).
    pub fn winning_side(&self) -> Option<Side> {
        match self {
            Notice::BattleOver {
                pair,
                outcome: Outcome::Victory { winner, .. },
                ..
            } => pair.side_of(*winner),
            _ => None,
        }
    }
}
