//! Error types for the arena layer.

use skirmish_types::{EncounterId, ParticipantId};

/// Why a pair may not be queued.
///
/// Returned synchronously to the requester. Nothing changes in the arena
/// when eligibility fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Ineligible {
    /// One side is already in the queue or in a running encounter.
    #[error("{0} already queued")]
    AlreadyQueued(ParticipantId),

    /// One or both sides lack a complete battle group.
    #[error("incomplete battle group for {}", list(.0))]
    IncompleteGroup(Vec<ParticipantId>),

    /// One or both loadouts hold more than `team_size` entries.
    #[error("battle group too large for {}", list(.0))]
    OversizedGroup(Vec<ParticipantId>),
}

fn list(participants: &[ParticipantId]) -> String {
    participants
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" and ")
}

/// Errors that can occur during arena operations.
#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    /// A participant tried to challenge themselves.
    #[error("{0} cannot challenge themselves")]
    SelfChallenge(ParticipantId),

    /// The participant already has a challenge, queued match, or encounter.
    #[error("{0} is already in a challenge, queue, or battle")]
    Busy(ParticipantId),

    /// There is no pending challenge involving this participant.
    #[error("no pending challenge for {0}")]
    NoPendingChallenge(ParticipantId),

    /// Only the challenged participant may accept.
    #[error("{0} cannot accept their own challenge")]
    NotChallenged(ParticipantId),

    /// The participant is not waiting in the queue.
    #[error("{0} is not queued")]
    NotQueued(ParticipantId),

    /// The pair failed the eligibility check.
    #[error(transparent)]
    Ineligible(#[from] Ineligible),

    /// No live encounter has this ID.
    #[error("encounter {0} not found")]
    UnknownEncounter(EncounterId),

    /// The configuration was rejected.
    #[error("invalid arena config: {0}")]
    InvalidConfig(String),

    /// The arena's command channel is full or closed.
    #[error("arena is unavailable")]
    Unavailable,
}

/// A failure reported by a collaborator implementation.
///
/// The arena never propagates these to callers. They are logged, turned
/// into cleanup, and reported to the affected players as a notice.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollaboratorError {
    /// The participant directory could not answer.
    #[error("participant lookup failed: {0}")]
    Lookup(String),

    /// The spawner could not create a familiar.
    #[error("spawn failed: {0}")]
    Spawn(String),
}
