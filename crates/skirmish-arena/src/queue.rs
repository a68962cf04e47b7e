//! The matchmaking queue: a FIFO with mark-and-skip cancellation.
//!
//! Cancelling never searches or shifts the FIFO. The cancelled entry's
//! ticket goes into a cancellation set and both participants leave the
//! queued index right away, so they can queue again immediately. The entry
//! itself stays where it is until the dispatch loop pops it, sees the
//! ticket in the set, and throws it away.
//!
//! Entries are told apart by ticket rather than by pair. A pair that
//! cancels and re-queues before the dispatch loop reaches its old entry has
//! two FIFO entries: the old one is skipped, the new one is live.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::time::Duration;

use skirmish_types::{BattleGroup, MatchPair, ParticipantId};
use tokio::time::Instant;

/// Identifies one enqueue of one pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueueTicket(pub u64);

impl fmt::Display for QueueTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q-{}", self.0)
    }
}

/// A pair waiting for a dispatch tick, with both battle groups frozen.
#[derive(Debug, Clone)]
pub struct QueuedMatch {
    pub ticket: QueueTicket,
    pub pair: MatchPair,
    pub group_a: BattleGroup,
    pub group_b: BattleGroup,
    pub enqueued_at: Instant,
}

/// What [`MatchQueue::pop_front`] found at the head.
#[derive(Debug)]
pub enum Popped {
    /// The entry was cancelled earlier; discard it.
    Cancelled(QueuedMatch),
    /// A live entry. Its participants are no longer counted as queued.
    Live(QueuedMatch),
}

/// Where a participant stands in the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuePlacement {
    /// 1-based position among live entries.
    pub position: usize,
    /// Estimated wait until dispatch.
    pub eta: Duration,
}

/// FIFO of queued matches plus the cancellation set.
///
/// Invariant: a participant is in `queued` iff the FIFO holds a
/// non-cancelled entry for their pair.
#[derive(Debug, Default)]
pub struct MatchQueue {
    entries: VecDeque<QueuedMatch>,
    /// Reverse index for O(1) membership and cancel-by-participant.
    queued: HashMap<ParticipantId, (QueueTicket, MatchPair)>,
    /// Tickets whose entries must be skipped when popped.
    cancelled: HashSet<QueueTicket>,
    next_ticket: u64,
}

impl MatchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a match to the tail. Returns its ticket.
    ///
    /// The caller is responsible for having checked eligibility; pushing a
    /// participant who is already queued would break the queue's invariant.
    pub fn push(
        &mut self,
        pair: MatchPair,
        group_a: BattleGroup,
        group_b: BattleGroup,
        enqueued_at: Instant,
    ) -> QueueTicket {
        debug_assert!(!self.contains(pair.a) && !self.contains(pair.b));
        self.next_ticket += 1;
        let ticket = QueueTicket(self.next_ticket);
        for p in pair.members() {
            self.queued.insert(p, (ticket, pair));
        }
        self.entries.push_back(QueuedMatch {
            ticket,
            pair,
            group_a,
            group_b,
            enqueued_at,
        });
        ticket
    }

    /// Cancel the live entry for `pair`, matching its members in either
    /// order. Returns the pair as it was queued, or `None` if it is not.
    pub fn cancel(&mut self, pair: MatchPair) -> Option<MatchPair> {
        let &(ticket, queued_pair) = self.queued.get(&pair.a)?;
        if !queued_pair.same_members(&pair) {
            return None;
        }
        for p in queued_pair.members() {
            self.queued.remove(&p);
        }
        self.cancelled.insert(ticket);
        Some(queued_pair)
    }

    /// Cancel whatever live entry `participant` belongs to.
    pub fn cancel_participant(&mut self, participant: ParticipantId) -> Option<MatchPair> {
        let pair = self.pair_of(participant)?;
        self.cancel(pair)
    }

    /// Pop the head entry, classifying it as cancelled or live.
    pub fn pop_front(&mut self) -> Option<Popped> {
        let entry = self.entries.pop_front()?;
        if self.cancelled.remove(&entry.ticket) {
            return Some(Popped::Cancelled(entry));
        }
        for p in entry.pair.members() {
            self.queued.remove(&p);
        }
        Some(Popped::Live(entry))
    }

    /// Returns `true` if `participant` has a live entry.
    pub fn contains(&self, participant: ParticipantId) -> bool {
        self.queued.contains_key(&participant)
    }

    /// The pair of the live entry `participant` belongs to.
    pub fn pair_of(&self, participant: ParticipantId) -> Option<MatchPair> {
        self.queued.get(&participant).map(|&(_, pair)| pair)
    }

    /// 1-based position of `participant` among live entries.
    ///
    /// Cancelled entries ahead of the participant are not counted: the
    /// dispatch loop will discard them without spending a tick.
    pub fn position_of(&self, participant: ParticipantId) -> Option<usize> {
        let &(ticket, _) = self.queued.get(&participant)?;
        let mut position = 0;
        for entry in &self.entries {
            if self.cancelled.contains(&entry.ticket) {
                continue;
            }
            position += 1;
            if entry.ticket == ticket {
                return Some(position);
            }
        }
        None
    }

    /// Position and estimated wait for `participant`, or `(0, 0)` if not queued.
    ///
    /// `until_next_tick` is the time left in the current dispatch interval.
    /// Each live entry ahead costs one more full `interval`.
    pub fn position_and_eta(
        &self,
        participant: ParticipantId,
        until_next_tick: Duration,
        interval: Duration,
    ) -> (usize, Duration) {
        match self.position_of(participant) {
            Some(position) => {
                let ahead = u32::try_from(position - 1).unwrap_or(u32::MAX);
                (position, until_next_tick + interval.saturating_mul(ahead))
            }
            None => (0, Duration::ZERO),
        }
    }

    /// Number of live (non-cancelled) entries.
    pub fn live_len(&self) -> usize {
        self.entries.len() - self.cancelled.len()
    }

    /// Number of cancelled entries still waiting to be skipped.
    pub fn cancelled_len(&self) -> usize {
        self.cancelled.len()
    }

    /// Returns `true` if the FIFO holds no entries at all, live or cancelled.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop everything. Returns the live entries in queue order.
    pub fn drain_live(&mut self) -> Vec<QueuedMatch> {
        let cancelled = std::mem::take(&mut self.cancelled);
        self.queued.clear();
        self.entries
            .drain(..)
            .filter(|entry| !cancelled.contains(&entry.ticket))
            .collect()
    }
}
