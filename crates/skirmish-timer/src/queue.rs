//! One-shot timers on a min-heap of deadlines.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::fmt;
use std::time::Duration;

use tokio::time::{self, Instant};

/// Handle to a scheduled timer, used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TM-{}", self.0)
    }
}

/// A queue of one-shot timers, each carrying a payload of type `T`.
///
/// Timers with equal deadlines fire in scheduling order: the heap key is
/// `(deadline, id)` and IDs only ever increase.
///
/// Cancellation removes the payload and leaves the heap entry behind. When a
/// dead entry reaches the top it is discarded without firing, so `cancel`
/// is O(1) and the heap is never searched.
pub struct TimerQueue<T> {
    heap: BinaryHeap<Reverse<(Instant, TimerId)>>,
    /// Live timers only. A heap entry whose ID is missing here is dead.
    payloads: HashMap<TimerId, T>,
    next_id: u64,
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            payloads: HashMap::new(),
            next_id: 1,
        }
    }

    /// Schedule `payload` to fire at `deadline`.
    pub fn schedule_at(&mut self, deadline: Instant, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.heap.push(Reverse((deadline, id)));
        self.payloads.insert(id, payload);
        id
    }

    /// Schedule `payload` to fire `delay` from now.
    pub fn schedule_after(&mut self, delay: Duration, payload: T) -> TimerId {
        self.schedule_at(Instant::now() + delay, payload)
    }

    /// Cancel a timer. Returns the payload if the timer was still pending.
    ///
    /// Cancelling a timer that already fired (or was already cancelled) is a
    /// no-op.
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        self.payloads.remove(&id)
    }

    /// Returns `true` if the timer has neither fired nor been cancelled.
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.payloads.contains_key(&id)
    }

    /// Deadline of the earliest live timer.
    pub fn next_deadline(&mut self) -> Option<Instant> {
        self.prune();
        self.heap.peek().map(|Reverse((deadline, _))| *deadline)
    }

    /// Pop the earliest live timer if its deadline is at or before `now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<(TimerId, T)> {
        self.prune();
        let Reverse((deadline, id)) = *self.heap.peek()?;
        if deadline > now {
            return None;
        }
        self.heap.pop();
        let payload = self.payloads.remove(&id)?;
        Some((id, payload))
    }

    /// Sleep until the earliest live timer is due and pop it.
    ///
    /// Pends forever while the queue is empty, so it is safe to use as a
    /// `tokio::select!` branch.
    pub async fn wait_next(&mut self) -> (TimerId, T) {
        loop {
            let Some(deadline) = self.next_deadline() else {
                std::future::pending::<()>().await;
                unreachable!()
            };
            time::sleep_until(deadline).await;
            if let Some(fired) = self.pop_due(Instant::now()) {
                return fired;
            }
        }
    }

    /// Number of live timers.
    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    /// Drop dead entries sitting on top of the heap.
    fn prune(&mut self) {
        while let Some(Reverse((_, id))) = self.heap.peek() {
            if self.payloads.contains_key(id) {
                break;
            }
            self.heap.pop();
        }
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
