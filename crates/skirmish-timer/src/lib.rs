//! Cooperative timers for Skirmish.
//!
//! Two building blocks, both driven from a single task:
//!
//! - [`IntervalTimer`] — a fixed-period clock for the dispatch loop, with
//!   overrun handling and a "time left in this interval" query used for
//!   queue ETAs.
//! - [`TimerQueue`] — a min-heap of one-shot deadlines carrying a payload.
//!   Cancelling marks the timer dead; the heap entry is skipped when it
//!   reaches the top.
//!
//! Neither type spawns tasks or takes locks. The owner asks for the next
//! deadline, sleeps until it, and then polls with the current instant:
//!
//! ```ignore
//! loop {
//!     let wake = earliest(clock.next_deadline(), timers.next_deadline());
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* handle commands */ }
//!         _ = sleep_until(wake) => {
//!             let now = Instant::now();
//!             while let Some(info) = clock.poll(now) { /* dispatch */ }
//!             while let Some((_, payload)) = timers.pop_due(now) { /* fire */ }
//!         }
//!     }
//! }
//! ```
//!
//! All instants are [`tokio::time::Instant`], so tests can pause and
//! advance the clock.

mod interval;
mod queue;

pub use interval::{IntervalConfig, IntervalInfo, IntervalMetrics, IntervalPolicy, IntervalTimer};
pub use queue::{TimerId, TimerQueue};
