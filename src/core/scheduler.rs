//! One-shot cancellable timers on a pluggable clock.
//!
//! Every loop on the board (player advance, global tick, expanded redraw) is a
//! chain of one-shot tasks. The owner of a loop keeps the [`TaskHandle`] of its
//! pending task, cancels it on every transition and re-arms after each fire.
//!
//! Nothing runs by itself: the board pops due tasks with [`Scheduler::pop_due`]
//! and dispatches them on its own thread, so callbacks never overlap.
//!
//! # Timing Model
//!
//! Fixed delay, not drift-corrected: a task armed at `now` with `delay` fires at
//! the first poll where `clock.now() >= now + delay`, and the next link of the
//! chain is armed from the time of that poll.

use std::cell::Cell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::time::{Duration, Instant};

use log::trace;

use crate::entities::PlayerId;

/// Monotonic time source, measured from an arbitrary origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven clock for deterministic playback (tests, offline rendering).
///
/// Clones share the same time, so a test can keep one handle and give the
/// other to the scheduler.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward to `t`. Never goes backwards.
    pub fn set(&self, t: Duration) {
        if t > self.now.get() {
            self.now.set(t);
        }
    }

    pub fn advance(&self, delta: Duration) {
        self.now.set(self.now.get() + delta);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Identity of one scheduled task. Handles are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

/// Who a fired task belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerTarget {
    /// Autonomous frame advance of one player
    Advance(PlayerId),
    /// Global coordinator tick
    GlobalTick,
    /// Expanded view redraw
    Redraw,
}

/// Timer queue ordered by deadline, FIFO among equal deadlines.
pub struct Scheduler {
    clock: Box<dyn Clock>,
    queue: BTreeMap<(Duration, u64), TimerTarget>,
    deadlines: HashMap<u64, Duration>,
    next_id: u64,
}

impl Scheduler {
    pub fn new(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Box::new(clock),
            queue: BTreeMap::new(),
            deadlines: HashMap::new(),
            next_id: 0,
        }
    }

    /// Current clock reading
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Arm a one-shot task `delay` from now.
    pub fn schedule(&mut self, delay: Duration, target: TimerTarget) -> TaskHandle {
        let id = self.next_id;
        self.next_id += 1;
        let deadline = self.clock.now() + delay;
        self.queue.insert((deadline, id), target);
        self.deadlines.insert(id, deadline);
        trace!("Scheduled {:?} as task {} at {:?}", target, id, deadline);
        TaskHandle(id)
    }

    /// Cancel a pending task. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        match self.deadlines.remove(&handle.0) {
            Some(deadline) => {
                self.queue.remove(&(deadline, handle.0));
                trace!("Cancelled task {}", handle.0);
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.deadlines.contains_key(&handle.0)
    }

    /// Number of pending tasks for `target`
    pub fn pending(&self, target: TimerTarget) -> usize {
        self.queue.values().filter(|t| **t == target).count()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Time left until the earliest deadline (zero if already due).
    pub fn time_until_next(&self) -> Option<Duration> {
        let now = self.clock.now();
        self.next_deadline().map(|d| d.saturating_sub(now))
    }

    /// Remove and return the earliest task whose deadline has passed.
    pub fn pop_due(&mut self) -> Option<(TaskHandle, TimerTarget)> {
        let now = self.clock.now();
        let (&(deadline, id), _) = self.queue.iter().next()?;
        if deadline > now {
            return None;
        }
        let target = self.queue.remove(&(deadline, id))?;
        self.deadlines.remove(&id);
        Some((TaskHandle(id), target))
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("now", &self.clock.now())
            .field("pending", &self.queue.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_nothing_due_before_deadline() {
        let clock = ManualClock::new();
        let mut sched = Scheduler::new(clock.clone());

        sched.schedule(ms(100), TimerTarget::GlobalTick);
        assert!(sched.pop_due().is_none());

        clock.advance(ms(99));
        assert!(sched.pop_due().is_none());

        clock.advance(ms(1));
        assert_eq!(sched.pop_due().map(|(_, t)| t), Some(TimerTarget::GlobalTick));
        assert!(sched.is_empty());
    }

    #[test]
    fn test_due_order_by_deadline_then_fifo() {
        let clock = ManualClock::new();
        let mut sched = Scheduler::new(clock.clone());

        sched.schedule(ms(50), TimerTarget::Redraw);
        sched.schedule(ms(10), TimerTarget::Advance(PlayerId(2)));
        sched.schedule(ms(10), TimerTarget::Advance(PlayerId(1)));

        clock.set(ms(60));
        let order: Vec<TimerTarget> = std::iter::from_fn(|| sched.pop_due()).map(|(_, t)| t).collect();
        assert_eq!(
            order,
            vec![
                TimerTarget::Advance(PlayerId(2)),
                TimerTarget::Advance(PlayerId(1)),
                TimerTarget::Redraw,
            ]
        );
    }

    #[test]
    fn test_cancel() {
        let clock = ManualClock::new();
        let mut sched = Scheduler::new(clock.clone());

        let handle = sched.schedule(ms(10), TimerTarget::GlobalTick);
        assert!(sched.is_pending(handle));
        assert!(sched.cancel(handle));
        assert!(!sched.is_pending(handle));
        // Second cancel is a no-op
        assert!(!sched.cancel(handle));

        clock.advance(ms(20));
        assert!(sched.pop_due().is_none());
    }

    #[test]
    fn test_pending_per_target() {
        let mut sched = Scheduler::new(ManualClock::new());
        sched.schedule(ms(10), TimerTarget::Advance(PlayerId(1)));
        sched.schedule(ms(10), TimerTarget::Advance(PlayerId(2)));
        sched.schedule(ms(20), TimerTarget::Advance(PlayerId(1)));

        assert_eq!(sched.pending(TimerTarget::Advance(PlayerId(1))), 2);
        assert_eq!(sched.pending(TimerTarget::Advance(PlayerId(2))), 1);
        assert_eq!(sched.pending(TimerTarget::GlobalTick), 0);
    }

    #[test]
    fn test_time_until_next() {
        let clock = ManualClock::new();
        let mut sched = Scheduler::new(clock.clone());
        assert_eq!(sched.time_until_next(), None);

        sched.schedule(ms(40), TimerTarget::Redraw);
        clock.advance(ms(15));
        assert_eq!(sched.time_until_next(), Some(ms(25)));

        clock.advance(ms(100));
        assert_eq!(sched.time_until_next(), Some(Duration::ZERO));
    }

    #[test]
    fn test_manual_clock_monotonic() {
        let clock = ManualClock::new();
        clock.set(ms(100));
        clock.set(ms(50));
        assert_eq!(clock.now(), ms(100));
    }
}
