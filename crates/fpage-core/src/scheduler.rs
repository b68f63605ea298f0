#![forbid(unsafe_code)]

//! Deterministic timer queue and rate limiters.
//!
//! Everything here runs on one cooperative thread. Nothing sleeps: the host
//! advances time and the runtime drains due timers with
//! [`TimerQueue::pop_due`], routing each payload to the component that
//! scheduled it.
//!
//! [`RateLimiter`] tames high-frequency sources (scroll, resize) with one of
//! two policies:
//!
//! | Policy              | First call            | Later calls in window     | Fires with   |
//! |---------------------|-----------------------|---------------------------|--------------|
//! | `LeadingThrottle`   | arms a timer          | only replace the args     | latest args  |
//! | `TrailingDebounce`  | arms a timer          | cancel and re-arm         | latest args  |
//!
//! # Invariants
//!
//! 1. A limiter owns at most one pending timer in the queue.
//! 2. A limiter yields arguments only for its current timer id; a superseded
//!    or cancelled id yields nothing.
//! 3. A disposed limiter never arms again and never yields.
//! 4. Due timers fire in `(due, order)` order; order is insertion order.

use std::time::Duration;

/// Handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    /// Raw id value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Scheduled<T> {
    id: TimerId,
    due: Duration,
    order: u64,
    payload: T,
}

/// Snapshot of a pending timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTimer {
    pub id: TimerId,
    pub due: Duration,
    pub order: u64,
}

/// A timer that came due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<T> {
    pub id: TimerId,
    pub due: Duration,
    pub payload: T,
}

/// Single-threaded timer queue with its own notion of "now".
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    now: Duration,
    next_id: u64,
    next_order: u64,
    tasks: Vec<Scheduled<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    /// Empty queue at time zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 1,
            next_order: 0,
            tasks: Vec::new(),
        }
    }

    /// Current queue time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Schedule `payload` to fire `delay` from now.
    pub fn schedule(&mut self, delay: Duration, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let order = self.next_order;
        self.next_order += 1;
        let due = self.now.saturating_add(delay);
        tracing::trace!(timer = id.0, due_ms = due.as_millis() as u64, "timer scheduled");
        self.tasks.push(Scheduled {
            id,
            due,
            order,
            payload,
        });
        id
    }

    /// Cancel a pending timer. Returns whether it was pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        let removed = self.tasks.len() != before;
        if removed {
            tracing::trace!(timer = id.0, "timer cancelled");
        }
        removed
    }

    /// Whether the timer is still pending.
    #[must_use]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.tasks.iter().any(|t| t.id == id)
    }

    /// Number of pending timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Due time of the earliest pending timer.
    #[must_use]
    pub fn next_due(&self) -> Option<Duration> {
        self.tasks.iter().map(|t| t.due).min()
    }

    /// Remove and return the earliest timer due at or before `until`.
    ///
    /// Queue time moves forward to the fired timer's due time, so anything
    /// scheduled while handling it is placed relative to that instant.
    pub fn pop_due(&mut self, until: Duration) -> Option<Fired<T>> {
        let idx = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= until)
            .min_by_key(|(_, t)| (t.due, t.order))
            .map(|(i, _)| i)?;
        let task = self.tasks.swap_remove(idx);
        self.now = self.now.max(task.due);
        tracing::trace!(timer = task.id.0, "timer fired");
        Some(Fired {
            id: task.id,
            due: task.due,
            payload: task.payload,
        })
    }

    /// Move queue time forward to `until` (never backwards).
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    /// Pending timers sorted by firing order.
    #[must_use]
    pub fn pending(&self) -> Vec<PendingTimer> {
        let mut timers: Vec<PendingTimer> = self
            .tasks
            .iter()
            .map(|t| PendingTimer {
                id: t.id,
                due: t.due,
                order: t.order,
            })
            .collect();
        timers.sort_by_key(|t| (t.due, t.order));
        timers
    }

    /// Drop every pending timer. Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let cleared = self.tasks.len();
        self.tasks.clear();
        cleared
    }
}

/// Rate-limiting policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RatePolicy {
    /// Arm on the first call, ignore re-arming until it fires.
    LeadingThrottle,
    /// Re-arm on every call; fire once the calls stop.
    TrailingDebounce,
}

/// Result of [`RateLimiter::call`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    /// No timer was pending; one was scheduled.
    Armed(TimerId),
    /// The pending timer was cancelled and replaced (debounce).
    Rearmed(TimerId),
    /// A timer is already pending; only the arguments were replaced
    /// (throttle).
    Coalesced,
    /// The limiter was disposed.
    Rejected,
}

/// One pending-timer slot plus the latest arguments.
#[derive(Debug, Clone)]
pub struct RateLimiter<A> {
    policy: RatePolicy,
    interval: Duration,
    pending: Option<TimerId>,
    latest: Option<A>,
    disposed: bool,
}

impl<A> RateLimiter<A> {
    /// Create a limiter.
    #[must_use]
    pub const fn new(policy: RatePolicy, interval: Duration) -> Self {
        Self {
            policy,
            interval,
            pending: None,
            latest: None,
            disposed: false,
        }
    }

    /// Leading-edge throttle.
    #[must_use]
    pub const fn throttle(interval: Duration) -> Self {
        Self::new(RatePolicy::LeadingThrottle, interval)
    }

    /// Trailing-edge debounce.
    #[must_use]
    pub const fn debounce(interval: Duration) -> Self {
        Self::new(RatePolicy::TrailingDebounce, interval)
    }

    /// The policy.
    #[must_use]
    pub const fn policy(&self) -> RatePolicy {
        self.policy
    }

    /// The window length.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Pending timer id, if armed.
    #[must_use]
    pub const fn pending(&self) -> Option<TimerId> {
        self.pending
    }

    /// Whether [`dispose`](Self::dispose) was called.
    #[must_use]
    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Record a call. `token` is the payload routed back when the timer
    /// fires; the caller passes it to [`fire`](Self::fire) with the fired id.
    pub fn call<T>(&mut self, args: A, timers: &mut TimerQueue<T>, token: T) -> CallOutcome {
        if self.disposed {
            return CallOutcome::Rejected;
        }
        self.latest = Some(args);
        match self.policy {
            RatePolicy::LeadingThrottle => {
                if self.pending.is_some() {
                    return CallOutcome::Coalesced;
                }
                let id = timers.schedule(self.interval, token);
                self.pending = Some(id);
                CallOutcome::Armed(id)
            }
            RatePolicy::TrailingDebounce => {
                let superseded = self.pending.take().is_some_and(|old| timers.cancel(old));
                let id = timers.schedule(self.interval, token);
                self.pending = Some(id);
                if superseded {
                    CallOutcome::Rearmed(id)
                } else {
                    CallOutcome::Armed(id)
                }
            }
        }
    }

    /// Claim the arguments for a fired timer.
    ///
    /// Returns `None` for ids this limiter no longer owns.
    pub fn fire(&mut self, id: TimerId) -> Option<A> {
        if self.pending != Some(id) {
            return None;
        }
        self.pending = None;
        if self.disposed {
            return None;
        }
        self.latest.take()
    }

    /// Drop the pending timer and arguments. Returns whether a timer was
    /// pending.
    pub fn cancel<T>(&mut self, timers: &mut TimerQueue<T>) -> bool {
        self.latest = None;
        self.pending.take().is_some_and(|id| timers.cancel(id))
    }

    /// Cancel and refuse all future calls.
    pub fn dispose<T>(&mut self, timers: &mut TimerQueue<T>) {
        self.cancel(timers);
        self.disposed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: fn(u64) -> Duration = Duration::from_millis;

    fn drain<A, T: Copy>(
        limiter: &mut RateLimiter<A>,
        timers: &mut TimerQueue<T>,
        until: Duration,
    ) -> Vec<(Duration, A)> {
        let mut out = Vec::new();
        while let Some(fired) = timers.pop_due(until) {
            if let Some(args) = limiter.fire(fired.id) {
                out.push((fired.due, args));
            }
        }
        timers.settle(until);
        out
    }

    #[test]
    fn queue_fires_in_due_then_insertion_order() {
        let mut q = TimerQueue::new();
        q.schedule(MS(20), "b");
        q.schedule(MS(10), "a");
        q.schedule(MS(20), "c");
        let order: Vec<_> = std::iter::from_fn(|| q.pop_due(MS(100)))
            .map(|f| f.payload)
            .collect();
        assert_eq!(order, vec!["a", "b", "c"]);
        assert_eq!(q.now(), MS(20));
    }

    #[test]
    fn queue_respects_until_and_cancel() {
        let mut q = TimerQueue::new();
        let a = q.schedule(MS(10), 1);
        let b = q.schedule(MS(30), 2);
        assert!(q.cancel(a));
        assert!(!q.cancel(a));
        assert!(q.pop_due(MS(29)).is_none());
        assert!(q.is_pending(b));
        assert_eq!(q.next_due(), Some(MS(30)));
        assert_eq!(q.pop_due(MS(30)).map(|f| f.payload), Some(2));
        assert!(q.is_empty());
    }

    #[test]
    fn timers_scheduled_while_firing_are_relative_to_due_time() {
        let mut q = TimerQueue::new();
        q.schedule(MS(16), 0u32);
        let mut seen = Vec::new();
        while let Some(f) = q.pop_due(MS(50)) {
            seen.push((f.due, f.payload));
            if f.payload < 5 {
                q.schedule(MS(16), f.payload + 1);
            }
        }
        assert_eq!(seen, vec![(MS(16), 0), (MS(32), 1), (MS(48), 2)]);
        assert_eq!(q.pending().len(), 1);
        assert_eq!(q.pending()[0].due, MS(64));
    }

    #[test]
    fn throttle_fires_once_with_last_args() {
        let mut q = TimerQueue::new();
        let mut t = RateLimiter::throttle(MS(100));
        assert!(matches!(t.call(1, &mut q, ()), CallOutcome::Armed(_)));
        assert_eq!(t.call(2, &mut q, ()), CallOutcome::Coalesced);
        assert_eq!(t.call(3, &mut q, ()), CallOutcome::Coalesced);
        assert_eq!(q.len(), 1);

        let fired = drain(&mut t, &mut q, MS(100));
        assert_eq!(fired, vec![(MS(100), 3)]);
        assert!(t.pending().is_none());
    }

    #[test]
    fn throttle_window_does_not_slide() {
        let mut q = TimerQueue::new();
        let mut t = RateLimiter::throttle(MS(100));
        t.call(1, &mut q, ());
        q.settle(MS(90));
        t.call(2, &mut q, ());
        // Still due at 100, not 190.
        assert_eq!(drain(&mut t, &mut q, MS(100)), vec![(MS(100), 2)]);
    }

    #[test]
    fn debounce_fires_after_burst_ends() {
        let mut q = TimerQueue::new();
        let mut d = RateLimiter::debounce(MS(250));
        assert!(matches!(d.call("a", &mut q, ()), CallOutcome::Armed(_)));
        q.settle(MS(100));
        assert!(matches!(d.call("b", &mut q, ()), CallOutcome::Rearmed(_)));
        q.settle(MS(200));
        assert!(matches!(d.call("c", &mut q, ()), CallOutcome::Rearmed(_)));
        assert_eq!(q.len(), 1);

        assert!(drain(&mut d, &mut q, MS(449)).is_empty());
        assert_eq!(drain(&mut d, &mut q, MS(450)), vec![(MS(450), "c")]);
    }

    #[test]
    fn stale_ids_yield_nothing() {
        let mut q = TimerQueue::new();
        let mut d = RateLimiter::debounce(MS(10));
        let CallOutcome::Armed(first) = d.call(1, &mut q, ()) else {
            panic!("expected armed");
        };
        d.call(2, &mut q, ());
        assert_eq!(d.fire(first), None);
        assert!(d.pending().is_some());
    }

    #[test]
    fn dispose_prevents_future_fires() {
        let mut q = TimerQueue::new();
        let mut t = RateLimiter::throttle(MS(100));
        t.call(1, &mut q, ());
        t.dispose(&mut q);
        assert!(q.is_empty());
        assert_eq!(t.call(2, &mut q, ()), CallOutcome::Rejected);
        assert!(q.is_empty());
        assert!(t.is_disposed());
    }

    #[test]
    fn cancel_allows_rearming() {
        let mut q = TimerQueue::new();
        let mut t = RateLimiter::throttle(MS(100));
        t.call(1, &mut q, ());
        assert!(t.cancel(&mut q));
        assert!(!t.cancel(&mut q));
        assert!(matches!(t.call(2, &mut q, ()), CallOutcome::Armed(_)));
        assert_eq!(drain(&mut t, &mut q, MS(100)), vec![(MS(100), 2)]);
    }
}
