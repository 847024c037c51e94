#![forbid(unsafe_code)]

//! Deferred work: one-shot timers and display-frame requests.
//!
//! Timers do not carry closures. Each armed timer holds a typed payload and
//! a [`CancelToken`]; when its deadline passes, [`Scheduler::poll_expired`]
//! hands the payload back to the owner, which decides what the expiry means.
//! This keeps every state transition on the caller's stack and makes the
//! whole subsystem replayable under a fake clock.
//!
//! # Invariants
//!
//! 1. A cancelled timer is never returned by `poll_expired`.
//! 2. Cancelling a fired or already-cancelled timer is a no-op returning `false`.
//! 3. Expired timers are returned in deadline order; equal deadlines keep
//!    arming order.
//! 4. Each timer is returned at most once.
//! 5. The clock never moves backwards.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Handle identifying one armed timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CancelToken(u64);

impl CancelToken {
    /// Raw id, for logs.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// A timer whose deadline has passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expired<T> {
    pub token: CancelToken,
    pub deadline: Duration,
    pub payload: T,
}

/// Capability for arming and cancelling one-shot timers.
///
/// Time is a monotonic offset from an arbitrary origin (page load, test
/// start).
pub trait Scheduler<T> {
    /// Current monotonic time.
    fn now(&self) -> Duration;

    /// Arm a one-shot timer firing `delay` from now.
    fn after(&mut self, delay: Duration, payload: T) -> CancelToken;

    /// Disarm a pending timer. Returns `true` only if it was still pending.
    fn cancel(&mut self, token: CancelToken) -> bool;

    /// Whether the timer is armed and has not fired yet.
    fn is_pending(&self, token: CancelToken) -> bool;

    /// Remove and return every timer whose deadline is `<= now()`.
    fn poll_expired(&mut self) -> Vec<Expired<T>>;

    /// Deadline of the earliest pending timer.
    fn next_deadline(&self) -> Option<Duration>;
}

/// Capability for requesting the next display frame.
pub trait FrameScheduler {
    /// Ask the platform to run the frame callback once more.
    fn request_frame(&mut self);
}

/// Counts frame requests; the no-platform frame scheduler.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameCounter {
    pub requested: u64,
}

impl FrameScheduler for FrameCounter {
    fn request_frame(&mut self) {
        self.requested += 1;
    }
}

// ---------------------------------------------------------------------------
// ManualScheduler
// ---------------------------------------------------------------------------

/// Deterministic scheduler driven by an explicitly advanced clock.
///
/// Tests advance it by hand; the web front end sets it from the frame
/// timestamp on every animation frame.
#[derive(Debug, Clone)]
pub struct ManualScheduler<T> {
    now: Duration,
    next_id: u64,
    queue: BTreeMap<(Duration, u64), T>,
    deadlines: HashMap<u64, Duration>,
}

impl<T> Default for ManualScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ManualScheduler<T> {
    /// Create a scheduler with the clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            queue: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }

    /// Move the clock to `now`. Earlier values are ignored.
    pub fn set(&mut self, now: Duration) {
        if now > self.now {
            self.now = now;
        }
    }

    /// Advance the clock by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }

    /// Number of armed timers.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }
}

impl<T> Scheduler<T> for ManualScheduler<T> {
    fn now(&self) -> Duration {
        self.now
    }

    fn after(&mut self, delay: Duration, payload: T) -> CancelToken {
        let id = self.next_id;
        self.next_id += 1;
        let deadline = self.now.saturating_add(delay);
        self.queue.insert((deadline, id), payload);
        self.deadlines.insert(id, deadline);
        crate::trace!(timer = id, deadline_ms = deadline.as_millis() as u64, "timer armed");
        CancelToken(id)
    }

    fn cancel(&mut self, token: CancelToken) -> bool {
        match self.deadlines.remove(&token.0) {
            Some(deadline) => {
                self.queue.remove(&(deadline, token.0));
                crate::trace!(timer = token.0, "timer cancelled");
                true
            }
            None => {
                crate::trace!(timer = token.0, "cancel of unknown or fired timer");
                false
            }
        }
    }

    fn is_pending(&self, token: CancelToken) -> bool {
        self.deadlines.contains_key(&token.0)
    }

    fn poll_expired(&mut self) -> Vec<Expired<T>> {
        let mut expired = Vec::new();
        while let Some(entry) = self.queue.first_entry() {
            let (deadline, id) = *entry.key();
            if deadline > self.now {
                break;
            }
            let payload = entry.remove();
            self.deadlines.remove(&id);
            expired.push(Expired {
                token: CancelToken(id),
                deadline,
                payload,
            });
        }
        expired
    }

    fn next_deadline(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
