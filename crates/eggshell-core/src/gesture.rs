#![forbid(unsafe_code)]

//! Timing gestures built on cancellable one-shot timers.
//!
//! - [`GestureTimer`]: at most one armed timer per gesture; arming again
//!   cancels the previous one first.
//! - [`TimedFlag`]: a flag held true for a fixed duration after each
//!   trigger. Re-triggering restarts the countdown instead of stacking.
//! - [`LongPress`]: press-and-hold activation after a delay.
//! - [`DoubleClickWindow`]: every double-click activates immediately and
//!   (re)starts an "effect active" window.
//!
//! Gestures are generic over the scheduler's payload type: the owner picks
//! the payload it wants back when the timer expires and routes the
//! [`Expired`](crate::scheduler::Expired) token to the gesture's
//! `on_expired`. A token that is not the gesture's live timer is ignored,
//! so a stale expiry can never activate anything.

use std::time::Duration;

use crate::scheduler::{CancelToken, Scheduler};

/// Event emitted by a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureEvent {
    /// The gesture completed.
    Activated,
}

// ---------------------------------------------------------------------------
// GestureTimer
// ---------------------------------------------------------------------------

/// One-shot timer slot with a fixed delay.
#[derive(Debug, Clone)]
pub struct GestureTimer {
    delay: Duration,
    armed: Option<CancelToken>,
}

impl GestureTimer {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay, armed: None }
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Whether a timer is armed and not yet claimed.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// The live timer, if armed.
    #[must_use]
    pub const fn token(&self) -> Option<CancelToken> {
        self.armed
    }

    /// Arm the timer, cancelling any timer already armed.
    pub fn arm<T, S: Scheduler<T>>(&mut self, scheduler: &mut S, payload: T) -> CancelToken {
        self.disarm(scheduler);
        let token = scheduler.after(self.delay, payload);
        self.armed = Some(token);
        token
    }

    /// Cancel the armed timer. Returns `true` if one was pending.
    pub fn disarm<T, S: Scheduler<T>>(&mut self, scheduler: &mut S) -> bool {
        match self.armed.take() {
            Some(token) => scheduler.cancel(token),
            None => false,
        }
    }

    /// Accept an expiry. Returns `true` (and disarms) only for the live token.
    pub fn claim(&mut self, token: CancelToken) -> bool {
        if self.armed == Some(token) {
            self.armed = None;
            true
        } else {
            false
        }
    }
}

// ---------------------------------------------------------------------------
// TimedFlag
// ---------------------------------------------------------------------------

/// A boolean held true for `hold` after the most recent trigger.
#[derive(Debug, Clone)]
pub struct TimedFlag {
    active: bool,
    timer: GestureTimer,
}

impl TimedFlag {
    #[must_use]
    pub const fn new(hold: Duration) -> Self {
        Self {
            active: false,
            timer: GestureTimer::new(hold),
        }
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub const fn hold(&self) -> Duration {
        self.timer.delay()
    }

    /// Set the flag and restart the countdown from zero.
    pub fn trigger<T, S: Scheduler<T>>(&mut self, scheduler: &mut S, payload: T) -> CancelToken {
        self.active = true;
        self.timer.arm(scheduler, payload)
    }

    /// Clear the flag now and drop the countdown.
    pub fn clear<T, S: Scheduler<T>>(&mut self, scheduler: &mut S) {
        self.timer.disarm(scheduler);
        self.active = false;
    }

    /// Route an expiry. Returns `true` if this cleared the flag.
    pub fn on_expired(&mut self, token: CancelToken) -> bool {
        if self.timer.claim(token) {
            self.active = false;
            true
        } else {
            false
        }
    }
}

// ---------------------------------------------------------------------------
// LongPress
// ---------------------------------------------------------------------------

/// Press-and-hold recognizer.
///
/// `press_start` arms the timer (cancel-and-rearm if already armed).
/// `press_end`/`press_cancel` disarm it. The timer's expiry activates the
/// gesture and latches [`is_active`](Self::is_active); the latch is never
/// cleared by the recognizer.
#[derive(Debug, Clone)]
pub struct LongPress {
    timer: GestureTimer,
    active: bool,
}

impl LongPress {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            timer: GestureTimer::new(delay),
            active: false,
        }
    }

    /// Whether a press is being timed.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.timer.is_armed()
    }

    /// Whether the gesture has activated at least once.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.timer.delay()
    }

    pub fn press_start<T, S: Scheduler<T>>(&mut self, scheduler: &mut S, payload: T) -> CancelToken {
        if self.timer.is_armed() {
            crate::debug!("long press re-armed while pending");
        }
        self.timer.arm(scheduler, payload)
    }

    /// Release before the delay. Returns `true` if a pending press was dropped.
    pub fn press_end<T, S: Scheduler<T>>(&mut self, scheduler: &mut S) -> bool {
        self.timer.disarm(scheduler)
    }

    /// Pointer left or touch cancelled; same as a release.
    pub fn press_cancel<T, S: Scheduler<T>>(&mut self, scheduler: &mut S) -> bool {
        self.timer.disarm(scheduler)
    }

    pub fn on_expired(&mut self, token: CancelToken) -> Option<GestureEvent> {
        if !self.timer.claim(token) {
            return None;
        }
        self.active = true;
        Some(GestureEvent::Activated)
    }
}

// ---------------------------------------------------------------------------
// DoubleClickWindow
// ---------------------------------------------------------------------------

/// Double-click recognizer with an extendable effect window.
#[derive(Debug, Clone)]
pub struct DoubleClickWindow {
    effect: TimedFlag,
}

impl DoubleClickWindow {
    #[must_use]
    pub const fn new(window: Duration) -> Self {
        Self {
            effect: TimedFlag::new(window),
        }
    }

    /// Whether the effect window is open.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.effect.is_active()
    }

    #[must_use]
    pub const fn window(&self) -> Duration {
        self.effect.hold()
    }

    /// Always activates; restarts the window from zero.
    pub fn on_double_click<T, S: Scheduler<T>>(
        &mut self,
        scheduler: &mut S,
        payload: T,
    ) -> GestureEvent {
        self.effect.trigger(scheduler, payload);
        GestureEvent::Activated
    }

    /// Route an expiry. Returns `true` if the window closed.
    pub fn on_expired(&mut self, token: CancelToken) -> bool {
        self.effect.on_expired(token)
    }

    /// The underlying flag, for callers that render it directly.
    #[must_use]
    pub const fn flag(&self) -> &TimedFlag {
        &self.effect
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
