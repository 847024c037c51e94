#![forbid(unsafe_code)]

//! Transient visual state read by the render loop.
//!
//! [`EffectState`] is mutated by pointer motion (the trail) and by
//! recognizer outcomes (confetti, reveal flags). It holds no drawing code;
//! [`crate::render`] turns it into pixels every frame.

use std::collections::VecDeque;
use std::time::Duration;

use crate::gesture::{DoubleClickWindow, GestureEvent, TimedFlag};
use crate::scheduler::{CancelToken, Scheduler};

/// Default number of trail points kept.
pub const TRAIL_CAPACITY: usize = 10;

/// One pointer sample. Its age is its index in the [`TrailBuffer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    pub x: f64,
    pub y: f64,
}

/// Capacity-bounded pointer history, oldest first.
#[derive(Debug, Clone)]
pub struct TrailBuffer {
    points: VecDeque<TrailPoint>,
    capacity: usize,
}

impl TrailBuffer {
    /// A buffer holding at most `capacity` points (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Append a point, evicting the oldest beyond capacity.
    pub fn push(&mut self, x: f64, y: f64) {
        self.points.push_back(TrailPoint { x, y });
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    /// Points ordered oldest (index 0) to newest.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &TrailPoint> {
        self.points.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent point.
    #[must_use]
    pub fn last(&self) -> Option<TrailPoint> {
        self.points.back().copied()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

impl Default for TrailBuffer {
    fn default() -> Self {
        Self::new(TRAIL_CAPACITY)
    }
}

/// Drawing-surface size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// All visual state for one page session.
#[derive(Debug, Clone)]
pub struct EffectState {
    trail: TrailBuffer,
    confetti: DoubleClickWindow,
    secret_reveal: TimedFlag,
    konami_reveal: TimedFlag,
    viewport: Viewport,
}

impl EffectState {
    #[must_use]
    pub fn new(
        trail_capacity: usize,
        confetti_window: Duration,
        secret_reveal: Duration,
        konami_reveal: Duration,
    ) -> Self {
        Self {
            trail: TrailBuffer::new(trail_capacity),
            confetti: DoubleClickWindow::new(confetti_window),
            secret_reveal: TimedFlag::new(secret_reveal),
            konami_reveal: TimedFlag::new(konami_reveal),
            viewport: Viewport::default(),
        }
    }

    // --- trail ---

    pub fn push_trail_point(&mut self, x: f64, y: f64) {
        self.trail.push(x, y);
    }

    #[must_use]
    pub fn trail(&self) -> &TrailBuffer {
        &self.trail
    }

    /// Trail points, oldest first.
    pub fn trail_points(&self) -> impl ExactSizeIterator<Item = &TrailPoint> {
        self.trail.iter()
    }

    // --- confetti ---

    #[must_use]
    pub const fn is_confetti_active(&self) -> bool {
        self.confetti.is_active()
    }

    /// Start or extend the confetti window.
    pub fn trigger_confetti<T, S: Scheduler<T>>(
        &mut self,
        scheduler: &mut S,
        payload: T,
    ) -> GestureEvent {
        self.confetti.on_double_click(scheduler, payload)
    }

    /// Returns `true` if this expiry ended the confetti.
    pub fn expire_confetti(&mut self, token: CancelToken) -> bool {
        self.confetti.on_expired(token)
    }

    // --- reveal flags ---

    #[must_use]
    pub const fn is_secret_revealed(&self) -> bool {
        self.secret_reveal.is_active()
    }

    #[must_use]
    pub const fn is_konami_revealed(&self) -> bool {
        self.konami_reveal.is_active()
    }

    pub fn reveal_secret<T, S: Scheduler<T>>(&mut self, scheduler: &mut S, payload: T) {
        self.secret_reveal.trigger(scheduler, payload);
    }

    pub fn reveal_konami<T, S: Scheduler<T>>(&mut self, scheduler: &mut S, payload: T) {
        self.konami_reveal.trigger(scheduler, payload);
    }

    /// Returns `true` if this expiry ended the secret-code reveal.
    pub fn expire_secret_reveal(&mut self, token: CancelToken) -> bool {
        self.secret_reveal.on_expired(token)
    }

    /// Returns `true` if this expiry ended the Konami reveal.
    pub fn expire_konami_reveal(&mut self, token: CancelToken) -> bool {
        self.konami_reveal.on_expired(token)
    }

    // --- viewport ---

    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = Viewport { width, height };
    }
}

impl Default for EffectState {
    fn default() -> Self {
        Self::new(
            TRAIL_CAPACITY,
            Duration::from_millis(5000),
            Duration::from_millis(3000),
            Duration::from_millis(5000),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualScheduler;
    use pretty_assertions::assert_eq;

    fn xs(trail: &TrailBuffer) -> Vec<f64> {
        trail.iter().map(|p| p.x).collect()
    }

    #[test]
    fn trail_keeps_last_ten_oldest_first() {
        let mut t = TrailBuffer::default();
        for i in 0..15 {
            t.push(f64::from(i), 0.0);
        }
        assert_eq!(t.len(), 10);
        assert_eq!(xs(&t), (5..15).map(f64::from).collect::<Vec<_>>());
        assert_eq!(t.last(), Some(TrailPoint { x: 14.0, y: 0.0 }));
    }

    #[test]
    fn trail_under_capacity_keeps_everything() {
        let mut t = TrailBuffer::default();
        t.push(1.0, 2.0);
        t.push(3.0, 4.0);
        assert_eq!(
            t.iter().copied().collect::<Vec<_>>(),
            vec![TrailPoint { x: 1.0, y: 2.0 }, TrailPoint { x: 3.0, y: 4.0 }]
        );
    }

    #[test]
    fn trail_capacity_floor_is_one() {
        let mut t = TrailBuffer::new(0);
        t.push(1.0, 1.0);
        t.push(2.0, 2.0);
        assert_eq!(t.capacity(), 1);
        assert_eq!(xs(&t), vec![2.0]);
    }

    #[test]
    fn empty_state_is_quiet() {
        let s = EffectState::default();
        assert_eq!(s.trail_points().len(), 0);
        assert!(!s.is_confetti_active());
        assert!(!s.is_secret_revealed());
        assert!(!s.is_konami_revealed());
        assert_eq!(s.viewport(), Viewport::default());
    }

    #[test]
    fn confetti_window_lapses() {
        let mut sched = ManualScheduler::new();
        let mut s = EffectState::default();
        s.trigger_confetti(&mut sched, ());
        assert!(s.is_confetti_active());
        sched.advance(Duration::from_millis(5000));
        for e in sched.poll_expired() {
            s.expire_confetti(e.token);
        }
        assert!(!s.is_confetti_active());
    }

    #[test]
    fn reveal_flags_are_independent() {
        let mut sched = ManualScheduler::new();
        let mut s = EffectState::default();
        let secret = {
            s.reveal_secret(&mut sched, "secret");
            sched.next_deadline()
        };
        s.reveal_konami(&mut sched, "konami");
        assert_eq!(secret, Some(Duration::from_millis(3000)));

        sched.advance(Duration::from_millis(3000));
        for e in sched.poll_expired() {
            assert_eq!(e.payload, "secret");
            assert!(s.expire_secret_reveal(e.token));
            assert!(!s.expire_konami_reveal(e.token));
        }
        assert!(!s.is_secret_revealed());
        assert!(s.is_konami_revealed());
    }

    #[test]
    fn viewport_follows_resize() {
        let mut s = EffectState::default();
        s.set_viewport(1280, 720);
        assert_eq!(
            s.viewport(),
            Viewport {
                width: 1280,
                height: 720
            }
        );
    }
}
