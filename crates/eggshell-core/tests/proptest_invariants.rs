//! Property-based invariant tests for the recognizers and effect state.
//!
//! Verifies:
//! 1. Prefix matcher progress stays below the pattern length
//! 2. Window matcher progress never exceeds the pattern length
//! 3. Window matcher completes exactly when the last N tokens equal the pattern
//! 4. Prefix matcher completions equal the count of clean pattern runs
//! 5. Trail length never exceeds capacity and keeps the newest points
//! 6. Cancelled timers never fire; uncancelled ones fire exactly once, in order
//! 7. A long press released before the delay never activates
//! 8. Confetti always paints the configured piece count inside the surface

use std::time::Duration;

use eggshell_core::effects::{EffectState, TrailBuffer};
use eggshell_core::event::{InputEvent, PointerPhase, Target};
use eggshell_core::render::{ConfettiRng, ConfettiStyle, DrawOp, RecordingSurface, paint_confetti};
use eggshell_core::scheduler::{ManualScheduler, Scheduler};
use eggshell_core::sequence::{Pattern, PrefixMatcher, SequenceMatcher, WindowMatcher};
use eggshell_core::{EasterEggs, EggConfig, Notification};
use proptest::prelude::*;

// ── Strategy helpers ──────────────────────────────────────────────────

fn arb_pattern() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(1u8..=4, 1..=6)
}

fn arb_tokens() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0u8..=5, 0..64)
}

/// Reference: number of completions of a prefix-reset matcher, computed by
/// replaying the hard-reset rule directly.
fn reference_prefix_completions(pattern: &[u8], tokens: &[u8]) -> usize {
    let mut cursor = 0;
    let mut completions = 0;
    for &t in tokens {
        if pattern[cursor] == t {
            cursor += 1;
            if cursor == pattern.len() {
                completions += 1;
                cursor = 0;
            }
        } else {
            cursor = 0;
        }
    }
    completions
}

proptest! {
    // 1
    #[test]
    fn prefix_progress_bounded(pattern in arb_pattern(), tokens in arb_tokens()) {
        let len = pattern.len();
        let mut m = PrefixMatcher::new(Pattern::new(pattern).unwrap());
        for t in &tokens {
            let r = m.feed(t);
            prop_assert!(r.progress <= len);
            prop_assert!(m.progress() < len);
            if r.completed {
                prop_assert_eq!(r.progress, len);
                prop_assert_eq!(m.progress(), 0);
            }
        }
    }

    // 2 + 3
    #[test]
    fn window_completes_iff_suffix_matches(pattern in arb_pattern(), tokens in arb_tokens()) {
        let len = pattern.len();
        let mut m = WindowMatcher::new(Pattern::new(pattern.clone()).unwrap());
        for (i, t) in tokens.iter().enumerate() {
            let r = m.feed(t);
            prop_assert!(r.progress <= len);
            prop_assert!(m.window().count() <= len);
            let seen = &tokens[..=i];
            let expected = seen.len() >= len && seen[seen.len() - len..] == pattern[..];
            prop_assert_eq!(r.completed, expected);
        }
    }

    // 4
    #[test]
    fn prefix_completions_match_reference(pattern in arb_pattern(), tokens in arb_tokens()) {
        let expected = reference_prefix_completions(&pattern, &tokens);
        let mut m = PrefixMatcher::new(Pattern::new(pattern).unwrap());
        let got = tokens.iter().filter(|t| m.feed(t).completed).count();
        prop_assert_eq!(got, expected);
    }

    // 5
    #[test]
    fn trail_bounded_and_newest_kept(capacity in 1usize..=16, n in 0usize..64) {
        let mut trail = TrailBuffer::new(capacity);
        for i in 0..n {
            trail.push(i as f64, 0.0);
        }
        prop_assert_eq!(trail.len(), n.min(capacity));
        let xs: Vec<f64> = trail.iter().map(|p| p.x).collect();
        let expected: Vec<f64> = (n.saturating_sub(capacity)..n).map(|i| i as f64).collect();
        prop_assert_eq!(xs, expected);
    }

    // 6
    #[test]
    fn cancelled_timers_never_fire(
        timers in prop::collection::vec((1u64..5000, any::<bool>()), 1..32),
    ) {
        let mut sched = ManualScheduler::new();
        let mut live = Vec::new();
        for (i, &(delay, cancel)) in timers.iter().enumerate() {
            let token = sched.after(Duration::from_millis(delay), i);
            if cancel {
                prop_assert!(sched.cancel(token));
                prop_assert!(!sched.cancel(token));
            } else {
                live.push((delay, i));
            }
        }
        sched.advance(Duration::from_millis(5000));
        let fired: Vec<usize> = sched.poll_expired().into_iter().map(|e| e.payload).collect();
        live.sort();
        let expected: Vec<usize> = live.into_iter().map(|(_, i)| i).collect();
        prop_assert_eq!(fired, expected);
        prop_assert!(sched.poll_expired().is_empty());
    }

    // 7
    #[test]
    fn early_release_never_activates(hold in 0u64..1500, wait in 0u64..10_000) {
        let mut eggs = EasterEggs::new(EggConfig::default(), Vec::<Notification>::new()).unwrap();
        let press = |phase| InputEvent::Pointer { phase, target: Target::LongPressButton };
        eggs.handle(&press(PointerPhase::Down));
        prop_assert!(eggs.advance(Duration::from_millis(hold)).is_empty());
        eggs.handle(&press(PointerPhase::Up));
        prop_assert!(eggs.advance(Duration::from_millis(wait)).is_empty());
        prop_assert!(eggs.sink().is_empty());
    }

    // 8
    #[test]
    fn confetti_stays_on_surface(seed in any::<u64>(), w in 1.0f64..2000.0, h in 1.0f64..2000.0) {
        let style = ConfettiStyle::default();
        let mut surface = RecordingSurface::new(w, h);
        let mut rng = ConfettiRng::new(seed);
        let drawn = paint_confetti(&mut surface, &style, &mut rng);
        prop_assert_eq!(drawn, 50);
        prop_assert_eq!(surface.ops().len(), 50);
        for op in surface.ops() {
            match *op {
                DrawOp::Rect { x, y, size, .. } => {
                    prop_assert!((0.0..=w).contains(&x));
                    prop_assert!((0.0..=h).contains(&y));
                    prop_assert!((5.0..=15.0).contains(&size));
                }
                _ => prop_assert!(false, "unexpected op {:?}", op),
            }
        }
    }
}

#[test]
fn default_effect_state_draws_nothing() {
    let effects = EffectState::default();
    assert_eq!(effects.trail_points().len(), 0);
    assert!(!effects.is_confetti_active());
}
