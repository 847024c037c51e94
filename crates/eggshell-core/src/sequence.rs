#![forbid(unsafe_code)]

//! Ordered token-sequence recognizers.
//!
//! A [`Pattern`] is a fixed, non-empty sequence of tokens. Two matchers
//! recognize it in a token stream under different recovery policies:
//!
//! - [`PrefixMatcher`] keeps a cursor into the pattern. A token equal to
//!   `pattern[cursor]` advances it; anything else resets it to zero. The
//!   mismatching token is *not* retried as a fresh start, so `1 2 1 2 3 4`
//!   against `[1, 2, 3, 4]` does not complete.
//! - [`WindowMatcher`] keeps the last `N` raw tokens (`N` = pattern length)
//!   and compares the whole window after every push. A near-miss recovers
//!   as soon as the last `N` tokens are right.
//!
//! # Invariants
//!
//! 1. Pattern length is at least 1.
//! 2. Matcher state never holds more than `pattern.len()` tokens.
//! 3. `feed` is O(1) amortized and independent of how many tokens the
//!    session has seen.
//! 4. Tokens the pattern does not contain are ordinary mismatches.
//!
//! # Example
//!
//! ```
//! use eggshell_core::sequence::{Pattern, PrefixMatcher, SequenceMatcher};
//!
//! let mut m = PrefixMatcher::new(Pattern::new(vec![1u8, 2, 3, 4]).unwrap());
//! assert!(!m.feed(&1).completed);
//! assert!(!m.feed(&2).completed);
//! assert!(!m.feed(&3).completed);
//! assert!(m.feed(&4).completed);
//! assert_eq!(m.progress(), 0);
//! ```

use std::collections::VecDeque;
use std::fmt;

use crate::event::KeyCode;

// ---------------------------------------------------------------------------
// Pattern
// ---------------------------------------------------------------------------

/// Error constructing a [`Pattern`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternError {
    /// A pattern must contain at least one token.
    Empty,
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "pattern must contain at least one token"),
        }
    }
}

impl std::error::Error for PatternError {}

/// A fixed, non-empty target sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern<T> {
    tokens: Box<[T]>,
}

impl<T> Pattern<T> {
    /// Build a pattern. Fails on an empty token list.
    pub fn new(tokens: Vec<T>) -> Result<Self, PatternError> {
        if tokens.is_empty() {
            return Err(PatternError::Empty);
        }
        Ok(Self {
            tokens: tokens.into_boxed_slice(),
        })
    }

    /// Number of tokens; always at least 1.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Always `false`; present for API symmetry with slices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    #[must_use]
    pub fn tokens(&self) -> &[T] {
        &self.tokens
    }
}

impl Pattern<KeyCode> {
    /// Up Up Down Down Left Right Left Right b a.
    #[must_use]
    pub fn konami() -> Self {
        Self {
            tokens: vec![
                KeyCode::Up,
                KeyCode::Up,
                KeyCode::Down,
                KeyCode::Down,
                KeyCode::Left,
                KeyCode::Right,
                KeyCode::Left,
                KeyCode::Right,
                KeyCode::Char('b'),
                KeyCode::Char('a'),
            ]
            .into_boxed_slice(),
        }
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Outcome of feeding one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchResult {
    /// Number of pattern tokens currently matched (after this token).
    ///
    /// Equals the pattern length on the completing token.
    pub progress: usize,
    /// This token completed the pattern.
    pub completed: bool,
}

/// Matching policy, for configuration and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchPolicy {
    PrefixReset,
    SlidingWindow,
}

/// Incremental recognizer of one [`Pattern`].
pub trait SequenceMatcher<T> {
    /// Feed the next token.
    fn feed(&mut self, token: &T) -> MatchResult;

    /// Tokens currently matched toward the pattern.
    fn progress(&self) -> usize;

    /// Forget all progress.
    fn reset(&mut self);

    /// The pattern being recognized.
    fn pattern(&self) -> &Pattern<T>;

    /// Which recovery policy this matcher implements.
    fn policy(&self) -> MatchPolicy;
}

/// Cursor matcher that hard-resets on any mismatch.
#[derive(Debug, Clone)]
pub struct PrefixMatcher<T> {
    pattern: Pattern<T>,
    cursor: usize,
}

impl<T: PartialEq> PrefixMatcher<T> {
    #[must_use]
    pub fn new(pattern: Pattern<T>) -> Self {
        Self { pattern, cursor: 0 }
    }
}

impl<T: PartialEq> SequenceMatcher<T> for PrefixMatcher<T> {
    fn feed(&mut self, token: &T) -> MatchResult {
        if self.pattern.tokens[self.cursor] != *token {
            if self.cursor > 0 {
                crate::debug!(progress = self.cursor, "prefix matcher reset on mismatch");
            }
            self.cursor = 0;
            return MatchResult::default();
        }

        self.cursor += 1;
        if self.cursor == self.pattern.len() {
            crate::debug!(len = self.cursor, "prefix matcher completed");
            self.cursor = 0;
            return MatchResult {
                progress: self.pattern.len(),
                completed: true,
            };
        }

        MatchResult {
            progress: self.cursor,
            completed: false,
        }
    }

    fn progress(&self) -> usize {
        self.cursor
    }

    fn reset(&mut self) {
        self.cursor = 0;
    }

    fn pattern(&self) -> &Pattern<T> {
        &self.pattern
    }

    fn policy(&self) -> MatchPolicy {
        MatchPolicy::PrefixReset
    }
}

/// FIFO-window matcher comparing the last `N` tokens wholesale.
///
/// The window is not cleared on completion; the completing run is evicted
/// naturally by later tokens, so one run never completes twice.
///
/// Progress (the longest suffix of the window that is also a prefix of the
/// pattern) is tracked incrementally with a failure table, so `feed` does
/// not rescan the window.
#[derive(Debug, Clone)]
pub struct WindowMatcher<T> {
    pattern: Pattern<T>,
    window: VecDeque<T>,
    /// `failure[i]`: longest proper border of `pattern[..=i]`.
    failure: Box<[usize]>,
    matched: usize,
}

fn failure_table<T: PartialEq>(tokens: &[T]) -> Box<[usize]> {
    let mut table = vec![0; tokens.len()];
    let mut k = 0;
    for i in 1..tokens.len() {
        while k > 0 && tokens[i] != tokens[k] {
            k = table[k - 1];
        }
        if tokens[i] == tokens[k] {
            k += 1;
        }
        table[i] = k;
    }
    table.into_boxed_slice()
}

impl<T: PartialEq + Clone> WindowMatcher<T> {
    #[must_use]
    pub fn new(pattern: Pattern<T>) -> Self {
        let cap = pattern.len();
        let failure = failure_table(&pattern.tokens);
        Self {
            pattern,
            window: VecDeque::with_capacity(cap),
            failure,
            matched: 0,
        }
    }

    /// The buffered tokens, oldest first.
    pub fn window(&self) -> impl Iterator<Item = &T> {
        self.window.iter()
    }

    fn advance(&mut self, token: &T) {
        let tokens = &self.pattern.tokens;
        let mut k = self.matched;
        if k == tokens.len() {
            k = self.failure[k - 1];
        }
        while k > 0 && tokens[k] != *token {
            k = self.failure[k - 1];
        }
        if tokens[k] == *token {
            k += 1;
        }
        self.matched = k;
    }
}

impl<T: PartialEq + Clone> SequenceMatcher<T> for WindowMatcher<T> {
    fn feed(&mut self, token: &T) -> MatchResult {
        self.window.push_back(token.clone());
        if self.window.len() > self.pattern.len() {
            self.window.pop_front();
        }
        self.advance(token);

        // A full-length match is exactly the whole window.
        let completed = self.matched == self.pattern.len();
        if completed {
            crate::debug!(len = self.window.len(), "window matcher completed");
        }
        MatchResult {
            progress: self.matched,
            completed,
        }
    }

    fn progress(&self) -> usize {
        self.matched
    }

    fn reset(&mut self) {
        self.window.clear();
        self.matched = 0;
    }

    fn pattern(&self) -> &Pattern<T> {
        &self.pattern
    }

    fn policy(&self) -> MatchPolicy {
        MatchPolicy::SlidingWindow
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn code() -> Pattern<u8> {
        Pattern::new(vec![1, 2, 3, 4]).unwrap()
    }

    fn feed_all<M: SequenceMatcher<T>, T>(m: &mut M, tokens: &[T]) -> Vec<MatchResult> {
        tokens.iter().map(|t| m.feed(t)).collect()
    }

    fn completions(results: &[MatchResult]) -> Vec<usize> {
        results
            .iter()
            .enumerate()
            .filter(|(_, r)| r.completed)
            .map(|(i, _)| i)
            .collect()
    }

    // --- Pattern ---

    #[test]
    fn empty_pattern_rejected() {
        assert_eq!(Pattern::<u8>::new(vec![]), Err(PatternError::Empty));
        assert_eq!(
            PatternError::Empty.to_string(),
            "pattern must contain at least one token"
        );
    }

    #[test]
    fn konami_has_ten_tokens() {
        let p = Pattern::konami();
        assert_eq!(p.len(), 10);
        assert_eq!(p.tokens()[8], KeyCode::Char('b'));
        assert_eq!(p.tokens()[9], KeyCode::Char('a'));
    }

    // --- PrefixMatcher ---

    #[test]
    fn prefix_exact_sequence_completes_once_at_end() {
        let mut m = PrefixMatcher::new(code());
        assert_eq!(m.progress(), 0);
        let results = feed_all(&mut m, &[1, 2, 3, 4]);
        assert_eq!(completions(&results), vec![3]);
        assert_eq!(
            results.iter().map(|r| r.progress).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
        assert_eq!(m.progress(), 0);
    }

    #[test]
    fn prefix_mismatch_resets_then_recovers() {
        let mut m = PrefixMatcher::new(code());
        let results = feed_all(&mut m, &[1, 2, 9, 1, 2, 3, 4]);
        assert_eq!(completions(&results), vec![6]);
        assert_eq!(results[2], MatchResult::default());
    }

    #[test]
    fn prefix_mismatch_is_hard_reset() {
        // The `1` that breaks `1 2 1` is not retried as a new start.
        let mut m = PrefixMatcher::new(code());
        let results = feed_all(&mut m, &[1, 2, 1, 2, 3, 4]);
        assert!(completions(&results).is_empty());
        assert_eq!(results[2].progress, 0);
        assert_eq!(results[3].progress, 0);
    }

    #[test]
    fn prefix_repeated_token_resets() {
        let mut m = PrefixMatcher::new(code());
        let results = feed_all(&mut m, &[1, 2, 3, 3, 4]);
        assert!(completions(&results).is_empty());
        assert_eq!(m.progress(), 0);
    }

    #[test]
    fn prefix_back_to_back_completions() {
        let mut m = PrefixMatcher::new(code());
        let results = feed_all(&mut m, &[1, 2, 3, 4, 1, 2, 3, 4]);
        assert_eq!(completions(&results), vec![3, 7]);
    }

    #[test]
    fn prefix_single_token_pattern() {
        let mut m = PrefixMatcher::new(Pattern::new(vec!['x']).unwrap());
        assert!(m.feed(&'x').completed);
        assert!(!m.feed(&'y').completed);
        assert!(m.feed(&'x').completed);
    }

    #[test]
    fn prefix_reset_clears_cursor() {
        let mut m = PrefixMatcher::new(code());
        feed_all(&mut m, &[1, 2, 3]);
        assert_eq!(m.progress(), 3);
        m.reset();
        assert_eq!(m.progress(), 0);
        assert_eq!(m.policy(), MatchPolicy::PrefixReset);
    }

    // --- WindowMatcher ---

    fn konami_keys() -> Vec<KeyCode> {
        Pattern::konami().tokens().to_vec()
    }

    #[test]
    fn window_full_sequence_completes_once() {
        let mut m = WindowMatcher::new(Pattern::konami());
        let results = feed_all(&mut m, &konami_keys());
        assert_eq!(completions(&results), vec![9]);
        assert_eq!(results[9].progress, 10);
    }

    #[test]
    fn window_extra_key_does_not_retrigger() {
        let mut m = WindowMatcher::new(Pattern::konami());
        let mut keys = konami_keys();
        keys.push(KeyCode::Char('z'));
        let results = feed_all(&mut m, &keys);
        assert_eq!(completions(&results), vec![9]);
        assert!(!results[10].completed);
        assert_eq!(m.window().count(), 10);
        assert_eq!(m.window().next(), Some(&KeyCode::Up));
    }

    #[test]
    fn window_recovers_from_near_miss() {
        // A stray key mid-sequence, then the whole sequence again.
        let mut m = WindowMatcher::new(Pattern::konami());
        let mut keys = konami_keys()[..5].to_vec();
        keys.push(KeyCode::Escape);
        keys.extend(konami_keys());
        let results = feed_all(&mut m, &keys);
        assert_eq!(completions(&results), vec![keys.len() - 1]);
    }

    #[test]
    fn window_recovers_where_prefix_cannot() {
        // `Up Up Up Down Down ...`: the third Up breaks a prefix cursor at 2
        // but the window still ends with the full pattern.
        let mut keys = vec![KeyCode::Up];
        keys.extend(konami_keys());

        let mut window = WindowMatcher::new(Pattern::konami());
        assert_eq!(completions(&feed_all(&mut window, &keys)), vec![10]);

        let mut prefix = PrefixMatcher::new(Pattern::konami());
        assert!(completions(&feed_all(&mut prefix, &keys)).is_empty());
    }

    #[test]
    fn window_progress_tracks_matched_suffix() {
        let mut m = WindowMatcher::new(Pattern::konami());
        assert_eq!(m.feed(&KeyCode::Up).progress, 1);
        assert_eq!(m.feed(&KeyCode::Up).progress, 2);
        // Third Up: the window still ends in `Up Up`.
        assert_eq!(m.feed(&KeyCode::Up).progress, 2);
        assert_eq!(m.feed(&KeyCode::Down).progress, 3);
        assert_eq!(m.feed(&KeyCode::Char('q')).progress, 0);
    }

    #[test]
    fn window_progress_agrees_with_suffix_scan_on_self_overlapping_pattern() {
        let pattern = [1u8, 1, 2, 1, 1, 3];
        let mut m = WindowMatcher::new(Pattern::new(pattern.to_vec()).unwrap());
        let stream = [1u8, 1, 2, 1, 1, 2, 1, 1, 3, 1, 1, 1, 2, 1, 1, 3, 3, 1];
        for (i, t) in stream.iter().enumerate() {
            let r = m.feed(t);
            let window: Vec<u8> = m.window().copied().collect();
            let expected = (0..=window.len())
                .rev()
                .find(|&k| window[window.len() - k..] == pattern[..k])
                .unwrap_or(0);
            assert_eq!(r.progress, expected, "token {i}");
            assert_eq!(m.progress(), expected);
            assert_eq!(r.completed, window == pattern, "token {i}");
        }
    }

    #[test]
    fn window_unknown_token_is_plain_mismatch() {
        let mut m = WindowMatcher::new(Pattern::konami());
        let r = m.feed(&KeyCode::Unidentified("Dead".into()));
        assert_eq!(r, MatchResult::default());
    }

    #[test]
    fn window_never_exceeds_pattern_len() {
        let mut m = WindowMatcher::new(Pattern::new(vec![1u8, 2, 3]).unwrap());
        for t in 0..100u8 {
            m.feed(&t);
            assert!(m.window().count() <= 3);
        }
    }

    #[test]
    fn window_reset_clears_buffer() {
        let mut m = WindowMatcher::new(Pattern::konami());
        feed_all(&mut m, &konami_keys()[..4]);
        m.reset();
        assert_eq!(m.window().count(), 0);
        assert_eq!(m.progress(), 0);
        assert_eq!(m.policy(), MatchPolicy::SlidingWindow);
    }
}
