#![forbid(unsafe_code)]

//! Session configuration.
//!
//! Defaults reproduce the demo page. Hosts may override any field from a
//! JSON options object; missing fields keep their defaults.
//!
//! ```
//! use eggshell_core::config::EggConfig;
//! use std::time::Duration;
//!
//! let config = EggConfig::from_json(r#"{ "long_press_ms": 800 }"#).unwrap();
//! assert_eq!(config.long_press(), Duration::from_millis(800));
//! assert_eq!(config.secret_code, vec![1, 2, 3, 4]);
//! ```

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::event::{KeyCode, Modifiers, normalize_dom_key};
use crate::render::ConfettiStyle;
use crate::sequence::{Pattern, PatternError};

/// Invalid configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A pattern field is empty.
    EmptyPattern(&'static str),
    /// A duration that must be positive is zero.
    ZeroDuration(&'static str),
    /// The trail must keep at least one point.
    ZeroTrailCapacity,
    /// Confetti sizes must satisfy `0 < min <= max`.
    ConfettiSize { min: f64, max: f64 },
    /// The options text is not valid JSON for this schema.
    Json(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPattern(field) => write!(f, "{field}: pattern must not be empty"),
            Self::ZeroDuration(field) => write!(f, "{field}: duration must be positive"),
            Self::ZeroTrailCapacity => write!(f, "trail_capacity must be at least 1"),
            Self::ConfettiSize { min, max } => {
                write!(f, "confetti size range {min}..{max} is invalid")
            }
            Self::Json(msg) => write!(f, "invalid options: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Tunables for one page session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EggConfig {
    /// Secret button tokens, matched with prefix-reset.
    pub secret_code: Vec<u8>,
    /// DOM key names, matched with a sliding window.
    pub konami_keys: Vec<String>,
    /// Hold time before a long press activates.
    pub long_press_ms: u64,
    /// Confetti window after each double-click.
    pub confetti_ms: u64,
    /// How long the secret-code reveal stays on.
    pub secret_reveal_ms: u64,
    /// How long the Konami reveal stays on.
    pub konami_reveal_ms: u64,
    pub trail_capacity: usize,
    pub confetti_pieces: usize,
    pub confetti_min_size: f64,
    pub confetti_max_size: f64,
    /// Confetti RNG seed.
    pub seed: u64,
}

impl Default for EggConfig {
    fn default() -> Self {
        Self {
            secret_code: vec![1, 2, 3, 4],
            konami_keys: [
                "ArrowUp",
                "ArrowUp",
                "ArrowDown",
                "ArrowDown",
                "ArrowLeft",
                "ArrowRight",
                "ArrowLeft",
                "ArrowRight",
                "b",
                "a",
            ]
            .map(String::from)
            .to_vec(),
            long_press_ms: 1500,
            confetti_ms: 5000,
            secret_reveal_ms: 3000,
            konami_reveal_ms: 5000,
            trail_capacity: crate::effects::TRAIL_CAPACITY,
            confetti_pieces: 50,
            confetti_min_size: 5.0,
            confetti_max_size: 15.0,
            seed: 0x5EED_CAFE,
        }
    }
}

impl EggConfig {
    /// Parse JSON options over the defaults, then validate.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| ConfigError::Json(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_secret_code(mut self, code: Vec<u8>) -> Self {
        self.secret_code = code;
        self
    }

    #[must_use]
    pub fn with_long_press(mut self, delay: Duration) -> Self {
        self.long_press_ms = duration_ms(delay);
        self
    }

    #[must_use]
    pub fn with_confetti_window(mut self, window: Duration) -> Self {
        self.confetti_ms = duration_ms(window);
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret_code.is_empty() {
            return Err(ConfigError::EmptyPattern("secret_code"));
        }
        if self.konami_keys.is_empty() {
            return Err(ConfigError::EmptyPattern("konami_keys"));
        }
        for (field, ms) in [
            ("long_press_ms", self.long_press_ms),
            ("confetti_ms", self.confetti_ms),
            ("secret_reveal_ms", self.secret_reveal_ms),
            ("konami_reveal_ms", self.konami_reveal_ms),
        ] {
            if ms == 0 {
                return Err(ConfigError::ZeroDuration(field));
            }
        }
        if self.trail_capacity == 0 {
            return Err(ConfigError::ZeroTrailCapacity);
        }
        if !(self.confetti_min_size > 0.0 && self.confetti_min_size <= self.confetti_max_size) {
            return Err(ConfigError::ConfettiSize {
                min: self.confetti_min_size,
                max: self.confetti_max_size,
            });
        }
        Ok(())
    }

    pub fn secret_pattern(&self) -> Result<Pattern<u8>, ConfigError> {
        Pattern::new(self.secret_code.clone()).map_err(|PatternError::Empty| {
            ConfigError::EmptyPattern("secret_code")
        })
    }

    pub fn konami_pattern(&self) -> Result<Pattern<KeyCode>, ConfigError> {
        let keys = self
            .konami_keys
            .iter()
            .map(|k| normalize_dom_key(k, Modifiers::empty()))
            .collect();
        Pattern::new(keys).map_err(|PatternError::Empty| ConfigError::EmptyPattern("konami_keys"))
    }

    #[must_use]
    pub const fn long_press(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }

    #[must_use]
    pub const fn confetti_window(&self) -> Duration {
        Duration::from_millis(self.confetti_ms)
    }

    #[must_use]
    pub const fn secret_reveal(&self) -> Duration {
        Duration::from_millis(self.secret_reveal_ms)
    }

    #[must_use]
    pub const fn konami_reveal(&self) -> Duration {
        Duration::from_millis(self.konami_reveal_ms)
    }

    #[must_use]
    pub fn confetti_style(&self) -> ConfettiStyle {
        ConfettiStyle {
            pieces: self.confetti_pieces,
            min_size: self.confetti_min_size,
            max_size: self.confetti_max_size,
        }
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let c = EggConfig::default();
        assert_eq!(c.validate(), Ok(()));
        assert_eq!(c.long_press(), Duration::from_millis(1500));
        assert_eq!(c.confetti_window(), Duration::from_millis(5000));
        assert_eq!(c.secret_reveal(), Duration::from_millis(3000));
        assert_eq!(c.konami_reveal(), Duration::from_millis(5000));
    }

    #[test]
    fn default_konami_keys_normalize_to_konami_pattern() {
        let c = EggConfig::default();
        assert_eq!(c.konami_pattern().unwrap(), Pattern::konami());
    }

    #[test]
    fn json_overrides_and_keeps_defaults() {
        let c = EggConfig::from_json(r#"{"secret_code":[4,3,2,1],"seed":7}"#).unwrap();
        assert_eq!(c.secret_code, vec![4, 3, 2, 1]);
        assert_eq!(c.seed, 7);
        assert_eq!(c.long_press_ms, 1500);
    }

    #[test]
    fn empty_json_object_is_default() {
        assert_eq!(EggConfig::from_json("{}").unwrap(), EggConfig::default());
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = EggConfig::from_json("{ nope").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
        assert!(err.to_string().starts_with("invalid options:"));
    }

    #[test]
    fn empty_patterns_rejected() {
        let c = EggConfig::default().with_secret_code(vec![]);
        assert_eq!(c.validate(), Err(ConfigError::EmptyPattern("secret_code")));
        assert!(c.secret_pattern().is_err());

        let err = EggConfig::from_json(r#"{"konami_keys":[]}"#).unwrap_err();
        assert_eq!(err, ConfigError::EmptyPattern("konami_keys"));
    }

    #[test]
    fn zero_durations_rejected() {
        let c = EggConfig::default().with_long_press(Duration::ZERO);
        assert_eq!(c.validate(), Err(ConfigError::ZeroDuration("long_press_ms")));
    }

    #[test]
    fn confetti_size_range_checked() {
        let err = EggConfig::from_json(r#"{"confetti_min_size":20.0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::ConfettiSize { .. }));
    }

    #[test]
    fn zero_trail_rejected() {
        let err = EggConfig::from_json(r#"{"trail_capacity":0}"#).unwrap_err();
        assert_eq!(err, ConfigError::ZeroTrailCapacity);
    }
}
