#![forbid(unsafe_code)]

//! Event dispatch for the hidden interactions.
//!
//! [`EasterEggs`] owns every piece of session state (matchers, gestures,
//! effects, counters) plus the scheduler and notification sink, and routes
//! each normalized [`InputEvent`] to the recognizer that cares about it.
//!
//! # Routing
//!
//! | Event                                   | Effect                              |
//! |-----------------------------------------|-------------------------------------|
//! | `PointerMove`                           | trail point                         |
//! | `Pointer`/`Touch` on the long-press button | arm / disarm the long press      |
//! | `DoubleClick` on the confetti button    | confetti window, toast              |
//! | `Click` on a secret button              | prefix-reset code matcher           |
//! | `Click` on the counter                  | counter toast                       |
//! | `Key`                                   | last key, sliding-window Konami     |
//! | `Resize`                                | viewport                            |
//!
//! Timers come back through [`run_timers`](EasterEggs::run_timers); the host
//! calls it after moving the clock (every animation frame in the browser).

use std::fmt;
use std::time::Duration;

use crate::config::{ConfigError, EggConfig};
use crate::effects::EffectState;
use crate::event::{InputEvent, InputEventSource, KeyCode, KeyInput, PointerPhase, Target, TouchPhase};
use crate::gesture::LongPress;
use crate::notify::{Notification, NotificationSink};
use crate::render::RenderLoop;
use crate::scheduler::{Expired, ManualScheduler, Scheduler};
use crate::sequence::{PrefixMatcher, SequenceMatcher, WindowMatcher};

/// On-screen time of the secret-code and Konami toasts.
pub const REVEAL_TOAST_DURATION: Duration = Duration::from_millis(5000);

/// Payload of every timer the controller arms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timer {
    LongPress,
    Confetti,
    SecretReveal,
    KonamiReveal,
}

/// A hidden interaction that just fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Activation {
    LongPress,
    DoubleClick,
    SecretCode,
    Konami,
}

impl Activation {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::LongPress => "long press",
            Self::DoubleClick => "double click",
            Self::SecretCode => "secret code",
            Self::Konami => "konami code",
        }
    }
}

/// Session controller for the hidden interactions.
pub struct EasterEggs<N, S = ManualScheduler<Timer>> {
    config: EggConfig,
    scheduler: S,
    sink: N,
    secret: PrefixMatcher<u8>,
    /// Lit progress dots. Follows the cursor, but stays full through the
    /// reveal after a completion.
    secret_dots: usize,
    konami: WindowMatcher<KeyCode>,
    long_press: LongPress,
    effects: EffectState,
    clicks: u64,
    last_key: Option<KeyCode>,
}

impl<N, S> fmt::Debug for EasterEggs<N, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EasterEggs")
            .field("secret_progress", &self.secret.progress())
            .field("konami_progress", &self.konami.progress())
            .field("long_press_armed", &self.long_press.is_armed())
            .field("confetti", &self.effects.is_confetti_active())
            .field("clicks", &self.clicks)
            .finish()
    }
}

impl<N: NotificationSink> EasterEggs<N, ManualScheduler<Timer>> {
    /// Controller on a host-driven clock starting at zero.
    pub fn new(config: EggConfig, sink: N) -> Result<Self, ConfigError> {
        Self::with_scheduler(config, sink, ManualScheduler::new())
    }

    /// Move the clock forward and process due timers.
    pub fn advance(&mut self, dt: Duration) -> Vec<Activation> {
        self.scheduler.advance(dt);
        self.run_timers()
    }

    /// Set the clock (monotonic; earlier values are ignored) and process due
    /// timers.
    pub fn advance_to(&mut self, now: Duration) -> Vec<Activation> {
        self.scheduler.set(now);
        self.run_timers()
    }
}

impl<N: NotificationSink, S: Scheduler<Timer>> EasterEggs<N, S> {
    /// Controller on a caller-supplied scheduler.
    pub fn with_scheduler(config: EggConfig, sink: N, scheduler: S) -> Result<Self, ConfigError> {
        if let Err(err) = config.validate() {
            crate::warn!(error = %err, "rejecting configuration");
            return Err(err);
        }
        let secret = PrefixMatcher::new(config.secret_pattern()?);
        let konami = WindowMatcher::new(config.konami_pattern()?);
        let long_press = LongPress::new(config.long_press());
        let effects = EffectState::new(
            config.trail_capacity,
            config.confetti_window(),
            config.secret_reveal(),
            config.konami_reveal(),
        );
        Ok(Self {
            config,
            scheduler,
            sink,
            secret,
            secret_dots: 0,
            konami,
            long_press,
            effects,
            clicks: 0,
            last_key: None,
        })
    }

    /// A render loop configured for this session.
    #[must_use]
    pub fn render_loop(&self) -> RenderLoop {
        RenderLoop::new(self.config.confetti_style(), self.config.seed)
    }

    /// Handle one input event.
    pub fn handle(&mut self, event: &InputEvent) -> Option<Activation> {
        match event {
            InputEvent::PointerMove { x, y } => {
                self.effects.push_trail_point(*x, *y);
                None
            }
            InputEvent::Pointer {
                phase,
                target: Target::LongPressButton,
            } => {
                match phase {
                    PointerPhase::Down => self.press_start(),
                    PointerPhase::Up => self.press_end(),
                    PointerPhase::Leave => self.press_cancel(),
                }
                None
            }
            InputEvent::Touch {
                phase,
                target: Target::LongPressButton,
            } => {
                match phase {
                    TouchPhase::Start => self.press_start(),
                    TouchPhase::End => self.press_end(),
                    TouchPhase::Cancel => self.press_cancel(),
                }
                None
            }
            InputEvent::DoubleClick {
                target: Target::ConfettiButton,
            } => Some(self.double_click()),
            InputEvent::Click {
                target: Target::SecretButton(token),
            } => self.secret_token(*token),
            InputEvent::Click {
                target: Target::ClickCounter,
            } => {
                self.count_click();
                None
            }
            InputEvent::Key(key) => self.key(key),
            InputEvent::Resize { width, height } => {
                self.effects.set_viewport(*width, *height);
                None
            }
            InputEvent::Pointer { .. }
            | InputEvent::Touch { .. }
            | InputEvent::Click { .. }
            | InputEvent::DoubleClick { .. } => None,
        }
    }

    /// Handle every pending event from `source`, in arrival order.
    pub fn drain<E: InputEventSource + ?Sized>(&mut self, source: &mut E) -> Vec<Activation> {
        let mut fired = Vec::new();
        while let Some(event) = source.poll_event() {
            fired.extend(self.handle(&event));
        }
        fired
    }

    /// Process every timer that is due at the scheduler's current time.
    pub fn run_timers(&mut self) -> Vec<Activation> {
        let expired = self.scheduler.poll_expired();
        expired
            .into_iter()
            .filter_map(|timer| self.on_timer(timer))
            .collect()
    }

    // --- state accessors ---

    #[must_use]
    pub fn effects(&self) -> &EffectState {
        &self.effects
    }

    #[must_use]
    pub fn config(&self) -> &EggConfig {
        &self.config
    }

    #[must_use]
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    #[must_use]
    pub fn sink(&self) -> &N {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut N {
        &mut self.sink
    }

    /// Secret code cursor.
    #[must_use]
    pub fn secret_progress(&self) -> usize {
        self.secret.progress()
    }

    /// Number of progress dots to light.
    #[must_use]
    pub fn secret_dots(&self) -> usize {
        self.secret_dots
    }

    /// Longest run of Konami keys at the end of the key window.
    #[must_use]
    pub fn konami_progress(&self) -> usize {
        self.konami.progress()
    }

    #[must_use]
    pub fn last_key(&self) -> Option<&KeyCode> {
        self.last_key.as_ref()
    }

    #[must_use]
    pub fn click_count(&self) -> u64 {
        self.clicks
    }

    #[must_use]
    pub fn is_long_press_armed(&self) -> bool {
        self.long_press.is_armed()
    }

    #[must_use]
    pub fn is_long_press_active(&self) -> bool {
        self.long_press.is_active()
    }

    // --- handlers ---

    fn press_start(&mut self) {
        self.long_press
            .press_start(&mut self.scheduler, Timer::LongPress);
        crate::trace!("long press armed");
    }

    fn press_end(&mut self) {
        if self.long_press.press_end(&mut self.scheduler) {
            crate::trace!("long press released early");
        }
    }

    fn press_cancel(&mut self) {
        if self.long_press.press_cancel(&mut self.scheduler) {
            crate::trace!("long press cancelled");
        }
    }

    fn double_click(&mut self) -> Activation {
        self.effects
            .trigger_confetti(&mut self.scheduler, Timer::Confetti);
        self.announce(
            Activation::DoubleClick,
            Notification::new("Double Click Detected!", "Enjoy the confetti celebration!"),
        );
        Activation::DoubleClick
    }

    fn secret_token(&mut self, token: u8) -> Option<Activation> {
        let result = self.secret.feed(&token);
        self.secret_dots = result.progress;
        if !result.completed {
            return None;
        }
        self.effects
            .reveal_secret(&mut self.scheduler, Timer::SecretReveal);
        self.announce(
            Activation::SecretCode,
            Notification::new(
                "Secret Code Unlocked! \u{1F513}",
                "You've solved the secret sequence!",
            )
            .duration(REVEAL_TOAST_DURATION),
        );
        Some(Activation::SecretCode)
    }

    fn key(&mut self, key: &KeyInput) -> Option<Activation> {
        self.last_key = Some(key.code.clone());
        let result = self.konami.feed(&key.code);
        if !result.completed {
            return None;
        }
        self.effects
            .reveal_konami(&mut self.scheduler, Timer::KonamiReveal);
        self.announce(
            Activation::Konami,
            Notification::new(
                "\u{1F389} Konami Code Activated!",
                "You've discovered a secret! Awesome job!",
            )
            .duration(REVEAL_TOAST_DURATION),
        );
        Some(Activation::Konami)
    }

    fn count_click(&mut self) {
        self.clicks += 1;
        let message = format!("You've clicked the button {} times", self.clicks);
        self.sink.notify(Notification::new("Button Clicked!", message));
    }

    fn on_timer(&mut self, timer: Expired<Timer>) -> Option<Activation> {
        match timer.payload {
            Timer::LongPress => {
                self.long_press.on_expired(timer.token)?;
                self.announce(
                    Activation::LongPress,
                    Notification::new(
                        "Long Press Activated!",
                        "You've discovered the long press feature!",
                    ),
                );
                Some(Activation::LongPress)
            }
            Timer::Confetti => {
                if self.effects.expire_confetti(timer.token) {
                    crate::debug!("confetti window closed");
                }
                None
            }
            Timer::SecretReveal => {
                if self.effects.expire_secret_reveal(timer.token) && self.secret.progress() == 0 {
                    self.secret_dots = 0;
                }
                None
            }
            Timer::KonamiReveal => {
                self.effects.expire_konami_reveal(timer.token);
                None
            }
        }
    }

    fn announce(&mut self, activation: Activation, notification: Notification) {
        #[cfg(not(feature = "tracing"))]
        let _ = activation;
        crate::info!(
            activation = activation.name(),
            title = %notification.title,
            "hidden interaction activated"
        );
        self.sink.notify(notification);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
