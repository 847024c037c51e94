#![forbid(unsafe_code)]

//! Normalized input events.
//!
//! The host (a browser page, a test, a replay harness) translates its raw
//! pointer, touch and keyboard events into [`InputEvent`] values and pushes
//! them into an [`InputEventSource`]. Everything downstream consumes only
//! these types, so recognizers never see platform objects.
//!
//! Key identifiers follow the DOM `KeyboardEvent.key` vocabulary
//! (`"ArrowUp"`, `"a"`, `"Escape"`), normalized into [`KeyCode`] by
//! [`normalize_dom_key`].

use std::collections::VecDeque;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Modifier keys held during a key event.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        const SUPER = 0b1000;
    }
}

/// Normalized key code.
///
/// Printable keys keep their exact character, so `Char('b')` and
/// `Char('B')` are different tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Tab,
    BackTab,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    F(u8),
    /// Anything the normalizer does not recognize, carrying the raw DOM key.
    Unidentified(Box<str>),
}

impl KeyCode {
    /// DOM-style identifier for display (`"ArrowUp"`, `"a"`, `"F5"`).
    #[must_use]
    pub fn identifier(&self) -> String {
        match self {
            Self::Char(c) => c.to_string(),
            Self::Enter => "Enter".to_string(),
            Self::Escape => "Escape".to_string(),
            Self::Backspace => "Backspace".to_string(),
            Self::Tab => "Tab".to_string(),
            Self::BackTab => "BackTab".to_string(),
            Self::Delete => "Delete".to_string(),
            Self::Home => "Home".to_string(),
            Self::End => "End".to_string(),
            Self::PageUp => "PageUp".to_string(),
            Self::PageDown => "PageDown".to_string(),
            Self::Up => "ArrowUp".to_string(),
            Self::Down => "ArrowDown".to_string(),
            Self::Left => "ArrowLeft".to_string(),
            Self::Right => "ArrowRight".to_string(),
            Self::F(n) => format!("F{n}"),
            Self::Unidentified(key) => key.to_string(),
        }
    }
}

/// Deterministic normalization of a DOM `key` string into a [`KeyCode`].
#[must_use]
pub fn normalize_dom_key(dom_key: &str, mods: Modifiers) -> KeyCode {
    if dom_key == "Tab" && mods.contains(Modifiers::SHIFT) {
        return KeyCode::BackTab;
    }

    // Single printable character: keep it verbatim (already includes shift).
    let mut chars = dom_key.chars();
    if let Some(first) = chars.next()
        && chars.next().is_none()
    {
        return KeyCode::Char(first);
    }

    match dom_key {
        "Enter" => KeyCode::Enter,
        "Escape" | "Esc" => KeyCode::Escape,
        "Backspace" => KeyCode::Backspace,
        "Tab" => KeyCode::Tab,
        "Delete" | "Del" => KeyCode::Delete,
        "Home" => KeyCode::Home,
        "End" => KeyCode::End,
        "PageUp" => KeyCode::PageUp,
        "PageDown" => KeyCode::PageDown,
        "ArrowUp" | "Up" => KeyCode::Up,
        "ArrowDown" | "Down" => KeyCode::Down,
        "ArrowLeft" | "Left" => KeyCode::Left,
        "ArrowRight" | "Right" => KeyCode::Right,
        "Spacebar" => KeyCode::Char(' '),
        _ => parse_function_key(dom_key)
            .map(KeyCode::F)
            .unwrap_or_else(|| KeyCode::Unidentified(dom_key.into())),
    }
}

fn parse_function_key(s: &str) -> Option<u8> {
    let rest = s.strip_prefix('F')?;
    rest.parse::<u8>().ok().filter(|n| (1..=24).contains(n))
}

/// A key-down event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyInput {
    pub code: KeyCode,
    pub mods: Modifiers,
    /// Auto-repeat from a held key. Repeats still count as tokens.
    pub repeat: bool,
}

impl KeyInput {
    /// A plain key press without modifiers.
    #[must_use]
    pub fn plain(code: KeyCode) -> Self {
        Self {
            code,
            mods: Modifiers::empty(),
            repeat: false,
        }
    }

    /// Build from a DOM `key` string.
    #[must_use]
    pub fn from_dom(dom_key: &str, mods: Modifiers, repeat: bool) -> Self {
        Self {
            code: normalize_dom_key(dom_key, mods),
            mods,
            repeat,
        }
    }
}

/// The interactive element an event was delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// The press-and-hold button.
    LongPressButton,
    /// The button that answers double-clicks with confetti.
    ConfettiButton,
    /// One of the numbered secret-code buttons.
    SecretButton(u8),
    /// The plain click-counter button.
    ClickCounter,
    /// Anything else on the page.
    Page,
}

/// Phase of a mouse button interaction on a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerPhase {
    Down,
    Up,
    /// The pointer left the target (counts as a release for press gestures).
    Leave,
}

/// Phase of a touch interaction on a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchPhase {
    Start,
    End,
    Cancel,
}

/// Normalized input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer motion in surface-local coordinates.
    PointerMove { x: f64, y: f64 },
    /// Mouse button transition on a target.
    Pointer { phase: PointerPhase, target: Target },
    /// Touch transition on a target.
    Touch { phase: TouchPhase, target: Target },
    /// Completed click on a target.
    Click { target: Target },
    /// Completed double-click on a target.
    DoubleClick { target: Target },
    /// Key press anywhere on the page.
    Key(KeyInput),
    /// Viewport resized; the drawing surface follows.
    Resize { width: u32, height: u32 },
}

impl InputEvent {
    /// Shorthand for a plain key press from a DOM key string.
    #[must_use]
    pub fn key(dom_key: &str) -> Self {
        Self::Key(KeyInput::from_dom(dom_key, Modifiers::empty(), false))
    }

    /// Shorthand for a click on a numbered secret button.
    #[must_use]
    pub const fn secret_button(token: u8) -> Self {
        Self::Click {
            target: Target::SecretButton(token),
        }
    }
}

// ---------------------------------------------------------------------------
// Event source
// ---------------------------------------------------------------------------

/// A stream of normalized input events, drained in arrival order.
pub trait InputEventSource {
    /// Take the next pending event, if any. Never blocks.
    fn poll_event(&mut self) -> Option<InputEvent>;

    /// Whether any events are waiting.
    fn has_pending(&self) -> bool;
}

/// Host-driven FIFO event source.
///
/// The host pushes events as the platform delivers them; the controller
/// drains them on its next turn.
#[derive(Debug, Default, Clone)]
pub struct EventQueue {
    queue: VecDeque<InputEvent>,
}

impl EventQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push an event onto the back of the queue.
    pub fn push(&mut self, event: InputEvent) {
        self.queue.push_back(event);
    }

    /// Number of queued events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drain all pending events in arrival order.
    pub fn drain(&mut self) -> impl Iterator<Item = InputEvent> + '_ {
        self.queue.drain(..)
    }
}

impl InputEventSource for EventQueue {
    fn poll_event(&mut self) -> Option<InputEvent> {
        self.queue.pop_front()
    }

    fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }
}

impl Extend<InputEvent> for EventQueue {
    fn extend<I: IntoIterator<Item = InputEvent>>(&mut self, iter: I) {
        self.queue.extend(iter);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
