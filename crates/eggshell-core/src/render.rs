#![forbid(unsafe_code)]

//! Per-frame painting of [`EffectState`] onto a 2D [`Surface`].
//!
//! Every frame starts from a cleared surface:
//!
//! - **Trail**: point `i` (0 = oldest) is a filled circle of diameter
//!   `20 - 2i` (skipped when `<= 0`) with alpha `(10 - i) / 10`.
//! - **Confetti**: while active, `pieces` squares with random position,
//!   palette colour and side (5–15 px) are drawn from scratch. Nothing
//!   persists between frames, which gives the sparkle.
//!
//! # Determinism
//!
//! Confetti uses a seeded xorshift64 generator, so a recorded surface
//! replays identically for the same seed and input.

use std::fmt;

use crate::effects::EffectState;
use crate::scheduler::FrameScheduler;

// ---------------------------------------------------------------------------
// Colour
// ---------------------------------------------------------------------------

/// sRGB colour with straight alpha in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    #[must_use]
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

impl fmt::Display for Rgba {
    /// CSS form: `#rrggbb` when opaque, `rgba(r, g, b, a)` otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a >= 1.0 {
            write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
        }
    }
}

/// Trail colour (violet).
pub const TRAIL_COLOR: Rgba = Rgba::rgb(139, 92, 246);

/// Confetti palette: orange, violet, sky, emerald, red.
pub const CONFETTI_PALETTE: [Rgba; 5] = [
    Rgba::rgb(0xF9, 0x73, 0x16),
    Rgba::rgb(0x8B, 0x5C, 0xF6),
    Rgba::rgb(0x0E, 0xA5, 0xE9),
    Rgba::rgb(0x10, 0xB9, 0x81),
    Rgba::rgb(0xEF, 0x44, 0x44),
];

// ---------------------------------------------------------------------------
// Surface
// ---------------------------------------------------------------------------

/// The drawing operations the render loop needs.
pub trait Surface {
    /// Width and height in pixels.
    fn size(&self) -> (f64, f64);

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Rgba);

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgba);
}

/// One recorded drawing call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawOp {
    Clear {
        width: f64,
        height: f64,
    },
    Circle {
        x: f64,
        y: f64,
        radius: f64,
        color: Rgba,
    },
    Rect {
        x: f64,
        y: f64,
        size: f64,
        color: Rgba,
    },
}

/// Surface that records calls instead of drawing. Used by tests and by
/// hosts that replay frames elsewhere.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: f64,
    height: f64,
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    #[must_use]
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Take the recorded operations, leaving the log empty.
    pub fn take_ops(&mut self) -> Vec<DrawOp> {
        std::mem::take(&mut self.ops)
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn clear_rect(&mut self, _x: f64, _y: f64, width: f64, height: f64) {
        self.ops.push(DrawOp::Clear { width, height });
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Rgba) {
        self.ops.push(DrawOp::Circle {
            x,
            y,
            radius,
            color,
        });
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, _height: f64, color: Rgba) {
        self.ops.push(DrawOp::Rect {
            x,
            y,
            size: width,
            color,
        });
    }
}

// ---------------------------------------------------------------------------
// Xorshift64 RNG
// ---------------------------------------------------------------------------

/// Deterministic xorshift64 PRNG for confetti placement.
#[derive(Debug, Clone)]
pub struct ConfettiRng {
    state: u64,
}

impl ConfettiRng {
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        // Zero is a fixed point of xorshift.
        Self {
            state: if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed },
        }
    }

    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform in `[0, 1)`.
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    #[inline]
    pub fn index(&mut self, len: usize) -> usize {
        (self.next_u64() % len as u64) as usize
    }
}

// ---------------------------------------------------------------------------
// Painting
// ---------------------------------------------------------------------------

/// Diameter of the newest-indexed trail circle.
pub const TRAIL_BASE_SIZE: f64 = 20.0;
/// Diameter lost per trail index.
pub const TRAIL_SIZE_STEP: f64 = 2.0;
/// Alpha denominator for trail fading.
pub const TRAIL_FADE_STEPS: f64 = 10.0;

/// Confetti parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfettiStyle {
    /// Squares drawn per frame while active.
    pub pieces: usize,
    /// Smallest side length in pixels.
    pub min_size: f64,
    /// Largest side length in pixels (exclusive).
    pub max_size: f64,
}

impl Default for ConfettiStyle {
    fn default() -> Self {
        Self {
            pieces: 50,
            min_size: 5.0,
            max_size: 15.0,
        }
    }
}

/// What one frame drew.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    pub frame: u64,
    pub trail_circles: usize,
    pub confetti_pieces: usize,
}

/// Draw the trail. Returns the number of circles drawn.
pub fn paint_trail<S: Surface + ?Sized>(effects: &EffectState, surface: &mut S) -> usize {
    let mut drawn = 0;
    for (index, point) in effects.trail_points().enumerate() {
        let i = index as f64;
        let size = TRAIL_BASE_SIZE - TRAIL_SIZE_STEP * i;
        if size <= 0.0 {
            continue;
        }
        let alpha = ((TRAIL_FADE_STEPS - i) / TRAIL_FADE_STEPS) as f32;
        surface.fill_circle(point.x, point.y, size / 2.0, TRAIL_COLOR.with_alpha(alpha));
        drawn += 1;
    }
    drawn
}

/// Scatter one frame of confetti over the whole surface.
pub fn paint_confetti<S: Surface + ?Sized>(
    surface: &mut S,
    style: &ConfettiStyle,
    rng: &mut ConfettiRng,
) -> usize {
    let (width, height) = surface.size();
    let span = (style.max_size - style.min_size).max(0.0);
    for _ in 0..style.pieces {
        let x = rng.next_f64() * width;
        let y = rng.next_f64() * height;
        let size = style.min_size + rng.next_f64() * span;
        let color = CONFETTI_PALETTE[rng.index(CONFETTI_PALETTE.len())];
        surface.fill_rect(x, y, size, size, color);
    }
    style.pieces
}

// ---------------------------------------------------------------------------
// RenderLoop
// ---------------------------------------------------------------------------

/// Self-rescheduling frame painter.
///
/// Once started, every [`tick`](Self::tick) paints one frame and requests
/// the next. The loop never stops on its own; [`stop`](Self::stop) is the
/// teardown path.
#[derive(Debug, Clone)]
pub struct RenderLoop {
    style: ConfettiStyle,
    rng: ConfettiRng,
    running: bool,
    frame: u64,
}

impl RenderLoop {
    #[must_use]
    pub fn new(style: ConfettiStyle, seed: u64) -> Self {
        Self {
            style,
            rng: ConfettiRng::new(seed),
            running: false,
            frame: 0,
        }
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Frames painted so far.
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frame
    }

    /// Request the first frame. No-op if already running.
    pub fn start<F: FrameScheduler + ?Sized>(&mut self, frames: &mut F) {
        if self.running {
            return;
        }
        self.running = true;
        crate::debug!("render loop started");
        frames.request_frame();
    }

    /// Page teardown. Pending frame callbacks become no-ops.
    pub fn stop(&mut self) {
        if self.running {
            crate::debug!(frames = self.frame, "render loop stopped");
        }
        self.running = false;
    }

    /// Paint one frame and schedule the next.
    ///
    /// Returns `None` without drawing if the loop is stopped.
    pub fn tick<S, F>(
        &mut self,
        effects: &EffectState,
        surface: &mut S,
        frames: &mut F,
    ) -> Option<FrameStats>
    where
        S: Surface + ?Sized,
        F: FrameScheduler + ?Sized,
    {
        if !self.running {
            return None;
        }
        let stats = self.paint(effects, surface);
        frames.request_frame();
        Some(stats)
    }

    /// Paint one frame without touching the schedule.
    pub fn paint<S: Surface + ?Sized>(&mut self, effects: &EffectState, surface: &mut S) -> FrameStats {
        let (width, height) = surface.size();
        surface.clear_rect(0.0, 0.0, width, height);

        let trail_circles = paint_trail(effects, surface);
        let confetti_pieces = if effects.is_confetti_active() {
            paint_confetti(surface, &self.style, &mut self.rng)
        } else {
            0
        };

        self.frame += 1;
        FrameStats {
            frame: self.frame,
            trail_circles,
            confetti_pieces,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
