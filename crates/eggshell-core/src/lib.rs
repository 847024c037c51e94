#![forbid(unsafe_code)]

//! Core: timed input-sequence recognition, gesture timers, and the per-frame
//! effect state behind the page's hidden interactions.
//!
//! Nothing in this crate touches a platform API. Hosts feed normalized
//! [`event::InputEvent`]s, move a [`scheduler::Scheduler`] clock, paint
//! through the [`render::Surface`] trait, and receive toasts through a
//! [`notify::NotificationSink`]. [`controller::EasterEggs`] wires it all up.

pub mod config;
pub mod controller;
pub mod effects;
pub mod event;
pub mod gesture;
pub mod logging;
pub mod notify;
pub mod render;
pub mod scheduler;
pub mod sequence;
pub mod validation;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};

pub use config::{ConfigError, EggConfig};
pub use controller::{Activation, EasterEggs, Timer};
pub use notify::{Notification, NotificationSink, ToastKind};
