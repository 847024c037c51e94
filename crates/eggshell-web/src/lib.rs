#![forbid(unsafe_code)]

//! WASM frontend for Eggshell.
//!
//! The JS side forwards DOM events as JSON ([`input`]), owns a `<canvas>`
//! that the render loop paints every animation frame, and receives toasts
//! ([`toast`]) through a callback. Form state crosses the boundary as JSON
//! too ([`form`]). All behaviour lives in `eggshell-core`; this crate only
//! adapts it to the browser.

pub mod form;
pub mod input;
pub mod toast;

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::EggshellWeb;

/// Native builds compile this crate as a stub so `cargo check --workspace` stays
/// green on non-wasm targets.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
pub struct EggshellWeb;

#[cfg(not(target_arch = "wasm32"))]
impl EggshellWeb {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self
    }
}
