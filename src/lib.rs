//! SnowDOM core crate.
//!
//! Renders animated snowfall over any DOM container on a 2D canvas. Flakes sway
//! as they fall and recycle above the top edge; optional "roof" regions are
//! measured (and painted in debug mode) and optional "pile" regions grow a
//! static mound of snow along their top edge.
//!
//! The simulation (`stage`) and lifecycle (`controller`) are plain Rust and run
//! natively under `cargo test`; `dom` is the browser glue behind the exported
//! `SnowDOM` JS class.

use wasm_bindgen::prelude::*;

pub mod controller;
pub mod dom;
pub mod error;
pub mod options;
pub mod stage;

pub use controller::{FrameHandle, Host, Lifecycle, ListenerHandle, StageController};
pub use dom::SnowDom;
pub use error::SnowError;
pub use options::{Preset, SnowOptions};
pub use stage::{DrawSurface, Flake, FlakeFactors, Pile, PileParticle, Rect, Stage};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    let level = if cfg!(debug_assertions) {
        log::Level::Debug
    } else {
        log::Level::Info
    };
    // Fails only if a logger is already installed.
    console_log::init_with_level(level).ok();
}
