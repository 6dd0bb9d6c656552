//! Minimal 2D drawing surface used by the stage.
//!
//! Only the handful of canvas calls the snow layer needs are exposed, so the
//! simulation can be driven against a recording surface in native tests and
//! against `CanvasRenderingContext2d` in the browser.

use std::f64::consts::TAU;

use web_sys::CanvasRenderingContext2d;

pub trait DrawSurface {
    /// Clears the rectangle `(0, 0, width, height)`.
    fn clear(&mut self, width: f64, height: f64);
    fn set_fill(&mut self, style: &str);
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn begin_path(&mut self);
    /// Adds a full circle to the current path.
    fn circle(&mut self, x: f64, y: f64, radius: f64);
    fn fill(&mut self);
}

impl DrawSurface for CanvasRenderingContext2d {
    fn clear(&mut self, width: f64, height: f64) {
        self.clear_rect(0.0, 0.0, width, height);
    }

    fn set_fill(&mut self, style: &str) {
        self.set_fill_style_str(style);
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        CanvasRenderingContext2d::fill_rect(self, x, y, width, height);
    }

    fn begin_path(&mut self) {
        CanvasRenderingContext2d::begin_path(self);
    }

    fn circle(&mut self, x: f64, y: f64, radius: f64) {
        // Only rejects negative radii, which the stage never produces.
        let _ = self.arc(x, y, radius, 0.0, TAU);
    }

    fn fill(&mut self) {
        CanvasRenderingContext2d::fill(self);
    }
}
