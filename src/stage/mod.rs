//! Snow stage: the flakes, piles and roof strips drawn over one container.
//!
//! `Stage` is the single owner of the current stage bounds. Flakes never keep
//! a copy; every frame passes the current bounds down, so replacing them in
//! [`Stage::recompute_geometry`] is all it takes to rescale the whole layer.

use rand::rngs::SmallRng;

use crate::options::SnowOptions;

pub mod flake;
pub mod pile;
pub mod surface;

pub use flake::{advance, Flake, FlakeFactors};
pub use pile::{Pile, PileParticle};
pub use surface::DrawSurface;

/// Height of the strip painted along a roof's top edge.
pub const ROOF_STRIP_HEIGHT: f64 = 10.0;

// --- Geometry ----------------------------------------------------------------

/// Axis-aligned rectangle: left/top offset plus size, in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    pub fn center_x(&self) -> f64 {
        self.left + self.width * 0.5
    }

    /// Same rectangle expressed relative to `origin`'s top-left corner.
    pub fn relative_to(&self, origin: &Rect) -> Rect {
        Rect::new(self.left - origin.left, self.top - origin.top, self.width, self.height)
    }
}

// --- Stage -------------------------------------------------------------------

pub struct Stage {
    bounds: Rect,
    flakes: Vec<Flake>,
    piles: Vec<Pile>,
    /// Roof rectangles, relative to the stage origin.
    roofs: Vec<Rect>,
    roof_fill: &'static str,
    wash: Option<&'static str>,
    rng: SmallRng,
}

impl Stage {
    pub fn new(options: &SnowOptions, bounds: Rect, mut rng: SmallRng) -> Self {
        let factors = options.flake_factors();
        let flakes = (0..options.flake_count())
            .map(|_| Flake::new(&mut rng, &factors))
            .collect();
        Self {
            bounds,
            flakes,
            piles: Vec::new(),
            roofs: Vec::new(),
            roof_fill: options.roof_fill(),
            wash: options.preset().background_wash(),
            rng,
        }
    }

    pub fn bounds(&self) -> &Rect {
        &self.bounds
    }

    pub fn flakes(&self) -> &[Flake] {
        &self.flakes
    }

    pub fn piles(&self) -> &[Pile] {
        &self.piles
    }

    pub fn roofs(&self) -> &[Rect] {
        &self.roofs
    }

    /// Replaces the stage bounds and rebuilds all region-derived geometry.
    /// `roofs` and `piles` are in the same screen coordinates as `bounds`.
    pub fn recompute_geometry(&mut self, bounds: Rect, roofs: &[Rect], piles: &[Rect]) {
        self.bounds = bounds;
        self.roofs = roofs.iter().map(|r| r.relative_to(&bounds)).collect();
        let rng = &mut self.rng;
        self.piles = piles
            .iter()
            .map(|r| Pile::new(r.relative_to(&bounds), rng))
            .collect();
        log::debug!(
            "stage geometry {}x{} at ({}, {}): {} roofs, {} piles",
            bounds.width,
            bounds.height,
            bounds.left,
            bounds.top,
            self.roofs.len(),
            self.piles.len()
        );
    }

    /// Draws one frame: clear, optional wash, roofs, piles, then every flake
    /// in creation order.
    pub fn frame<S: DrawSurface + ?Sized>(&mut self, surface: &mut S) {
        let Rect { width, height, .. } = self.bounds;
        surface.clear(width, height);

        if let Some(wash) = self.wash {
            surface.set_fill(wash);
            surface.fill_rect(0.0, 0.0, width, height);
        }

        if !self.roofs.is_empty() {
            surface.set_fill(self.roof_fill);
            for roof in &self.roofs {
                surface.fill_rect(roof.left, roof.top, roof.width, ROOF_STRIP_HEIGHT);
            }
        }

        for pile in &self.piles {
            pile.draw(surface);
        }

        for flake in &mut self.flakes {
            advance(flake, &self.bounds, surface, &mut self.rng);
        }
    }
}
