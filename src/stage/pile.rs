//! Accumulated snow along the top edge of a pile region.

use rand::Rng;

use super::Rect;
use super::surface::DrawSurface;

/// Radius of the largest pile particle before jitter.
pub const BASE_RADIUS: f64 = 10.0;
/// Particles are spread over this fraction of the width on either side of center.
pub const SPREAD: f64 = 0.45;
const FALLOFF: f64 = 0.33;
const JITTER: f64 = 0.5;
pub const PILE_FILL: &str = "rgba(250,250,250,1)";

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PileParticle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

#[derive(Clone, Debug)]
pub struct Pile {
    region: Rect,
    particles: Vec<PileParticle>,
}

impl Pile {
    /// Builds one particle per whole horizontal unit of `region`; particles
    /// near the center come out bigger and sit higher, giving a mound.
    pub fn new<R: Rng + ?Sized>(region: Rect, rng: &mut R) -> Self {
        let center = region.center_x();
        let half = region.width * SPREAD;
        let count = region.width.max(0.0).floor() as usize;

        let particles = (0..count)
            .map(|_| {
                let spread: f64 = rng.gen_range(-1.0..=1.0);
                let jitter: f64 = rng.gen_range(-JITTER..=JITTER);
                let radius = BASE_RADIUS - spread.abs() * BASE_RADIUS * FALLOFF + jitter;
                PileParticle {
                    x: center + spread * half,
                    y: region.top + BASE_RADIUS * 0.75 - radius * 1.5,
                    radius,
                }
            })
            .collect();

        Self { region, particles }
    }

    pub fn region(&self) -> &Rect {
        &self.region
    }

    pub fn particles(&self) -> &[PileParticle] {
        &self.particles
    }

    /// Fills every particle as one path so overlaps blend as a single shape.
    pub fn draw<S: DrawSurface + ?Sized>(&self, surface: &mut S) {
        surface.set_fill(PILE_FILL);
        surface.begin_path();
        for p in &self.particles {
            surface.circle(p.x, p.y, p.radius);
        }
        surface.fill();
    }
}
