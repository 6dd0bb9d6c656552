//! Single snow particle.
//!
//! A flake stores only fractions of the stage and accumulated offsets; its
//! absolute position is derived from whatever stage bounds are current when
//! it is advanced, so a resize takes effect on the very next frame.

use rand::Rng;

use super::Rect;
use super::surface::DrawSurface;

pub const OPACITY_RANGE: (f64, f64) = (0.2, 0.8);
/// Extends past both edges so wind-drifted flakes enter from off-screen.
pub const REL_X_RANGE: (f64, f64) = (-0.15, 1.15);
pub const REL_Y_RANGE: (f64, f64) = (0.0, 1.0);
pub const SIZE_RANGE: (f64, f64) = (2.0, 5.0);
pub const DRIFT_RANGE: (f64, f64) = (0.0, 0.8);
pub const SPEED_RANGE: (f64, f64) = (0.5, 1.0);

/// Upper bound (exclusive) of the per-frame sway phase increment.
pub const PHASE_STEP_MAX: f64 = 1.0 / 50.0;
const SWAY_AMPLITUDE: f64 = 0.25;

pub const SHADOW_FILL: &str = "rgba(0,0,0,0.05)";
const SHADOW_OFFSET: f64 = 1.0;

/// Multipliers applied to every flake's sampled base values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlakeFactors {
    pub size: f64,
    pub velocity_x: f64,
    pub velocity_y: f64,
}

impl Default for FlakeFactors {
    fn default() -> Self {
        Self { size: 1.0, velocity_x: 1.0, velocity_y: 1.0 }
    }
}

#[derive(Clone, Debug)]
pub struct Flake {
    // Sampled once at creation.
    pub rel_x: f64,
    pub rel_y: f64,
    pub size: f64,
    pub drift: f64,
    pub speed: f64,
    pub opacity: f64,
    pub velocity_x_factor: f64,
    fill: String,
    // Runtime state.
    pub offset_x: f64,
    pub offset_y: f64,
    pub phase: f64,
}

fn sample<R: Rng + ?Sized>(rng: &mut R, (lo, hi): (f64, f64)) -> f64 {
    rng.gen_range(lo..=hi)
}

impl Flake {
    pub fn new<R: Rng + ?Sized>(rng: &mut R, factors: &FlakeFactors) -> Self {
        let opacity = sample(rng, OPACITY_RANGE);
        let rel_x = sample(rng, REL_X_RANGE);
        let rel_y = sample(rng, REL_Y_RANGE);
        let size = sample(rng, SIZE_RANGE) * factors.size;
        let drift = sample(rng, DRIFT_RANGE);
        let speed = sample(rng, SPEED_RANGE) * factors.velocity_y;
        Self {
            rel_x,
            rel_y,
            size,
            drift,
            speed,
            opacity,
            velocity_x_factor: factors.velocity_x,
            fill: format!("rgba(255,255,255,{opacity})"),
            offset_x: 0.0,
            offset_y: 0.0,
            phase: 0.0,
        }
    }

    /// Absolute position against the given stage bounds.
    pub fn position(&self, bounds: &Rect) -> (f64, f64) {
        (
            self.rel_x * bounds.width + self.offset_x,
            self.rel_y * bounds.height + self.offset_y,
        )
    }

    /// Horizontal velocity for the current sway phase.
    pub fn velocity_x(&self) -> f64 {
        (self.phase.cos() * SWAY_AMPLITUDE + self.drift) * self.velocity_x_factor
    }

    pub fn fill_style(&self) -> &str {
        &self.fill
    }

    /// Recycles the flake just above the top edge, keeping its slot (relative
    /// x, size, speed). The sway phase carries over.
    pub fn reset(&mut self, bounds: &Rect) {
        self.offset_x = 0.0;
        self.offset_y = -(self.rel_y * bounds.height + self.size);
    }

    fn draw<S: DrawSurface + ?Sized>(&self, x: f64, y: f64, surface: &mut S) {
        surface.set_fill(SHADOW_FILL);
        surface.begin_path();
        surface.circle(x + SHADOW_OFFSET, y + SHADOW_OFFSET, self.size);
        surface.fill();
        surface.set_fill(&self.fill);
        surface.begin_path();
        surface.circle(x, y, self.size);
        surface.fill();
    }
}

/// Moves `flake` one frame forward, draws it, and recycles it once it has
/// reached the bottom of `bounds`.
pub fn advance<S, R>(flake: &mut Flake, bounds: &Rect, surface: &mut S, rng: &mut R)
where
    S: DrawSurface + ?Sized,
    R: Rng + ?Sized,
{
    flake.phase += rng.gen_range(0.0..PHASE_STEP_MAX);
    flake.offset_x += flake.velocity_x();
    flake.offset_y += flake.speed;

    let (x, y) = flake.position(bounds);
    flake.draw(x, y, surface);

    if y >= bounds.height {
        flake.reset(bounds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::surface::recording::{DrawOp, RecordingSurface};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn in_range(v: f64, (lo, hi): (f64, f64)) -> bool {
        v >= lo && v <= hi
    }

    fn stage(width: f64, height: f64) -> Rect {
        Rect::new(0.0, 0.0, width, height)
    }

    #[test]
    fn sampled_fields_stay_in_documented_ranges() {
        let mut rng = SmallRng::seed_from_u64(7);
        let factors = FlakeFactors::default();
        let (mut min_x, mut max_x) = (f64::MAX, f64::MIN);
        for _ in 0..20_000 {
            let f = Flake::new(&mut rng, &factors);
            assert!(in_range(f.opacity, OPACITY_RANGE), "opacity {}", f.opacity);
            assert!(in_range(f.rel_x, REL_X_RANGE), "rel_x {}", f.rel_x);
            assert!(in_range(f.rel_y, REL_Y_RANGE), "rel_y {}", f.rel_y);
            assert!(in_range(f.size, SIZE_RANGE), "size {}", f.size);
            assert!(in_range(f.drift, DRIFT_RANGE), "drift {}", f.drift);
            assert!(in_range(f.speed, SPEED_RANGE), "speed {}", f.speed);
            min_x = min_x.min(f.rel_x);
            max_x = max_x.max(f.rel_x);
        }
        // The extended range really is used on both sides.
        assert!(min_x < 0.0 && max_x > 1.0);
    }

    #[test]
    fn factors_scale_size_and_fall_speed() {
        let factors = FlakeFactors { size: 2.0, velocity_x: 1.0, velocity_y: 3.0 };
        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..1_000 {
            let f = Flake::new(&mut rng, &factors);
            assert!(in_range(f.size, (4.0, 10.0)));
            assert!(in_range(f.speed, (1.5, 3.0)));
        }
    }

    #[test]
    fn falls_monotonically_between_resets() {
        let mut rng = SmallRng::seed_from_u64(3);
        let bounds = stage(800.0, 600.0);
        let mut surface = RecordingSurface::default();
        let mut flake = Flake::new(&mut rng, &FlakeFactors::default());
        let mut last_y = flake.position(&bounds).1;
        let mut resets = 0;
        for _ in 0..5_000 {
            advance(&mut flake, &bounds, &mut surface, &mut rng);
            let y = flake.position(&bounds).1;
            if y < last_y {
                resets += 1;
                assert!((y + flake.size).abs() < 1e-9, "reset must land at -size, got {y}");
            }
            assert!(y < bounds.height);
            last_y = y;
        }
        assert!(resets > 0);
    }

    #[test]
    fn reset_places_flake_above_top_and_keeps_slot() {
        let mut rng = SmallRng::seed_from_u64(5);
        let bounds = stage(400.0, 300.0);
        let mut surface = RecordingSurface::default();
        let mut flake = Flake::new(&mut rng, &FlakeFactors::default());
        let (rel_x, rel_y, size) = (flake.rel_x, flake.rel_y, flake.size);
        flake.offset_x = 12.0;
        flake.offset_y = bounds.height;

        advance(&mut flake, &bounds, &mut surface, &mut rng);

        assert_eq!(flake.offset_x, 0.0);
        let (_, y) = flake.position(&bounds);
        assert!((y - -size).abs() < 1e-9);
        assert_eq!((flake.rel_x, flake.rel_y, flake.size), (rel_x, rel_y, size));
    }

    #[test]
    fn draws_shadow_then_flake() {
        let mut rng = SmallRng::seed_from_u64(9);
        let bounds = stage(100.0, 100.0);
        let mut surface = RecordingSurface::default();
        let mut flake = Flake::new(&mut rng, &FlakeFactors::default());
        advance(&mut flake, &bounds, &mut surface, &mut rng);

        let circles = surface.circles();
        assert_eq!(circles.len(), 2);
        let (sx, sy, _) = circles[0];
        let (x, y, r) = circles[1];
        assert_eq!((sx, sy), (x + 1.0, y + 1.0));
        assert_eq!(r, flake.size);
        assert!(surface.ops.contains(&DrawOp::Fill(SHADOW_FILL.to_string())));
        assert!(surface.ops.contains(&DrawOp::Fill(flake.fill_style().to_string())));
    }

    #[test]
    fn sway_phase_survives_reset() {
        let mut rng = SmallRng::seed_from_u64(13);
        let bounds = stage(100.0, 10.0);
        let mut surface = RecordingSurface::default();
        let mut flake = Flake::new(&mut rng, &FlakeFactors::default());
        flake.offset_y = 50.0;
        advance(&mut flake, &bounds, &mut surface, &mut rng);
        // That frame recycled the flake; the phase it accumulated is kept.
        assert_eq!(flake.offset_x, 0.0);
        let phase = flake.phase;
        assert!((0.0..PHASE_STEP_MAX).contains(&phase));
        advance(&mut flake, &bounds, &mut surface, &mut rng);
        assert!(flake.phase >= phase);
    }

    #[test]
    fn sways_by_phase_and_drift_scaled_by_wind() {
        let mut rng = SmallRng::seed_from_u64(17);
        let bounds = stage(400.0, 1.0e6);
        let mut surface = RecordingSurface::default();
        let factors = FlakeFactors { velocity_x: 2.0, ..FlakeFactors::default() };
        let mut flake = Flake::new(&mut rng, &factors);
        assert_eq!(flake.offset_x, 0.0);

        advance(&mut flake, &bounds, &mut surface, &mut rng);

        let expected = (flake.phase.cos() * 0.25 + flake.drift) * 2.0;
        assert!((flake.offset_x - expected).abs() < 1e-12);
        assert!(flake.offset_x > 0.0);
    }

    #[test]
    fn no_wind_keeps_flakes_in_their_column() {
        let mut rng = SmallRng::seed_from_u64(19);
        let bounds = stage(400.0, 1.0e6);
        let mut surface = RecordingSurface::default();
        let factors = FlakeFactors { velocity_x: 0.0, ..FlakeFactors::default() };
        let mut flake = Flake::new(&mut rng, &factors);
        for _ in 0..100 {
            advance(&mut flake, &bounds, &mut surface, &mut rng);
        }
        assert_eq!(flake.offset_x, 0.0);
        assert!(flake.offset_y > 0.0);
    }
}
