//! Stage controller: ties a [`Stage`] to a host environment and runs its
//! lifecycle.
//!
//! ```text
//!   Inert      container selector matched nothing; never does any work
//!   Running    surface attached, geometry listener registered, frames looping
//!   TornDown   listener removed, pending frame cancelled, surface detached
//! ```
//!
//! Torn down is terminal. Every frame checks the lifecycle first, so a frame
//! the host still delivers after teardown is a no-op.

use rand::rngs::SmallRng;

use crate::error::SnowError;
use crate::options::SnowOptions;
use crate::stage::{DrawSurface, Rect, Stage};

/// Returned by [`Host::listen_geometry`]; hands the registration back on teardown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListenerHandle(pub u32);

/// Returned by [`Host::request_frame`]; cancels that one scheduled frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameHandle(pub i32);

/// Platform glue around the stage: measuring, the drawing surface, the
/// geometry-change listener and the display-refresh scheduler.
pub trait Host {
    type Surface: DrawSurface + ?Sized;

    /// On-screen rectangle of the container.
    fn container_bounds(&self) -> Rect;
    /// On-screen rectangles of every element inside the container matching
    /// `selector`.
    fn region_bounds(&self, selector: &str) -> Vec<Rect>;
    fn resize_surface(&mut self, bounds: &Rect);
    fn surface(&mut self) -> &mut Self::Surface;
    fn detach_surface(&mut self);

    fn listen_geometry(&mut self) -> Result<ListenerHandle, SnowError>;
    fn unlisten_geometry(&mut self, handle: ListenerHandle);
    /// Schedules one call of the controller's `frame` before the next repaint.
    fn request_frame(&mut self) -> Result<FrameHandle, SnowError>;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Inert,
    Running,
    TornDown,
}

struct Attached<H: Host> {
    host: H,
    stage: Stage,
    roof_selector: Option<String>,
    pile_selector: Option<String>,
    listener: Option<ListenerHandle>,
    pending_frame: Option<FrameHandle>,
}

pub struct StageController<H: Host> {
    lifecycle: Lifecycle,
    attached: Option<Attached<H>>,
}

impl<H: Host> StageController<H> {
    /// Sets up the stage on `host` and draws the first frame, which schedules
    /// the next. A missing host (the selector matched nothing) logs a warning
    /// and yields an inert controller.
    pub fn initialize(
        selector: &str,
        host: Option<H>,
        options: SnowOptions,
        rng: SmallRng,
    ) -> Result<Self, SnowError> {
        let Some(mut host) = host else {
            log::warn!(
                "There is no matching element in the DOM for the given \"selector\" {selector}."
            );
            return Ok(Self { lifecycle: Lifecycle::Inert, attached: None });
        };

        let bounds = host.container_bounds();
        host.resize_surface(&bounds);
        let stage = Stage::new(&options, bounds, rng);
        log::debug!(
            "snow stage on {selector}: {} flakes, preset {:?}",
            stage.flakes().len(),
            options.preset()
        );

        let mut controller = Self {
            lifecycle: Lifecycle::Running,
            attached: Some(Attached {
                host,
                stage,
                roof_selector: options.roof_selector,
                pile_selector: options.pile_selector,
                listener: None,
                pending_frame: None,
            }),
        };
        controller.recompute_geometry();
        if let Some(att) = controller.attached.as_mut() {
            match att.host.listen_geometry() {
                Ok(handle) => att.listener = Some(handle),
                Err(err) => {
                    att.host.detach_surface();
                    return Err(err);
                }
            }
        }
        controller.frame();
        Ok(controller)
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn stage(&self) -> Option<&Stage> {
        self.attached.as_ref().map(|att| &att.stage)
    }

    pub fn host(&self) -> Option<&H> {
        self.attached.as_ref().map(|att| &att.host)
    }

    pub fn host_mut(&mut self) -> Option<&mut H> {
        self.attached.as_mut().map(|att| &mut att.host)
    }

    /// Re-measures the container and every region, resizes the surface and
    /// rebuilds the stage geometry.
    pub fn recompute_geometry(&mut self) {
        if self.lifecycle != Lifecycle::Running {
            return;
        }
        let Some(att) = self.attached.as_mut() else {
            return;
        };
        let bounds = att.host.container_bounds();
        att.host.resize_surface(&bounds);
        let roofs = att
            .roof_selector
            .as_deref()
            .map(|sel| att.host.region_bounds(sel))
            .unwrap_or_default();
        let piles = att
            .pile_selector
            .as_deref()
            .map(|sel| att.host.region_bounds(sel))
            .unwrap_or_default();
        att.stage.recompute_geometry(bounds, &roofs, &piles);
    }

    /// Draws one frame and schedules the next.
    pub fn frame(&mut self) {
        if self.lifecycle != Lifecycle::Running {
            return;
        }
        let Some(att) = self.attached.as_mut() else {
            return;
        };
        att.pending_frame = None;
        att.stage.frame(att.host.surface());
        match att.host.request_frame() {
            Ok(handle) => att.pending_frame = Some(handle),
            Err(err) => log::error!("snow animation stopped: {err}"),
        }
    }

    /// Stops the loop, unregisters the geometry listener and detaches the
    /// surface. The lifecycle flips first so an already scheduled frame that
    /// still fires does nothing.
    pub fn teardown(&mut self) {
        if self.lifecycle != Lifecycle::Running {
            log::debug!("teardown ignored in {:?} state", self.lifecycle);
            return;
        }
        self.lifecycle = Lifecycle::TornDown;
        if let Some(att) = self.attached.as_mut() {
            if let Some(handle) = att.pending_frame.take() {
                att.host.cancel_frame(handle);
            }
            if let Some(handle) = att.listener.take() {
                att.host.unlisten_geometry(handle);
            }
            att.host.detach_surface();
        }
        log::debug!("snow stage torn down");
    }
}
