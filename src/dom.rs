//! Browser glue: mounts the drawing surface into a DOM container and exposes
//! the `SnowDOM` class to JS.
//!
//! ```js
//! const snow = new SnowDOM("#header", { pileSelector: ".snowdom-pile" });
//! // later
//! snow.destroy();
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use rand::SeedableRng;
use rand::rngs::SmallRng;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{window, CanvasRenderingContext2d, Element, HtmlCanvasElement, Window};

use crate::controller::{FrameHandle, Host, ListenerHandle, StageController};
use crate::error::SnowError;
use crate::options::SnowOptions;
use crate::stage::Rect;

const CANVAS_STYLE: &[(&str, &str)] = &[
    ("pointer-events", "none"),
    ("position", "absolute"),
    ("z-index", "1000000"),
];

fn to_rect(el: &Element) -> Rect {
    let r = el.get_bounding_client_rect();
    Rect::new(r.left(), r.top(), r.width(), r.height())
}

// --- Host --------------------------------------------------------------------

pub struct DomHost {
    window: Window,
    container: Element,
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    on_frame: Closure<dyn FnMut(f64)>,
    on_resize: Closure<dyn FnMut()>,
    next_listener: u32,
}

impl DomHost {
    /// Resolves `selector` and appends a fresh canvas to it. `Ok(None)` when
    /// nothing matches.
    pub fn mount(
        selector: &str,
        on_frame: Closure<dyn FnMut(f64)>,
        on_resize: Closure<dyn FnMut()>,
    ) -> Result<Option<Self>, SnowError> {
        let window = window().ok_or(SnowError::NoWindow)?;
        let document = window.document().ok_or(SnowError::NoDocument)?;
        let Some(container) = document.query_selector(selector)? else {
            return Ok(None);
        };

        let canvas: HtmlCanvasElement = document
            .create_element("canvas")?
            .dyn_into()
            .map_err(|_| SnowError::Js("created element is not a canvas".to_string()))?;
        let style = canvas.style();
        for (prop, value) in CANVAS_STYLE {
            style.set_property(prop, value)?;
        }
        let context: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or(SnowError::NoContext)?
            .dyn_into()
            .map_err(|_| SnowError::NoContext)?;
        container.append_child(&canvas)?;

        Ok(Some(Self {
            window,
            container,
            canvas,
            context,
            on_frame,
            on_resize,
            next_listener: 0,
        }))
    }
}

impl Host for DomHost {
    type Surface = CanvasRenderingContext2d;

    fn container_bounds(&self) -> Rect {
        to_rect(&self.container)
    }

    fn region_bounds(&self, selector: &str) -> Vec<Rect> {
        let list = match self.container.query_selector_all(selector) {
            Ok(list) => list,
            Err(err) => {
                log::warn!("invalid region selector {selector}: {err:?}");
                return Vec::new();
            }
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|el| to_rect(&el))
            .collect()
    }

    fn resize_surface(&mut self, bounds: &Rect) {
        let style = self.canvas.style();
        style.set_property("top", &format!("{}px", bounds.top)).ok();
        style.set_property("left", &format!("{}px", bounds.left)).ok();
        self.canvas.set_width(bounds.width.max(0.0) as u32);
        self.canvas.set_height(bounds.height.max(0.0) as u32);
    }

    fn surface(&mut self) -> &mut CanvasRenderingContext2d {
        &mut self.context
    }

    fn detach_surface(&mut self) {
        self.canvas.remove();
    }

    fn listen_geometry(&mut self) -> Result<ListenerHandle, SnowError> {
        self.window
            .add_event_listener_with_callback("resize", self.on_resize.as_ref().unchecked_ref())?;
        self.next_listener += 1;
        Ok(ListenerHandle(self.next_listener))
    }

    fn unlisten_geometry(&mut self, _handle: ListenerHandle) {
        if let Err(err) = self
            .window
            .remove_event_listener_with_callback("resize", self.on_resize.as_ref().unchecked_ref())
        {
            log::warn!("failed to remove resize listener: {err:?}");
        }
    }

    fn request_frame(&mut self) -> Result<FrameHandle, SnowError> {
        let id = self
            .window
            .request_animation_frame(self.on_frame.as_ref().unchecked_ref())?;
        Ok(FrameHandle(id))
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Err(err) = self.window.cancel_animation_frame(handle.0) {
            log::warn!("failed to cancel animation frame {}: {err:?}", handle.0);
        }
    }
}

// --- JS class ----------------------------------------------------------------

type Slot = Rc<RefCell<Option<StageController<DomHost>>>>;

fn with_controller(
    slot: &Weak<RefCell<Option<StageController<DomHost>>>>,
    f: impl FnOnce(&mut StageController<DomHost>),
) {
    let Some(slot) = slot.upgrade() else {
        return;
    };
    // Only busy if JS re-enters from inside a frame; skip rather than panic.
    if let Ok(mut guard) = slot.try_borrow_mut() {
        if let Some(controller) = guard.as_mut() {
            f(controller);
        }
    }
}

fn parse_options(value: &JsValue) -> SnowOptions {
    if value.is_undefined() || value.is_null() {
        return SnowOptions::default();
    }
    match js_sys::JSON::stringify(value).ok().and_then(|s| s.as_string()) {
        Some(json) => SnowOptions::from_json(&json),
        None => {
            log::warn!("snow options are not serializable, using defaults");
            SnowOptions::default()
        }
    }
}

/// Snowfall layer over one DOM container.
#[wasm_bindgen(js_name = SnowDOM)]
pub struct SnowDom {
    slot: Slot,
}

#[wasm_bindgen(js_class = SnowDOM)]
impl SnowDom {
    /// Mounts the layer and starts animating. If `selector` matches nothing a
    /// warning is logged and the instance stays inert.
    #[wasm_bindgen(constructor)]
    pub fn new(selector: &str, options: JsValue) -> Result<SnowDom, JsValue> {
        let options = parse_options(&options);
        let slot: Slot = Rc::new(RefCell::new(None));

        let on_frame = {
            let slot = Rc::downgrade(&slot);
            Closure::wrap(Box::new(move |_ts: f64| {
                with_controller(&slot, StageController::frame);
            }) as Box<dyn FnMut(f64)>)
        };
        let on_resize = {
            let slot = Rc::downgrade(&slot);
            Closure::wrap(Box::new(move || {
                with_controller(&slot, StageController::recompute_geometry);
            }) as Box<dyn FnMut()>)
        };

        let host = DomHost::mount(selector, on_frame, on_resize)?;
        let controller =
            StageController::initialize(selector, host, options, SmallRng::from_entropy())?;
        *slot.borrow_mut() = Some(controller);
        Ok(SnowDom { slot })
    }

    /// Stops the animation, removes the resize listener and the canvas.
    pub fn destroy(&self) {
        with_controller(&Rc::downgrade(&self.slot), StageController::teardown);
    }

    /// `false` once destroyed, or when the selector matched nothing.
    #[wasm_bindgen(getter)]
    pub fn running(&self) -> bool {
        self.slot
            .borrow()
            .as_ref()
            .is_some_and(|c| c.lifecycle() == crate::controller::Lifecycle::Running)
    }
}

impl Drop for SnowDom {
    // The closures die with the host, so nothing may stay scheduled.
    fn drop(&mut self) {
        self.destroy();
    }
}
