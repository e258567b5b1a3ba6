use crate::dom;
use crate::overlay;
use landing_core::{Effect, Effects, InteractionController, RegionTable, SegmentScene};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

mod pointer;

pub use pointer::*;

pub type SharedController = Rc<RefCell<InteractionController<SegmentScene>>>;

/// Apply controller effects to the page.
pub fn apply_effects(document: &web::Document, regions: &RegionTable, effects: Effects) {
    for effect in effects {
        match effect {
            Effect::ShowInfo { segment, at } => match regions.get(segment.as_str()) {
                Some(entry) => overlay::show_info(document, entry, at),
                None => log::warn!("[info] no region entry for {}", segment),
            },
            Effect::HideInfo { segment } => overlay::hide_info(document, &segment),
            Effect::Navigate { href, .. } => dom::navigate(&href),
        }
    }
}

/// Keep the canvas backing store and the controller viewport in sync with
/// the window size.
pub fn wire_resize(canvas: &web::HtmlCanvasElement, controller: SharedController) {
    dom::sync_canvas_backing_size(canvas);
    let canvas_resize = canvas.clone();
    let resize_closure = Closure::wrap(Box::new(move || {
        dom::sync_canvas_backing_size(&canvas_resize);
        if let Some(window) = web::window() {
            let vp = dom::viewport_size(&window);
            controller.borrow_mut().on_resize(vp.width, vp.height);
        }
    }) as Box<dyn FnMut()>);
    if let Some(window) = web::window() {
        _ = window
            .add_event_listener_with_callback("resize", resize_closure.as_ref().unchecked_ref());
    }
    resize_closure.forget();
}
