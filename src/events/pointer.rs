use super::{apply_effects, SharedController};
use wasm_bindgen::JsCast;
use web_sys as web;

#[derive(Clone)]
pub struct InputWiring {
    pub document: web::Document,
    pub controller: SharedController,
}

pub fn wire_input_handlers(w: InputWiring) {
    wire_pointermove(&w);
    wire_click(&w);
}

// Listeners sit on the window and use client coordinates, matching the
// window-sized viewport the controller normalizes against.
fn wire_pointermove(w: &InputWiring) {
    let w = w.clone();
    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        let (x, y) = (ev.client_x() as f32, ev.client_y() as f32);
        let effects = w.controller.borrow_mut().on_pointer_move(x, y);
        if effects.is_empty() {
            return;
        }
        let ctrl = w.controller.borrow();
        apply_effects(&w.document, ctrl.regions(), effects);
    }) as Box<dyn FnMut(_)>);

    if let Some(wnd) = web::window() {
        _ = wnd.add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}

fn wire_click(w: &InputWiring) {
    let w = w.clone();
    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::MouseEvent| {
        let (x, y) = (ev.client_x() as f32, ev.client_y() as f32);
        let effects = w.controller.borrow_mut().on_click(x, y);
        if effects.is_empty() {
            return;
        }
        let ctrl = w.controller.borrow();
        apply_effects(&w.document, ctrl.regions(), effects);
    }) as Box<dyn FnMut(_)>);

    if let Some(wnd) = web::window() {
        _ = wnd.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}
