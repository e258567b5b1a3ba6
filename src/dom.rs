use landing_core::Viewport;
use web_sys as web;

pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) {
    if let Some(w) = web::window() {
        let dpr = w.device_pixel_ratio();
        let rect = canvas.get_bounding_client_rect();
        let w_px = (rect.width() * dpr) as u32;
        let h_px = (rect.height() * dpr) as u32;
        canvas.set_width(w_px.max(1));
        canvas.set_height(h_px.max(1));
    }
}

/// Window inner size in CSS pixels; pointer events are normalized against it.
pub fn viewport_size(window: &web::Window) -> Viewport {
    let read = |v: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
        v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32
    };
    Viewport::new(read(window.inner_width()), read(window.inner_height()))
}

/// Full-page redirect.
pub fn navigate(href: &str) {
    let Some(window) = web::window() else {
        return;
    };
    if let Err(e) = window.location().set_href(href) {
        log::error!("navigation to {} failed: {:?}", href, e);
    }
}
