use crate::events::{apply_effects, SharedController};
use crate::render;
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub struct FrameContext<'a> {
    pub controller: SharedController,
    pub document: web::Document,
    pub canvas: web::HtmlCanvasElement,
    pub gpu: Option<render::GpuState<'a>>,
    pub last_instant: Instant,
}

impl<'a> FrameContext<'a> {
    pub fn frame(&mut self) {
        let now = Instant::now();
        let dt = now - self.last_instant;
        self.last_instant = now;

        let effects = self.controller.borrow_mut().tick(dt);
        if !effects.is_empty() {
            let ctrl = self.controller.borrow();
            apply_effects(&self.document, ctrl.regions(), effects);
        }

        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        let ctrl = self.controller.borrow();
        let scene = ctrl.scene();
        if gpu.uploaded_nodes() != scene.len() {
            gpu.upload_scene(scene);
        }
        gpu.resize_if_needed(self.canvas.width(), self.canvas.height());
        match gpu.render(ctrl.camera(), scene) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("[render] surface lost or outdated; reconfiguring");
                gpu.reconfigure();
            }
            Err(e) => log::error!("[render] {:?}", e),
        }
    }
}

pub async fn init_gpu(canvas: &web::HtmlCanvasElement) -> Option<render::GpuState<'static>> {
    // leak a canvas clone to satisfy 'static lifetime for surface
    let leaked_canvas = Box::leak(Box::new(canvas.clone()));
    match render::GpuState::new(leaked_canvas).await {
        Ok(g) => Some(g),
        Err(e) => {
            log::error!("WebGPU init error: {:?}", e);
            None
        }
    }
}

fn request_frame(tick: &Rc<RefCell<Option<Closure<dyn FnMut()>>>>) {
    let tick = tick.borrow();
    let (Some(w), Some(cb)) = (web::window(), tick.as_ref()) else {
        return;
    };
    _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext<'static>>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    let frame_ctx_tick = frame_ctx.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame_ctx_tick.borrow_mut().frame();
        request_frame(&tick_clone);
    }) as Box<dyn FnMut()>));
    request_frame(&tick);
}
