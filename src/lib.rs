#![cfg(target_arch = "wasm32")]
use instant::Instant;
use landing_core::{load_glb, InteractionController, ProfileName, SegmentScene, SiteConfig};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod assets;
mod constants;
mod dom;
mod events;
mod frame;
mod layout;
mod overlay;
mod render;

static SITE_JSON: &str = include_str!("../config/site.json");

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("landing-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

/// `data-profile` on the canvas wins over the configured profile.
fn select_profile(canvas: &web::HtmlCanvasElement, configured: ProfileName) -> ProfileName {
    let Some(attr) = canvas.get_attribute(constants::PROFILE_ATTRIBUTE) else {
        return configured;
    };
    match attr.parse() {
        Ok(p) => p,
        Err(e) => {
            log::warn!("{}; using {:?}", e, configured);
            configured
        }
    }
}

async fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;

    let canvas_el = document
        .get_element_by_id(constants::APP_CANVAS_ID)
        .ok_or_else(|| anyhow::anyhow!("missing #{}", constants::APP_CANVAS_ID))?;
    let canvas: web::HtmlCanvasElement = canvas_el
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;

    let config = SiteConfig::from_json(SITE_JSON)?;
    let profile_name = select_profile(&canvas, config.profile);
    log::info!(
        "[config] profile {:?}, {} regions",
        profile_name,
        config.regions.len()
    );

    dom::sync_canvas_backing_size(&canvas);
    let viewport = dom::viewport_size(&window);
    let controller: events::SharedController = Rc::new(RefCell::new(InteractionController::new(
        &config,
        profile_name.profile(),
        SegmentScene::new(config.model.transform()),
        viewport,
    )));

    events::wire_resize(&canvas, controller.clone());
    events::wire_input_handlers(events::InputWiring {
        document: document.clone(),
        controller: controller.clone(),
    });

    // Render loop runs from the start; the model shows up once loaded
    let gpu = frame::init_gpu(&canvas).await;
    let frame_ctx = Rc::new(RefCell::new(frame::FrameContext {
        controller: controller.clone(),
        document: document.clone(),
        canvas: canvas.clone(),
        gpu,
        last_instant: Instant::now(),
    }));
    frame::start_loop(frame_ctx);

    let loaded = assets::fetch_bytes(&config.model.asset)
        .await
        .and_then(|bytes| load_glb(&bytes, &config.model).map_err(anyhow::Error::from));
    match loaded {
        Ok(scene) => {
            log::info!("[model] {} loaded ({} nodes)", config.model.asset, scene.len());
            let effects = controller.borrow_mut().set_scene(scene);
            events::apply_effects(&document, &config.regions, effects);
            controller.borrow_mut().start_intro();
            overlay::model_ready(&document);
        }
        Err(e) => {
            log::error!("[model] failed to load {}: {:?}", config.model.asset, e);
            overlay::hide_loading(&document);
        }
    }

    Ok(())
}
