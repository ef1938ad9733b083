#![cfg(target_arch = "wasm32")]
use glam::UVec2;
use hydro_core::TestCard;
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod app;
mod constants;
mod dom;
mod events;
mod frame;
mod input;
mod sensor;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("hydrochroma-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;

    let canvas_el = document
        .get_element_by_id(constants::CANVAS_ID)
        .ok_or_else(|| anyhow::anyhow!("missing #{}", constants::CANVAS_ID))?;
    let canvas: web::HtmlCanvasElement = canvas_el
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;

    // Maintain canvas internal pixel size to match CSS size * devicePixelRatio
    let mut listeners: Vec<dom::EventListener> = dom::wire_canvas_resize(&canvas).into_iter().collect();

    let density = window.device_pixel_ratio() as f32;
    let app = Rc::new(RefCell::new(app::AppState::new(density)?));
    log::info!(
        "[engine] canvas {}x{} density {:.2}",
        canvas.width(),
        canvas.height(),
        density
    );

    let gpu = frame::init_gpu(&canvas).await;
    listeners.extend(events::wire_input_handlers(
        &window, &document, &canvas, &app,
    ));

    let frame_ctx = Rc::new(RefCell::new(frame::FrameContext {
        app,
        gpu,
        canvas,
        content: TestCard::new(0, 0),
        listeners,
        last_instant: Instant::now(),
        size: UVec2::ZERO,
    }));
    frame::start_loop(frame_ctx);
    Ok(())
}
