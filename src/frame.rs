use crate::app::AppState;
use crate::constants::MAX_FRAME_DT_MS;
use crate::dom::EventListener;
use glam::{UVec2, Vec2};
use hydro_core::{ContentSource, TestCard};
use hydro_render::GpuState;
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub struct FrameContext {
    pub app: Rc<RefCell<AppState>>,
    pub gpu: Option<GpuState<'static>>,
    pub canvas: web::HtmlCanvasElement,
    pub content: TestCard,
    // kept alive for as long as the loop runs
    pub listeners: Vec<EventListener>,
    pub last_instant: Instant,
    pub size: UVec2,
}

impl FrameContext {
    pub fn frame(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_instant).min(Duration::from_millis(MAX_FRAME_DT_MS));
        self.last_instant = now;

        self.sync_size();
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        match self.app.borrow_mut().render(dt, gpu) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => gpu.reconfigure(),
            Err(e) => log::warn!("[gpu] frame skipped: {e:?}"),
        }
    }

    /// Follow the canvas backing size: surface, engine view and content.
    fn sync_size(&mut self) {
        let size = UVec2::new(self.canvas.width(), self.canvas.height());
        if size == self.size || size.x == 0 || size.y == 0 {
            return;
        }
        self.size = size;
        self.app
            .borrow_mut()
            .resize(Vec2::new(size.x as f32, size.y as f32));
        self.content.resize(size);
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.resize_if_needed(size.x, size.y);
            if let Some(image) = self.content.current_frame() {
                gpu.upload_content(image);
            }
        }
    }
}

pub async fn init_gpu(canvas: &web::HtmlCanvasElement) -> Option<GpuState<'static>> {
    let target = wgpu::SurfaceTarget::Canvas(canvas.clone());
    match GpuState::new(target, canvas.width(), canvas.height()).await {
        Ok(g) => {
            if g.is_fallback() {
                log::warn!("[gpu] distortion shader rejected, content shown unmodified");
            }
            Some(g)
        }
        Err(e) => {
            log::error!("[gpu] WebGPU init failed: {:?}", e);
            None
        }
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    let frame_ctx_tick = frame_ctx.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame_ctx_tick.borrow_mut().frame();
        request_frame(&tick_clone);
    }) as Box<dyn FnMut()>));
    request_frame(&tick);
}

fn request_frame(tick: &Rc<RefCell<Option<Closure<dyn FnMut()>>>>) {
    if let (Some(w), Some(cb)) = (web::window(), tick.borrow().as_ref()) {
        _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}
