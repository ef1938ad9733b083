use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::{event::*, event_loop::EventLoop, window::WindowBuilder};

use glam::{UVec2, Vec2};
use hydro_core::config::{animations, AnimateAction, ClickAction, ClipShape};
use hydro_core::constants::{ACCEL_NORMALIZE_DIVISOR, STANDARD_GRAVITY};
use hydro_core::{
    AccelSample, AccelerometerSource, ContentSource, DistortionEngine, EffectConfig, PointerEvent,
    ShockwaveController, TestCard,
};
use hydro_render::{GpuState, OuterLayer};

const RESTING_ANGLE_DEG: f32 = 45.0;
const DEMO_BLUR: f32 = 4.0; // dp
const DEMO_VIBRANCY: f32 = 1.6;
const ENGINE_SEED: u64 = 0x4859_4452;

/// Arrow keys held, as a tilt in [-1, 1] per axis.
#[derive(Default)]
struct HeldArrows {
    left: bool,
    right: bool,
    up: bool,
    down: bool,
}

impl HeldArrows {
    fn set(&mut self, key: KeyCode, pressed: bool) -> bool {
        match key {
            KeyCode::ArrowLeft => self.left = pressed,
            KeyCode::ArrowRight => self.right = pressed,
            KeyCode::ArrowUp => self.up = pressed,
            KeyCode::ArrowDown => self.down = pressed,
            _ => return false,
        }
        true
    }

    fn tilt(&self) -> Vec2 {
        let axis = |neg: bool, pos: bool| (pos as i32 - neg as i32) as f32;
        Vec2::new(axis(self.left, self.right), axis(self.up, self.down))
    }
}

/// Raw reading a phone held at `resting_angle_deg` would report for `tilt`.
fn simulated_sample(tilt: Vec2, resting_angle_deg: f32) -> AccelSample {
    let rest_y = resting_angle_deg.to_radians().sin() * STANDARD_GRAVITY;
    let rest_z = resting_angle_deg.to_radians().cos() * STANDARD_GRAVITY;
    AccelSample::new(
        -tilt.x * ACCEL_NORMALIZE_DIVISOR,
        rest_y + tilt.y * ACCEL_NORMALIZE_DIVISOR,
        rest_z,
    )
}

/// Keyboard-driven accelerometer: emits a sample whenever the arrows change.
struct KeyboardTilt {
    arrows: Rc<RefCell<HeldArrows>>,
    last: Option<Vec2>,
}

impl AccelerometerSource for KeyboardTilt {
    fn subscribe(&mut self) -> hydro_core::Result<()> {
        log::info!("[tilt] arrow keys simulate the accelerometer");
        Ok(())
    }

    fn poll(&mut self) -> Option<AccelSample> {
        let tilt = self.arrows.borrow().tilt();
        if self.last == Some(tilt) {
            return None;
        }
        self.last = Some(tilt);
        Some(simulated_sample(tilt, RESTING_ANGLE_DEG))
    }

    fn unsubscribe(&mut self) {
        self.last = None;
    }
}

/// Demo knobs switchable from the keyboard.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Controls {
    click: ClickAction,
    morph: bool,
    blur: bool,
    vibrant: bool,
    shape: ClipShape,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            click: ClickAction::Fluid,
            morph: false,
            blur: false,
            vibrant: false,
            shape: ClipShape::Rectangle,
        }
    }
}

impl Controls {
    /// Returns true when the key changed the effect configuration.
    fn apply_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Digit1 => self.click = ClickAction::Fluid,
            KeyCode::Digit2 => self.click = ClickAction::Expand,
            KeyCode::Digit3 => self.click = ClickAction::None,
            KeyCode::KeyM => self.morph = !self.morph,
            KeyCode::KeyB => self.blur = !self.blur,
            KeyCode::KeyV => self.vibrant = !self.vibrant,
            KeyCode::KeyC => {
                self.shape = match self.shape {
                    ClipShape::Rectangle => ClipShape::RoundedRect { radius: 32.0 },
                    ClipShape::RoundedRect { .. } => ClipShape::Capsule,
                    ClipShape::Capsule => ClipShape::Rectangle,
                }
            }
            _ => return false,
        }
        true
    }

    fn config(&self, density: f32) -> EffectConfig {
        let base = EffectConfig::default();
        let mut effects = base.effects;
        effects.blur = if self.blur { DEMO_BLUR } else { 0.0 };
        effects.vibrancy = if self.vibrant { DEMO_VIBRANCY } else { 1.0 };
        let animate = if self.morph {
            AnimateAction::Morph
        } else {
            AnimateAction::None
        };
        base.with_effects(effects)
            .with_animations(animations(self.click, animate))
            .with_draggable(true)
            .with_shape(self.shape)
            .with_density(density)
    }
}

struct App<'w> {
    window: &'w winit::window::Window,
    gpu: GpuState<'w>,
    engine: DistortionEngine,
    wave_engine: DistortionEngine,
    shockwave: ShockwaveController,
    content: TestCard,
    controls: Controls,
    arrows: Rc<RefCell<HeldArrows>>,
    cursor: Vec2,
    pressed: bool,
    start: Instant,
    last_frame: Instant,
}

impl<'w> App<'w> {
    async fn new(window: &'w winit::window::Window) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let gpu = GpuState::new(window, size.width, size.height).await?;
        let density = window.scale_factor() as f32;
        let controls = Controls::default();
        let arrows = Rc::new(RefCell::new(HeldArrows::default()));
        let engine = build_engine(controls.config(density), &arrows)?;
        let wave_engine =
            DistortionEngine::new(ShockwaveController::effect_config(density), ENGINE_SEED + 1)?;
        let now = Instant::now();
        let mut app = Self {
            window,
            gpu,
            engine,
            wave_engine,
            shockwave: ShockwaveController::new(),
            content: TestCard::new(size.width, size.height),
            controls,
            arrows,
            cursor: Vec2::ZERO,
            pressed: false,
            start: now,
            last_frame: now,
        };
        app.resize(size);
        if app.gpu.is_fallback() {
            log::warn!("[native] running without distortion");
        }
        Ok(app)
    }

    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn resize(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.gpu.resize_if_needed(size.width, size.height);
        let view = Vec2::new(size.width as f32, size.height as f32);
        self.engine.resize(view);
        self.wave_engine.resize(view);
        self.content.resize(UVec2::new(size.width, size.height));
        if let Some(frame) = self.content.current_frame() {
            self.gpu.upload_content(frame);
        }
    }

    fn rebuild_engine(&mut self) {
        let density = self.window.scale_factor() as f32;
        match build_engine(self.controls.config(density), &self.arrows) {
            Ok(mut engine) => {
                engine.resize(self.engine.view_size());
                self.engine = engine;
                log::info!("[native] {:?}", self.controls);
            }
            Err(e) => log::warn!("[native] config rejected: {e}"),
        }
    }

    fn pointer(&mut self, ev: PointerEvent) {
        let response = self.engine.handle_pointer(&ev);
        if let Some(delta) = response.drag_delta {
            log::debug!("[mouse] drag {delta:?}");
        }
    }

    fn key(&mut self, key: KeyCode, pressed: bool) {
        if self.arrows.borrow_mut().set(key, pressed) || !pressed {
            return;
        }
        if key == KeyCode::Space {
            let origin = self.pressed.then_some(self.cursor);
            self.shockwave.trigger(origin);
        } else if self.controls.apply_key(key) {
            self.rebuild_engine();
        }
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let now = Instant::now();
        let dt = (now - self.last_frame).min(Duration::from_millis(100));
        self.last_frame = now;

        let frame = self.engine.frame(dt);
        self.shockwave.tick(dt);
        if self.shockwave.is_active() {
            let view = self.wave_engine.view_size();
            self.wave_engine
                .set_ripple_override(Some(self.shockwave.ripple_override(view)));
            self.wave_engine
                .set_chromatic_active(self.shockwave.chromatic_active());
            let wave = self.wave_engine.frame(dt);
            self.gpu.render_stacked(
                &frame,
                self.engine.config(),
                self.engine.post_chain(),
                Some(OuterLayer {
                    frame: &wave,
                    chain: self.wave_engine.post_chain(),
                }),
            )
        } else {
            self.gpu
                .render(&frame, self.engine.config(), self.engine.post_chain())
        }
    }
}

fn build_engine(
    config: EffectConfig,
    arrows: &Rc<RefCell<HeldArrows>>,
) -> anyhow::Result<DistortionEngine> {
    let mut engine = DistortionEngine::new(config, ENGINE_SEED)?;
    engine.attach_sensor(Box::new(KeyboardTilt {
        arrows: Rc::clone(arrows),
        last: None,
    }));
    Ok(engine)
}

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let event_loop = EventLoop::new().expect("event loop");
    let window = WindowBuilder::new()
        .with_title("HydroChroma (native)")
        .build(&event_loop)
        .expect("window");

    let mut app = pollster::block_on(App::new(&window)).expect("gpu");
    log::info!("[native] drag with the mouse, arrows tilt, 1/2/3 click mode, M morph, B blur, V vibrancy, C clip, space shockwave");

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::Resized(size) => app.resize(size),
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::CursorMoved { position, .. } => {
                    app.cursor = Vec2::new(position.x as f32, position.y as f32);
                    if app.pressed {
                        let t = app.now_ms();
                        app.pointer(PointerEvent::moved(app.cursor, t));
                    }
                }
                WindowEvent::MouseInput {
                    state,
                    button: MouseButton::Left,
                    ..
                } => {
                    let t = app.now_ms();
                    match state {
                        ElementState::Pressed => {
                            app.pressed = true;
                            app.pointer(PointerEvent::down(app.cursor, t));
                        }
                        ElementState::Released => {
                            app.pressed = false;
                            app.pointer(PointerEvent::up(app.cursor, t));
                        }
                    }
                }
                WindowEvent::CursorLeft { .. } if app.pressed => {
                    app.pressed = false;
                    let t = app.now_ms();
                    app.pointer(PointerEvent::cancel(t));
                }
                WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            physical_key: PhysicalKey::Code(key),
                            state,
                            repeat: false,
                            ..
                        },
                    ..
                } => app.key(key, state == ElementState::Pressed),
                _ => {}
            },
            Event::AboutToWait => match app.render() {
                Ok(_) => app.window.request_redraw(),
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => app.gpu.reconfigure(),
                Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                Err(_) => {}
            },
            _ => {}
        })
        .unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydro_core::tilt::TiltNormalizer;

    #[test]
    fn simulated_samples_normalize_back_to_the_held_tilt() {
        let n = TiltNormalizer::new(RESTING_ANGLE_DEG);
        for tilt in [Vec2::ZERO, Vec2::new(1.0, 0.0), Vec2::new(-1.0, 1.0)] {
            let t = n.normalize(simulated_sample(tilt, RESTING_ANGLE_DEG));
            assert!((t.x - tilt.x).abs() < 1e-5, "{t:?}");
            assert!((t.y - tilt.y).abs() < 1e-5, "{t:?}");
        }
    }

    #[test]
    fn opposite_arrows_cancel() {
        let mut a = HeldArrows::default();
        assert!(a.set(KeyCode::ArrowLeft, true));
        assert_eq!(a.tilt(), Vec2::new(-1.0, 0.0));
        a.set(KeyCode::ArrowRight, true);
        assert_eq!(a.tilt(), Vec2::ZERO);
        assert!(!a.set(KeyCode::KeyQ, true));
    }

    #[test]
    fn keyboard_tilt_only_reports_changes() {
        let arrows = Rc::new(RefCell::new(HeldArrows::default()));
        let mut source = KeyboardTilt {
            arrows: Rc::clone(&arrows),
            last: None,
        };
        assert!(source.poll().is_some());
        assert!(source.poll().is_none());
        arrows.borrow_mut().set(KeyCode::ArrowDown, true);
        assert!(source.poll().is_some());
    }

    #[test]
    fn controls_build_valid_configs() {
        let mut c = Controls::default();
        for key in [
            KeyCode::Digit2,
            KeyCode::KeyM,
            KeyCode::KeyB,
            KeyCode::KeyV,
            KeyCode::KeyC,
            KeyCode::KeyC,
        ] {
            assert!(c.apply_key(key));
            assert!(c.config(2.0).validate().is_ok());
        }
        assert!(!c.apply_key(KeyCode::KeyZ));
        let config = c.config(2.0);
        assert_eq!(config.animations.click_action, ClickAction::Expand);
        assert_eq!(config.animations.animate_action, AnimateAction::Morph);
        assert_eq!(config.shape, ClipShape::Capsule);
        assert_eq!(config.blur_px(), DEMO_BLUR * 2.0);
    }
}
