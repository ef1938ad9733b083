use crate::constants::{ENGINE_SEED, SHOCKWAVE_SEED};
use crate::input::{KeyAction, WebControls};
use crate::sensor::DeviceMotionSensor;
use glam::Vec2;
use hydro_core::{DistortionEngine, PointerEvent, ShockwaveController};
use hydro_render::{GpuState, OuterLayer};
use std::time::Duration;

/// Everything the page's event handlers and frame loop share.
pub struct AppState {
    engine: DistortionEngine,
    wave_engine: DistortionEngine,
    shockwave: ShockwaveController,
    controls: WebControls,
    density: f32,
}

fn build_engine(controls: &WebControls, density: f32) -> anyhow::Result<DistortionEngine> {
    let config = controls.config(density);
    let mut engine = DistortionEngine::new(config, ENGINE_SEED)?;
    if !engine.attach_sensor(Box::new(DeviceMotionSensor::new())) {
        log::info!("[tilt] no accelerometer, dispersion stays level");
    }
    Ok(engine)
}

impl AppState {
    pub fn new(density: f32) -> anyhow::Result<Self> {
        let controls = WebControls::default();
        Ok(Self {
            engine: build_engine(&controls, density)?,
            wave_engine: DistortionEngine::new(
                ShockwaveController::effect_config(density),
                SHOCKWAVE_SEED,
            )?,
            shockwave: ShockwaveController::new(),
            controls,
            density,
        })
    }

    pub fn resize(&mut self, size: Vec2) {
        self.engine.resize(size);
        self.wave_engine.resize(size);
    }

    pub fn pointer(&mut self, ev: &PointerEvent) {
        let response = self.engine.handle_pointer(ev);
        if response.ripple {
            log::debug!("[gesture] ripple at {:?}", ev.position);
        }
    }

    pub fn key(&mut self, action: KeyAction) {
        if action == KeyAction::Shockwave {
            self.shockwave.trigger(None);
            return;
        }
        if !self.controls.apply(action) {
            return;
        }
        match build_engine(&self.controls, self.density) {
            Ok(mut engine) => {
                engine.resize(self.engine.view_size());
                // the old engine drops here and releases its sensor
                self.engine = engine;
                log::info!("[engine] {:?}", self.controls);
            }
            Err(e) => log::warn!("[engine] config rejected: {e}"),
        }
    }

    /// Fire the screen-wide wave, e.g. when the tab comes back into view.
    pub fn shockwave(&mut self, origin: Option<Vec2>) {
        self.shockwave.trigger(origin);
    }

    pub fn render(&mut self, dt: Duration, gpu: &mut GpuState<'_>) -> Result<(), wgpu::SurfaceError> {
        let frame = self.engine.frame(dt);
        self.shockwave.tick(dt);
        if !self.shockwave.is_active() {
            return gpu.render(&frame, self.engine.config(), self.engine.post_chain());
        }
        let view = self.wave_engine.view_size();
        self.wave_engine
            .set_ripple_override(Some(self.shockwave.ripple_override(view)));
        self.wave_engine
            .set_chromatic_active(self.shockwave.chromatic_active());
        let wave = self.wave_engine.frame(dt);
        // the wave distorts the already-distorted surface
        gpu.render_stacked(
            &frame,
            self.engine.config(),
            self.engine.post_chain(),
            Some(OuterLayer {
                frame: &wave,
                chain: self.wave_engine.post_chain(),
            }),
        )
    }
}
