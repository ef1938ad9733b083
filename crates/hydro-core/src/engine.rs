//! One distortion surface: owns its physics, ripple, clock and tilt state and
//! turns them into a parameter block each frame.

use crate::compositor::{Compositor, ShaderCompositor};
use crate::config::{ClickAction, EffectConfig};
use crate::error::Result;
use crate::gesture::{GestureConfig, GesturePhase, GestureResponse, GestureTracker, PhysicsState, PointerEvent};
use crate::image::Image;
use crate::params::{FrameInputs, ParameterBlock, RippleOverride};
use crate::post::PostChain;
use crate::ripple::{RippleDraw, RippleState, RippleTimeline, TriggerSource};
use crate::shape::apply_clip;
use crate::tilt::{AccelSample, AccelerometerSource, TiltListener, TiltNormalizer, TiltVector};
use crate::timeline::ContinuousClock;
use glam::Vec2;
use std::sync::Arc;
use std::time::Duration;

/// Surface transform hosts apply on top of the distorted image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerTransform {
    pub offset: Vec2,
    pub scale_x: f32,
    pub scale_y: f32,
    /// Interaction intensity in [0, 1].
    pub interaction: f32,
}

impl Default for LayerTransform {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale_x: 1.0,
            scale_y: 1.0,
            interaction: 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    pub params: ParameterBlock,
    pub layer: LayerTransform,
}

pub struct DistortionEngine {
    config: Arc<EffectConfig>,
    gesture: GestureTracker,
    ripple: RippleTimeline,
    clock: ContinuousClock,
    normalizer: TiltNormalizer,
    sensor: Option<TiltListener>,
    tilt: TiltVector,
    view_size: Vec2,
    ripple_override: Option<RippleOverride>,
    chromatic_active: bool,
    compositor: Box<dyn Compositor>,
    post: PostChain,
}

impl DistortionEngine {
    /// Validates `config`; `seed` makes ripple randomization reproducible.
    pub fn new(config: impl Into<Arc<EffectConfig>>, seed: u64) -> Result<Self> {
        let config: Arc<EffectConfig> = config.into();
        config.validate()?;
        let gesture = GestureTracker::new(GestureConfig {
            draggable: config.draggable,
            touch_slop_px: config.touch_slop_px(),
            ripple_trigger: config.ripple_trigger,
        });
        let ripple = RippleTimeline::new(config.animations.click_action, seed);
        let normalizer = TiltNormalizer::new(config.resting_angle_deg);
        let post = PostChain::from_config(&config);
        log::info!(
            "[engine] new click={:?} animate={:?} palette={} post_steps={}",
            config.animations.click_action,
            config.animations.animate_action,
            config.chromatic.as_ref().map_or(0, |c| c.len()),
            post.steps().len()
        );
        Ok(Self {
            config,
            gesture,
            ripple,
            clock: ContinuousClock::default(),
            normalizer,
            sensor: None,
            tilt: TiltVector::ZERO,
            view_size: Vec2::ZERO,
            ripple_override: None,
            chromatic_active: true,
            compositor: Box::new(ShaderCompositor),
            post,
        })
    }

    pub fn with_compositor(mut self, compositor: Box<dyn Compositor>) -> Self {
        self.set_compositor(compositor);
        self
    }

    pub fn set_compositor(&mut self, compositor: Box<dyn Compositor>) {
        log::info!("[engine] compositor: {}", compositor.name());
        self.compositor = compositor;
    }

    pub fn config(&self) -> &Arc<EffectConfig> {
        &self.config
    }

    pub fn resize(&mut self, size: Vec2) {
        if size != self.view_size {
            log::debug!("[engine] resize {}x{}", size.x, size.y);
            self.view_size = size;
        }
    }

    pub fn view_size(&self) -> Vec2 {
        self.view_size
    }

    /// Feed one pointer event. Ignored while an external override drives
    /// the ripple.
    pub fn handle_pointer(&mut self, ev: &PointerEvent) -> GestureResponse {
        if self.ripple_override.is_some() {
            return GestureResponse::default();
        }
        let response = self.gesture.handle(ev);
        if response.ripple && self.config.animations.click_action != ClickAction::None {
            self.trigger_ripple(self.config.ripple_source);
        }
        response
    }

    /// Start a ripple at the current touch position.
    pub fn trigger_ripple(&mut self, source: TriggerSource) -> RippleDraw {
        self.ripple
            .trigger(source, &self.config.effects.expand, self.config.density)
    }

    /// Push one accelerometer sample directly. Shares the normalizer with an
    /// attached sensor, so the latest sample from either side wins.
    pub fn handle_accel(&mut self, sample: AccelSample) -> TiltVector {
        self.tilt = self.normalizer.ingest(sample);
        self.tilt
    }

    /// Subscribe to a platform sensor for the lifetime of this engine, or
    /// until [`detach_sensor`](Self::detach_sensor). Returns whether the
    /// subscription succeeded; tilt stays level otherwise.
    pub fn attach_sensor(&mut self, source: Box<dyn AccelerometerSource>) -> bool {
        let listener = TiltListener::new(source);
        let ok = listener.is_subscribed();
        self.sensor = Some(listener);
        ok
    }

    pub fn detach_sensor(&mut self) {
        self.sensor = None;
    }

    pub fn set_ripple_override(&mut self, ripple_override: Option<RippleOverride>) {
        self.ripple_override = ripple_override;
    }

    pub fn set_chromatic_active(&mut self, active: bool) {
        self.chromatic_active = active;
    }

    pub fn tick(&mut self, dt: Duration) {
        self.gesture.tick(dt);
        self.ripple.tick(dt);
        self.clock.tick(dt);
        if let Some(sensor) = self.sensor.as_mut() {
            self.tilt = sensor.pump(&mut self.normalizer);
        }
    }

    /// Consistent parameter block for the current state.
    pub fn snapshot(&self) -> ParameterBlock {
        ParameterBlock::snapshot(&FrameInputs {
            config: self.config.as_ref(),
            physics: self.gesture.physics(),
            ripple: self.ripple.state(),
            ripple_override: self.ripple_override,
            time: self.clock.value(),
            tilt: self.tilt,
            view_size: self.view_size,
            chromatic_active: self.chromatic_active,
        })
    }

    pub fn layer(&self) -> LayerTransform {
        let physics = self.gesture.physics();
        LayerTransform {
            offset: if self.config.draggable {
                self.gesture.drag_offset()
            } else {
                Vec2::ZERO
            },
            scale_x: physics.scale_x,
            scale_y: physics.scale_y,
            interaction: physics.interaction_progress,
        }
    }

    /// Advance every timeline by `dt` and snapshot the result.
    pub fn frame(&mut self, dt: Duration) -> Frame {
        self.tick(dt);
        Frame {
            params: self.snapshot(),
            layer: self.layer(),
        }
    }

    /// CPU render of `content` with the current state: compositor, post
    /// chain, then clip.
    pub fn render(&self, content: &Image) -> Image {
        let mut params = self.snapshot();
        if params.size == Vec2::ZERO {
            params.size = Vec2::new(content.width() as f32, content.height() as f32);
        }
        self.render_with(content, &params)
    }

    pub fn render_with(&self, content: &Image, params: &ParameterBlock) -> Image {
        let composed = self.compositor.compose(content, params);
        let filtered = self.post.apply(composed);
        apply_clip(filtered, self.config.shape, self.config.density)
    }

    pub fn post_chain(&self) -> &PostChain {
        &self.post
    }

    pub fn physics(&self) -> &PhysicsState {
        self.gesture.physics()
    }

    pub fn gesture_phase(&self) -> GesturePhase {
        self.gesture.phase()
    }

    pub fn ripple_state(&self) -> RippleState {
        self.ripple.state()
    }

    pub fn is_rippling(&self) -> bool {
        self.ripple.is_active()
    }

    pub fn tilt(&self) -> TiltVector {
        self.tilt
    }

    pub fn has_sensor(&self) -> bool {
        self.sensor.as_ref().is_some_and(|s| s.is_subscribed())
    }
}
