//! Immutable effect configuration.
//!
//! An [`EffectConfig`] is built once, validated, and then shared by reference
//! (usually behind an `Arc`) with the engine that consumes it. Lengths are in
//! device-independent units and are multiplied by [`EffectConfig::density`]
//! wherever pixels are needed.

use crate::constants::*;
use crate::error::{HydroError, Result};
use crate::ripple::TriggerSource;
use glam::Vec4;
use smallvec::SmallVec;

pub mod colors {
    use glam::Vec4;

    pub const RED: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);
    pub const GREEN: Vec4 = Vec4::new(0.0, 1.0, 0.0, 1.0);
    pub const BLUE: Vec4 = Vec4::new(0.0, 0.0, 1.0, 1.0);
    pub const CYAN: Vec4 = Vec4::new(0.0, 1.0, 1.0, 1.0);
    pub const MAGENTA: Vec4 = Vec4::new(1.0, 0.0, 1.0, 1.0);
    pub const YELLOW: Vec4 = Vec4::new(1.0, 1.0, 0.0, 1.0);
    pub const TRANSPARENT: Vec4 = Vec4::ZERO;
}

/// Ordered dispersion palette, at most eight colors.
#[derive(Clone, Debug, PartialEq)]
pub struct ChromaticConfig {
    colors: SmallVec<[Vec4; MAX_PALETTE_COLORS]>,
}

impl ChromaticConfig {
    /// Builds a palette from any color sequence. Entries past the eighth are
    /// dropped.
    pub fn new(colors: impl IntoIterator<Item = Vec4>) -> Self {
        let mut iter = colors.into_iter();
        let kept: SmallVec<[Vec4; MAX_PALETTE_COLORS]> =
            iter.by_ref().take(MAX_PALETTE_COLORS).collect();
        let dropped = iter.count();
        if dropped > 0 {
            log::debug!(
                "[config] palette truncated to {} colors ({} dropped)",
                MAX_PALETTE_COLORS,
                dropped
            );
        }
        Self { colors: kept }
    }

    pub fn colors(&self) -> &[Vec4] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl Default for ChromaticConfig {
    fn default() -> Self {
        Self::new([colors::RED, colors::GREEN, colors::BLUE])
    }
}

/// Shorthand for `Some(ChromaticConfig::new(colors))`.
pub fn chromatic_aberration(colors: impl IntoIterator<Item = Vec4>) -> Option<ChromaticConfig> {
    Some(ChromaticConfig::new(colors))
}

/// Closed range of device-independent lengths.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LengthRange {
    pub min: f32,
    pub max: f32,
}

impl LengthRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn to_px(self, density: f32) -> (f32, f32) {
        (self.min * density, self.max * density)
    }

    fn validate(&self, name: &str) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(HydroError::InvalidConfig(format!("{name} range is not finite")));
        }
        if self.min < 0.0 || self.min > self.max {
            return Err(HydroError::InvalidConfig(format!(
                "{name} range {}..{} must satisfy 0 <= min <= max",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExpandConfig {
    pub strength: LengthRange,
    pub width: LengthRange,
}

impl Default for ExpandConfig {
    fn default() -> Self {
        Self {
            strength: LengthRange::new(DEFAULT_STRENGTH_RANGE.0, DEFAULT_STRENGTH_RANGE.1),
            width: LengthRange::new(DEFAULT_WIDTH_RANGE.0, DEFAULT_WIDTH_RANGE.1),
        }
    }
}

pub fn expand(strength: LengthRange, width: LengthRange) -> ExpandConfig {
    ExpandConfig { strength, width }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HydroEffects {
    /// Post blur radius (device-independent); 0 disables the pass.
    pub blur: f32,
    /// Saturation factor; 1 disables the pass.
    pub vibrancy: f32,
    pub chromatic_density: f32,
    pub fluidity: f32,
    pub morph_strength: f32,
    pub expand: ExpandConfig,
    pub max_tilt: f32,
}

impl Default for HydroEffects {
    fn default() -> Self {
        Self {
            blur: 0.0,
            vibrancy: 1.0,
            chromatic_density: 1.0,
            fluidity: 1.0,
            morph_strength: 0.2,
            expand: ExpandConfig::default(),
            max_tilt: DEFAULT_MAX_TILT,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClickAction {
    None,
    Expand,
    #[default]
    Fluid,
}

impl ClickAction {
    /// Mode code understood by the compositor.
    pub fn code(self) -> i32 {
        match self {
            ClickAction::None => 0,
            ClickAction::Expand => 1,
            ClickAction::Fluid => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AnimateAction {
    #[default]
    None,
    Morph,
}

impl AnimateAction {
    pub fn code(self) -> i32 {
        match self {
            AnimateAction::None => 0,
            AnimateAction::Morph => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HydroAnimations {
    pub click_action: ClickAction,
    pub animate_action: AnimateAction,
}

pub fn animations(on_click: ClickAction, on_animate: AnimateAction) -> HydroAnimations {
    HydroAnimations {
        click_action: on_click,
        animate_action: on_animate,
    }
}

/// When a pointer interaction fires the ripple.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RippleTrigger {
    /// Tap release and drag end (glass container behaviour).
    #[default]
    OnRelease,
    /// Pointer down (bare modifier behaviour).
    OnPress,
}

/// Clip region of the effect surface. Pixels outside are transparent.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum ClipShape {
    #[default]
    Rectangle,
    RoundedRect {
        radius: f32,
    },
    Capsule,
}

impl ClipShape {
    /// Shape code and corner radius in pixels, as consumed by the present pass.
    pub fn code_and_radius(self, density: f32) -> (i32, f32) {
        match self {
            ClipShape::Rectangle => (0, 0.0),
            ClipShape::RoundedRect { radius } => (1, radius * density),
            ClipShape::Capsule => (2, 0.0),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EffectConfig {
    /// `None` disables dispersion entirely.
    pub chromatic: Option<ChromaticConfig>,
    pub effects: HydroEffects,
    pub animations: HydroAnimations,
    /// Suppress dispersion over translucent pixels (glass backgrounds).
    pub alpha_mask: bool,
    pub draggable: bool,
    pub shape: ClipShape,
    pub ripple_trigger: RippleTrigger,
    /// Duration range used by pointer-fired ripples.
    pub ripple_source: TriggerSource,
    /// Pixels per device-independent unit.
    pub density: f32,
    pub resting_angle_deg: f32,
    pub touch_slop: f32,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            chromatic: Some(ChromaticConfig::default()),
            effects: HydroEffects::default(),
            animations: HydroAnimations::default(),
            alpha_mask: true,
            draggable: false,
            shape: ClipShape::Rectangle,
            ripple_trigger: RippleTrigger::OnRelease,
            ripple_source: TriggerSource::Generic,
            density: 1.0,
            resting_angle_deg: DEFAULT_RESTING_ANGLE_DEG,
            touch_slop: DEFAULT_TOUCH_SLOP,
        }
    }
}

impl EffectConfig {
    pub fn with_chromatic(mut self, chromatic: Option<ChromaticConfig>) -> Self {
        self.chromatic = chromatic;
        self
    }

    pub fn with_effects(mut self, effects: HydroEffects) -> Self {
        self.effects = effects;
        self
    }

    pub fn with_animations(mut self, animations: HydroAnimations) -> Self {
        self.animations = animations;
        self
    }

    pub fn with_alpha_mask(mut self, alpha_mask: bool) -> Self {
        self.alpha_mask = alpha_mask;
        self
    }

    pub fn with_draggable(mut self, draggable: bool) -> Self {
        self.draggable = draggable;
        self
    }

    pub fn with_shape(mut self, shape: ClipShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_ripple_trigger(mut self, trigger: RippleTrigger) -> Self {
        self.ripple_trigger = trigger;
        self
    }

    pub fn with_ripple_source(mut self, source: TriggerSource) -> Self {
        self.ripple_source = source;
        self
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    /// Blur radius in pixels.
    pub fn blur_px(&self) -> f32 {
        self.effects.blur * self.density
    }

    pub fn touch_slop_px(&self) -> f32 {
        self.touch_slop * self.density
    }

    pub fn validate(&self) -> Result<()> {
        let e = &self.effects;
        let scalars = [
            ("blur", e.blur),
            ("vibrancy", e.vibrancy),
            ("chromatic_density", e.chromatic_density),
            ("fluidity", e.fluidity),
            ("morph_strength", e.morph_strength),
            ("max_tilt", e.max_tilt),
            ("density", self.density),
            ("resting_angle_deg", self.resting_angle_deg),
            ("touch_slop", self.touch_slop),
        ];
        for (name, v) in scalars {
            if !v.is_finite() {
                return Err(HydroError::InvalidConfig(format!("{name} is not finite")));
            }
        }
        if e.blur < 0.0 {
            return Err(HydroError::InvalidConfig("blur radius is negative".into()));
        }
        if e.max_tilt < 0.0 {
            return Err(HydroError::InvalidConfig("max_tilt is negative".into()));
        }
        if self.density <= 0.0 {
            return Err(HydroError::InvalidConfig("density must be positive".into()));
        }
        if self.touch_slop < 0.0 {
            return Err(HydroError::InvalidConfig("touch_slop is negative".into()));
        }
        if let ClipShape::RoundedRect { radius } = self.shape {
            if !radius.is_finite() || radius < 0.0 {
                return Err(HydroError::InvalidConfig("corner radius is negative".into()));
            }
        }
        e.expand.strength.validate("expand strength")?;
        e.expand.width.validate("expand width")?;
        Ok(())
    }
}
