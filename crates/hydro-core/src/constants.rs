// Shared physics, timing and shading constants.
//
// The compositor constants are mirrored as literals in `shaders/hydro.wgsl`;
// change both together.

// Tilt
pub const STANDARD_GRAVITY: f32 = 9.81; // m/s^2
pub const DEFAULT_RESTING_ANGLE_DEG: f32 = 45.0; // hand-held phone pose reads as level
pub const ACCEL_NORMALIZE_DIVISOR: f32 = 5.0; // m/s^2 that maps to a full-scale tilt
pub const TILT_EFFECT_GAIN: f32 = 15.0; // raw tilt -> dispersion offset before max_tilt clamp
pub const DEFAULT_MAX_TILT: f32 = 10.0;

// Palette
pub const MAX_PALETTE_COLORS: usize = 8;

// Continuous clock: 1000 units per 100 s, then restart
pub const CLOCK_UNITS_PER_SEC: f32 = 10.0;
pub const CLOCK_WRAP: f32 = 1000.0;

// Ripple randomization
pub const RIPPLE_SEED_RANGE: f32 = 100.0;
pub const DEFAULT_STRENGTH_RANGE: (f32, f32) = (10.0, 35.0); // dp
pub const DEFAULT_WIDTH_RANGE: (f32, f32) = (80.0, 200.0); // dp
pub const DEFAULT_RIPPLE_STRENGTH: f32 = 15.0; // px, before the first trigger
pub const DEFAULT_RIPPLE_WIDTH: f32 = 100.0; // px
pub const GENERIC_DURATION_MS: (u32, u32) = (800, 1600);
pub const ABERRATION_DURATION_MS: (u32, u32) = (1000, 1800);
pub const SHOCKWAVE_DURATION_MS: u32 = 600;

// Gesture physics
pub const VELOCITY_NORMALIZE: f32 = 2000.0; // px/s per unit of velocity magnitude
pub const VELOCITY_HORIZON_MS: u64 = 100;
pub const VELOCITY_MAX_SAMPLES: usize = 20;
pub const STRETCH_X_GAIN: f32 = 0.1;
pub const STRETCH_Y_GAIN: f32 = 0.05;
pub const STRETCH_LIMIT: f32 = 0.2; // +-20%
pub const DEFAULT_TOUCH_SLOP: f32 = 8.0; // dp
pub const PRESS_INTENSITY: f32 = 0.2;
pub const DRAG_INTENSITY: f32 = 1.0;

// Spring stiffness presets (critically damped)
pub const STIFFNESS_LOW: f32 = 200.0;
pub const STIFFNESS_MEDIUM: f32 = 1500.0;
pub const SPRING_REST_DISPLACEMENT: f32 = 0.001;
pub const SPRING_REST_VELOCITY: f32 = 0.01;

// Morph noise field
pub const MORPH_TIME_SCALE: f32 = 0.5;
pub const MORPH_FREQ_MAJOR: f32 = 0.02;
pub const MORPH_FREQ_MINOR: f32 = 0.01;
pub const MORPH_AMPLITUDE_SCALE: f32 = 10.0;

// Fluid ripple
pub const FLUID_SPATIAL_FREQ: f32 = 0.05;
pub const FLUID_PHASE_SPEED: f32 = 15.0;
pub const FLUID_SEED_PHASE: f32 = 10.0;

// Dispersion
pub const TILT_EPSILON: f32 = 0.001;
pub const DISPERSION_TILT_GAIN: f32 = 4.0;
pub const DISPERSION_DISPLACEMENT_GAIN: f32 = 0.2;
pub const BRIGHTNESS_RECOVERY: f32 = 0.45; // calibrated, not a physical normalization
pub const MASK_ALPHA_LOW: f32 = 0.1;
pub const MASK_ALPHA_HIGH: f32 = 0.8;

// Post blur: radius (px) -> sigma = r * 1/sqrt(3) + 0.5
pub const BLUR_RADIUS_TO_SIGMA: f32 = 0.57735;
pub const BLUR_SIGMA_BIAS: f32 = 0.5;

// Shockwave preset
pub const SHOCKWAVE_CHROMATIC_DENSITY: f32 = 2.5;
pub const SHOCKWAVE_FLUIDITY: f32 = 0.8;
pub const SHOCKWAVE_ORIGIN_HEIGHT: f32 = 0.9; // fraction of view height
