/// Web front-end tuning constants.
///
/// Effect tuning lives in `hydro_core::constants`; these only cover how the
/// page drives the engine.
pub const CANVAS_ID: &str = "app-canvas";

// Fixed seeds keep ripple draws reproducible across reloads
pub const ENGINE_SEED: u64 = 0x4859_4452;
pub const SHOCKWAVE_SEED: u64 = ENGINE_SEED + 1;

// Long stalls (tab in background, debugger) are clamped to one step
pub const MAX_FRAME_DT_MS: u64 = 100;

// Samples buffered between frames; older ones are dropped
pub const MAX_PENDING_MOTION: usize = 8;
