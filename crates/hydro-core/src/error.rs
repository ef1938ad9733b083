use thiserror::Error;

/// Errors surfaced by the core crate.
///
/// Most runtime conditions (missing sensor, disabled dispersion, oversized
/// palette) degrade gracefully instead of erroring; these variants cover the
/// cases a caller must fix.
#[derive(Debug, Error)]
pub enum HydroError {
    #[error("invalid effect config: {0}")]
    InvalidConfig(String),

    #[error("image buffer holds {actual} pixels, expected {width}x{height}")]
    ImageSize {
        width: u32,
        height: u32,
        actual: usize,
    },

    #[error("accelerometer unavailable: {0}")]
    SensorUnavailable(String),
}

pub type Result<T> = std::result::Result<T, HydroError>;
