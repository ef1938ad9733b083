pub mod compositor;
pub mod config;
pub mod constants;
pub mod content;
pub mod engine;
pub mod error;
pub mod gesture;
pub mod image;
pub mod params;
pub mod post;
pub mod ripple;
pub mod shape;
pub mod shockwave;
pub mod tilt;
pub mod timeline;

pub static HYDRO_WGSL: &str = include_str!("../shaders/hydro.wgsl");
pub static POST_WGSL: &str = include_str!("../shaders/post.wgsl");

pub use compositor::{Compositor, Passthrough, ShaderCompositor};
pub use config::*;
pub use content::{ContentSource, StaticContent, TestCard};
pub use engine::{DistortionEngine, Frame, LayerTransform};
pub use error::{HydroError, Result};
pub use gesture::{GesturePhase, GestureResponse, PhysicsState, PointerEvent, PointerKind};
pub use image::Image;
pub use params::{HydroUniforms, ParameterBlock, RippleOverride};
pub use post::{PostChain, PostStep};
pub use ripple::{RippleState, TriggerSource};
pub use shockwave::ShockwaveController;
pub use tilt::{AccelSample, AccelerometerSource, TiltVector};
