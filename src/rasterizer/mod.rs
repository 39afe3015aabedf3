//! Basic software rasterizer
//!
//! Features:
//! - Model / view / projection transforms (perspective -> orthographic -> NDC)
//! - Viewport mapping without perspective-correct interpolation
//! - Barycentric triangle fill, winding-agnostic
//! - Z-buffer (smaller depth is closer)
//! - Optional n x n MSAA

mod buffer;
mod math;
mod params;
mod render;
mod transform;
mod types;

pub use buffer::*;
pub use math::*;
pub use params::*;
pub use render::*;
pub use transform::*;
pub use types::*;
