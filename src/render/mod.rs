//! Camera projection and CPU rasterization
//!
//! World-space primitives go in, depth-correct pixels come out. The host is
//! responsible for blitting the color buffer to an actual surface.

pub mod camera;
pub mod primitive;
pub mod raster;

pub use camera::Camera;
pub use primitive::{BoundingBox, Triangle, Vertex, barycentric, pack_color};
pub use raster::Rasterizer;
