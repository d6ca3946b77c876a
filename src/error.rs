//! Error taxonomy for structural misuse
//!
//! Geometry and numeric edge cases (degenerate triangles, zero-length
//! normalize, behind-camera projection) are recovered locally and never show
//! up here. These variants cover the fail-fast cases: bad construction
//! arguments and capability-free registration.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    /// A point mass was constructed with a non-positive mass.
    #[error("mass must be > 0, got {0}")]
    NonPositiveMass(f32),

    /// A camera was constructed with a non-positive zoom factor.
    #[error("zoom must be > 0, got {0}")]
    NonPositiveZoom(f32),

    /// A camera was constructed with a non-positive focal length.
    #[error("focal length must be > 0, got {0}")]
    NonPositiveFocalLength(f32),

    /// A raster buffer was requested with a zero dimension.
    #[error("raster size must be non-zero, got {width}x{height}")]
    EmptyRaster { width: u32, height: u32 },

    /// An object was registered that implements none of the entity
    /// capabilities (Tickable, Renderable, Movable, Collidable).
    #[error("registered object implements no entity capability")]
    NoCapabilities,

    /// A configuration field was outside its permitted range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
