//! spacesim - software-rasterized 3D point-mass simulation toolkit
//!
//! Core modules:
//! - `render`: pinhole camera + depth-buffered CPU rasterizer
//! - `sim`: point masses, connections, collision detection/response
//! - `world`: capability registries and per-tick orchestration
//! - `runner`: dedicated loop thread with accumulator frame pacing
//! - `input`: key/pointer state, camera control, entity picking
//!
//! Hosts own the window surface and input plumbing; this crate only fills a
//! pixel buffer and consumes already-decoded input state.

pub mod config;
pub mod entity;
pub mod error;
pub mod input;
pub mod render;
pub mod runner;
pub mod sim;
pub mod world;

pub use config::ScenarioConfig;
pub use entity::{Entity, EntityHandle, EntityId, Status};
pub use error::SimError;
pub use render::{Camera, Rasterizer, Vertex};
pub use sim::{CollisionManager, ImpulseConnection, PointMass, SpringConnection};
pub use world::World;

/// Simulation defaults
pub mod consts {
    use glam::Vec3;

    /// Default gravitational acceleration, world units per second squared.
    pub const GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);
    /// Default fraction of velocity lost per second to friction.
    pub const FRICTION_PER_SECOND: f32 = 0.05;
    /// Default restitution for the collision manager (elastic).
    pub const RESTITUTION: f32 = 1.0;
    /// Default render frequency of the loop thread, frames per second.
    pub const RENDER_FPS: f32 = 25.0;
    /// Camera translation speed for key input, world units per second.
    pub const CAMERA_SPEED: f32 = 10.0;
    /// Restitution used for rope impulse exchanges.
    pub const ROPE_RESTITUTION: f32 = 0.95;
}
