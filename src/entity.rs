//! Entity capability model
//!
//! An object may be any combination of Tickable, Renderable, Movable and
//! Collidable. Instead of an inheritance tree, registration probes which
//! capabilities a handle implements and files it into the matching registry
//! lists. The probes default to `None`; implementors override the ones they
//! support.

use std::sync::{Arc, Mutex};

use glam::Vec3;

use crate::render::{Camera, Rasterizer};
use crate::sim::gjk::Support;

/// Identifies a registered entity; written into the rasterizer's tag buffer
/// so that pointer picking can map pixels back to entities.
pub type EntityId = u32;

/// Shared, lockable handle to a registered object.
pub type EntityHandle = Arc<Mutex<dyn Entity>>;

/// Whether a body participates in integration and absorbs impulses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Movable,
    Immovable,
}

/// Advanced once per simulation tick.
pub trait Tickable: Send {
    fn tick(&mut self, dt: f32);
}

/// Draws itself into the current frame, tagging pixels with `id`.
pub trait Renderable: Send {
    fn render(&self, id: EntityId, camera: &Camera, raster: &mut Rasterizer);
}

/// Kinematic state accessors used by the integrator.
pub trait Movable: Send {
    fn status(&self) -> Status;
    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);
    fn velocity(&self) -> Vec3;
    fn set_velocity(&mut self, velocity: Vec3);
    fn acceleration(&self) -> Vec3;
    fn set_acceleration(&mut self, acceleration: Vec3);
}

/// A body the collision manager can test and resolve.
///
/// `bounding_radius` returning `Some` marks a sphere and enables the
/// closed-form intersection fast path; general convex bodies return `None`
/// and are only reachable through the GJK extension.
pub trait Collidable: Movable + Support {
    fn mass(&self) -> f32;
    fn bounding_radius(&self) -> Option<f32>;
}

/// Umbrella trait probed at registration time.
pub trait Entity: Send {
    fn as_tickable(&mut self) -> Option<&mut dyn Tickable> {
        None
    }
    fn as_renderable(&self) -> Option<&dyn Renderable> {
        None
    }
    fn as_movable(&mut self) -> Option<&mut dyn Movable> {
        None
    }
    fn as_collidable(&mut self) -> Option<&mut dyn Collidable> {
        None
    }
}
