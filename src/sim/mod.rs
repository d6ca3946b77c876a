//! Physics: point masses, connections, collisions
//!
//! All state changes happen inside tick; nothing here touches the render
//! buffers except through the Renderable impls.

pub mod collision;
pub mod connection;
pub mod gjk;
pub mod mass;

pub use collision::{CollisionManager, collide};
pub use connection::{ImpulseConnection, SpringConnection};
pub use gjk::{Support, gjk};
pub use mass::{MassHandle, PointMass, integrate};
