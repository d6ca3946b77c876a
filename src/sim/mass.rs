//! Point masses and semi-implicit Euler integration

use std::sync::{Arc, Mutex};

use glam::Vec3;

use crate::entity::{Collidable, Entity, EntityId, Movable, Renderable, Status};
use crate::error::SimError;
use crate::render::{Camera, Rasterizer, Vertex};
use crate::sim::gjk::Support;

/// Shared handle to a mass, usable both as a registered entity and as a
/// connection endpoint.
pub type MassHandle = Arc<Mutex<PointMass>>;

/// A spherical body with position, velocity and accumulated acceleration.
/// Forces are re-applied fresh each tick; the accumulator is zeroed after
/// integration.
#[derive(Debug, Clone, PartialEq)]
pub struct PointMass {
    mass: f32,
    pub position: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    pub status: Status,
    pub radius: f32,
    /// Display color, 0-255 per channel.
    pub color: Vec3,
}

impl PointMass {
    pub fn new(mass: f32, position: Vec3, radius: f32) -> Result<Self, SimError> {
        if !(mass > 0.0) {
            return Err(SimError::NonPositiveMass(mass));
        }
        Ok(Self {
            mass,
            position,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            status: Status::Movable,
            radius,
            color: Vec3::new(255.0, 255.0, 255.0),
        })
    }

    /// Convenience constructor returning a registered-ready shared handle.
    pub fn shared(mass: f32, position: Vec3, radius: f32) -> Result<MassHandle, SimError> {
        Ok(Arc::new(Mutex::new(Self::new(mass, position, radius)?)))
    }

    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = color;
        self
    }

    pub fn immovable(mut self) -> Self {
        self.status = Status::Immovable;
        self
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Momentum `m * v`.
    pub fn impulse(&self) -> Vec3 {
        self.velocity * self.mass
    }

    /// Accumulates `f / m` into the acceleration for this tick.
    pub fn apply_force(&mut self, force: Vec3) {
        self.acceleration += force / self.mass;
    }

    /// Accumulates a raw acceleration for this tick.
    pub fn accelerate(&mut self, acceleration: Vec3) {
        self.acceleration += acceleration;
    }

    pub fn distance_to(&self, other: &PointMass) -> f32 {
        (other.position - self.position).length()
    }

    /// Unit direction toward `other`; zero when coincident.
    pub fn direction_to(&self, other: &PointMass) -> Vec3 {
        (other.position - self.position).normalize_or_zero()
    }
}

/// One semi-implicit Euler step: gravity, friction decay, velocity, position,
/// then the force accumulator resets. Immovable bodies never move.
pub fn integrate(body: &mut dyn Movable, gravity: Vec3, friction_per_second: f32, dt: f32) {
    if body.status() == Status::Immovable {
        return;
    }
    let acc = body.acceleration() + gravity;
    let decay = (1.0 - friction_per_second * dt).clamp(0.0, 1.0);
    let vel = body.velocity() * decay + acc * dt;
    body.set_velocity(vel);
    body.set_position(body.position() + vel * dt);
    body.set_acceleration(Vec3::ZERO);
}

impl Movable for PointMass {
    fn status(&self) -> Status {
        self.status
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn acceleration(&self) -> Vec3 {
        self.acceleration
    }

    fn set_acceleration(&mut self, acceleration: Vec3) {
        self.acceleration = acceleration;
    }
}

impl Support for PointMass {
    fn support(&self, direction: Vec3) -> Vec3 {
        let dir = direction.try_normalize().unwrap_or(Vec3::X);
        self.position + dir * self.radius
    }
}

impl Collidable for PointMass {
    fn mass(&self) -> f32 {
        self.mass
    }

    fn bounding_radius(&self) -> Option<f32> {
        Some(self.radius)
    }
}

impl Renderable for PointMass {
    fn render(&self, id: EntityId, camera: &Camera, raster: &mut Rasterizer) {
        let center = Vertex::flat(self.position, self.color);
        raster.draw_sphere(camera, &center, self.radius, Some(id));
    }
}

impl Entity for PointMass {
    fn as_renderable(&self) -> Option<&dyn Renderable> {
        Some(self)
    }

    fn as_movable(&mut self) -> Option<&mut dyn Movable> {
        Some(self)
    }

    fn as_collidable(&mut self) -> Option<&mut dyn Collidable> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_or_negative_mass_rejected() {
        assert_eq!(
            PointMass::new(0.0, Vec3::ZERO, 1.0),
            Err(SimError::NonPositiveMass(0.0))
        );
        assert!(PointMass::new(-2.0, Vec3::ZERO, 1.0).is_err());
        assert!(PointMass::new(f32::NAN, Vec3::ZERO, 1.0).is_err());
    }

    #[test]
    fn test_rest_is_a_fixed_point() {
        let mut m = PointMass::new(1.0, Vec3::new(1.0, 2.0, 3.0), 1.0).unwrap();
        for _ in 0..1000 {
            integrate(&mut m, Vec3::ZERO, 0.05, 1.0 / 60.0);
        }
        assert_eq!(m.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(m.velocity, Vec3::ZERO);
    }

    #[test]
    fn test_gravity_accelerates_downward() {
        let mut m = PointMass::new(1.0, Vec3::ZERO, 1.0).unwrap();
        let g = Vec3::new(0.0, -10.0, 0.0);
        integrate(&mut m, g, 0.0, 0.1);
        assert!((m.velocity.y + 1.0).abs() < 1e-5);
        // Semi-implicit: position moves by the updated velocity.
        assert!((m.position.y + 0.1).abs() < 1e-5);
        // Accumulator resets after the step.
        assert_eq!(m.acceleration, Vec3::ZERO);
    }

    #[test]
    fn test_immovable_never_integrates() {
        let mut m = PointMass::new(1.0, Vec3::ZERO, 1.0).unwrap().immovable();
        m.velocity = Vec3::new(5.0, 0.0, 0.0);
        integrate(&mut m, Vec3::new(0.0, -9.81, 0.0), 0.0, 1.0);
        assert_eq!(m.position, Vec3::ZERO);
        assert_eq!(m.velocity, Vec3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn test_friction_decays_velocity() {
        let mut m = PointMass::new(1.0, Vec3::ZERO, 1.0).unwrap();
        m.velocity = Vec3::new(10.0, 0.0, 0.0);
        integrate(&mut m, Vec3::ZERO, 0.5, 0.1);
        assert!((m.velocity.x - 9.5).abs() < 1e-4);
        // A huge friction coefficient clamps at full stop, never negative.
        m.velocity = Vec3::new(10.0, 0.0, 0.0);
        integrate(&mut m, Vec3::ZERO, 100.0, 1.0);
        assert_eq!(m.velocity, Vec3::ZERO);
    }

    #[test]
    fn test_apply_force_scales_by_mass() {
        let mut m = PointMass::new(4.0, Vec3::ZERO, 1.0).unwrap();
        m.apply_force(Vec3::new(8.0, 0.0, 0.0));
        assert_eq!(m.acceleration, Vec3::new(2.0, 0.0, 0.0));
    }
}
