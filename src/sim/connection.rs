//! Connections between point masses
//!
//! An [`ImpulseConnection`] behaves like a rope: slack below its maximum
//! length, and past it the endpoints exchange an impulse, feel a cubic
//! restoring force and get pinned back to the maximum length. A
//! [`SpringConnection`] is a plain Hookean spring around a rest length.
//! Both break for good once a single tick carries more energy than the
//! connection can take.

use glam::Vec3;

use crate::consts::ROPE_RESTITUTION;
use crate::entity::{Entity, EntityId, Renderable, Status, Tickable};
use crate::render::{Camera, Rasterizer, Vertex};
use crate::sim::collision::collide;
use crate::sim::mass::MassHandle;

const DEFAULT_SPRING_CONSTANT: f32 = 300.0;

pub struct ImpulseConnection {
    a: MassHandle,
    b: MassHandle,
    max_distance: f32,
    max_energy: f32,
    spring_constant: f32,
    broken: bool,
    pub color: Vec3,
}

impl ImpulseConnection {
    pub fn new(a: MassHandle, b: MassHandle, max_distance: f32, max_energy: f32) -> Self {
        Self {
            a,
            b,
            max_distance,
            max_energy,
            spring_constant: DEFAULT_SPRING_CONSTANT,
            broken: false,
            color: Vec3::new(255.0, 255.0, 255.0),
        }
    }

    pub fn with_spring_constant(mut self, spring_constant: f32) -> Self {
        self.spring_constant = spring_constant;
        self
    }

    pub fn is_broken(&self) -> bool {
        self.broken
    }
}

impl Tickable for ImpulseConnection {
    fn tick(&mut self, _dt: f32) {
        if self.broken || std::sync::Arc::ptr_eq(&self.a, &self.b) {
            return;
        }
        let mut a = self.a.lock().unwrap();
        let mut b = self.b.lock().unwrap();

        let dist = a.distance_to(&b);
        if dist < self.max_distance {
            return;
        }
        let dir = a.direction_to(&b);
        if dir == Vec3::ZERO {
            return;
        }
        let excess = dist - self.max_distance;
        let mut energy = 0.0;

        // Only exchange an impulse while the endpoints are still separating,
        // otherwise a taut rope would keep re-colliding every tick.
        if (b.velocity - a.velocity).dot(dir) >= 0.0 {
            energy += collide(&mut *a, &mut *b, ROPE_RESTITUTION);
        }

        // Cubic restoring force; its potential is the quartic below.
        let force = dir * (excess * excess * excess * self.spring_constant / 3.0);
        energy += self.spring_constant * excess.powi(4) / 4.0;

        if energy > self.max_energy {
            self.broken = true;
            return;
        }

        if a.status == Status::Movable {
            a.apply_force(force);
        }
        if b.status == Status::Movable {
            b.apply_force(-force);
        }

        // Pin the pair back to exactly the maximum length.
        match (a.status, b.status) {
            (Status::Movable, Status::Movable) => {
                a.position += dir * (excess / 2.0);
                b.position -= dir * (excess / 2.0);
            }
            (Status::Movable, Status::Immovable) => {
                a.position = b.position - dir * self.max_distance;
            }
            (Status::Immovable, Status::Movable) => {
                b.position = a.position + dir * self.max_distance;
            }
            (Status::Immovable, Status::Immovable) => {}
        }
    }
}

impl Renderable for ImpulseConnection {
    fn render(&self, _id: EntityId, camera: &Camera, raster: &mut Rasterizer) {
        if self.broken {
            return;
        }
        let from = Vertex::flat(self.a.lock().unwrap().position, self.color);
        let to = Vertex::flat(self.b.lock().unwrap().position, self.color);
        raster.draw_line(camera, &from, &to, None);
    }
}

impl Entity for ImpulseConnection {
    fn as_tickable(&mut self) -> Option<&mut dyn Tickable> {
        Some(self)
    }

    fn as_renderable(&self) -> Option<&dyn Renderable> {
        Some(self)
    }
}

/// Hookean spring pulling its endpoints toward a rest length.
pub struct SpringConnection {
    a: MassHandle,
    b: MassHandle,
    rest_length: f32,
    spring_constant: f32,
    max_energy: f32,
    broken: bool,
    pub color: Vec3,
}

impl SpringConnection {
    pub fn new(
        a: MassHandle,
        b: MassHandle,
        rest_length: f32,
        spring_constant: f32,
        max_energy: f32,
    ) -> Self {
        Self {
            a,
            b,
            rest_length,
            spring_constant,
            max_energy,
            broken: false,
            color: Vec3::new(255.0, 255.0, 255.0),
        }
    }

    pub fn is_broken(&self) -> bool {
        self.broken
    }
}

impl Tickable for SpringConnection {
    fn tick(&mut self, _dt: f32) {
        if self.broken || std::sync::Arc::ptr_eq(&self.a, &self.b) {
            return;
        }
        let mut a = self.a.lock().unwrap();
        let mut b = self.b.lock().unwrap();

        let dir = a.direction_to(&b);
        if dir == Vec3::ZERO {
            return;
        }
        let displacement = a.distance_to(&b) - self.rest_length;

        if 0.5 * self.spring_constant * displacement * displacement > self.max_energy {
            self.broken = true;
            return;
        }

        // Positive displacement pulls inward, negative pushes apart.
        let force = dir * (displacement * self.spring_constant);
        if a.status == Status::Movable {
            a.apply_force(force);
        }
        if b.status == Status::Movable {
            b.apply_force(-force);
        }
    }
}

impl Renderable for SpringConnection {
    fn render(&self, _id: EntityId, camera: &Camera, raster: &mut Rasterizer) {
        if self.broken {
            return;
        }
        let from = Vertex::flat(self.a.lock().unwrap().position, self.color);
        let to = Vertex::flat(self.b.lock().unwrap().position, self.color);
        raster.draw_line(camera, &from, &to, None);
    }
}

impl Entity for SpringConnection {
    fn as_tickable(&mut self) -> Option<&mut dyn Tickable> {
        Some(self)
    }

    fn as_renderable(&self) -> Option<&dyn Renderable> {
        Some(self)
    }
}
