//! Entity registries and the per-tick pipeline
//!
//! A tick runs in three phases: tickables advance, collisions resolve, then
//! every movable integrates one step. Integration order is reshuffled every
//! tick from a seeded generator so that order-dependent artifacts average
//! out instead of piling onto the same entity, while runs with the same seed
//! stay reproducible.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use glam::Vec3;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;

use crate::entity::{EntityHandle, EntityId};
use crate::error::SimError;
use crate::render::{Camera, Rasterizer};
use crate::sim::collision::CollisionManager;
use crate::sim::mass::integrate;

pub struct World {
    tickables: Mutex<Vec<(EntityId, EntityHandle)>>,
    renderables: Mutex<Vec<(EntityId, EntityHandle)>>,
    movables: Mutex<Vec<(EntityId, EntityHandle)>>,
    collisions: CollisionManager,
    gravity: Vec3,
    friction_per_second: f32,
    next_id: AtomicU32,
    rng: Mutex<Pcg32>,
}

impl World {
    pub fn new(gravity: Vec3, friction_per_second: f32, restitution: f32, seed: u64) -> Self {
        Self {
            tickables: Mutex::new(Vec::new()),
            renderables: Mutex::new(Vec::new()),
            movables: Mutex::new(Vec::new()),
            collisions: CollisionManager::new(restitution),
            gravity,
            friction_per_second,
            next_id: AtomicU32::new(0),
            rng: Mutex::new(Pcg32::seed_from_u64(seed)),
        }
    }

    pub fn from_config(config: &crate::config::ScenarioConfig) -> Self {
        Self::new(
            config.gravity,
            config.friction_per_second,
            config.restitution,
            config.seed,
        )
    }

    /// Probes the handle's capabilities and files it into each matching
    /// registry. A handle with no capability at all is a bug at the call
    /// site and is rejected.
    pub fn register(&self, handle: EntityHandle) -> Result<EntityId, SimError> {
        let (tickable, renderable, movable, collidable) = {
            let mut guard = handle.lock().unwrap();
            (
                guard.as_tickable().is_some(),
                guard.as_renderable().is_some(),
                guard.as_movable().is_some(),
                guard.as_collidable().is_some(),
            )
        };
        if !(tickable || renderable || movable || collidable) {
            return Err(SimError::NoCapabilities);
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if tickable {
            self.tickables.lock().unwrap().push((id, handle.clone()));
        }
        if renderable {
            self.renderables.lock().unwrap().push((id, handle.clone()));
        }
        if movable {
            self.movables.lock().unwrap().push((id, handle.clone()));
        }
        if collidable {
            self.collisions.register(handle);
        }
        log::debug!(
            "registered entity {id} (tickable={tickable} renderable={renderable} movable={movable} collidable={collidable})"
        );
        Ok(id)
    }

    /// Removes the handle from every registry it appears in.
    pub fn unregister(&self, handle: &EntityHandle) {
        for list in [&self.tickables, &self.renderables, &self.movables] {
            list.lock()
                .unwrap()
                .retain(|(_, h)| !std::sync::Arc::ptr_eq(h, handle));
        }
        self.collisions.unregister(handle);
    }

    pub fn reset(&self) {
        for list in [&self.tickables, &self.renderables, &self.movables] {
            list.lock().unwrap().clear();
        }
        self.collisions.reset();
    }

    pub fn tickable_count(&self) -> usize {
        self.tickables.lock().unwrap().len()
    }

    pub fn renderable_count(&self) -> usize {
        self.renderables.lock().unwrap().len()
    }

    pub fn movable_count(&self) -> usize {
        self.movables.lock().unwrap().len()
    }

    pub fn collidable_count(&self) -> usize {
        self.collisions.len()
    }

    /// Advances the whole simulation by `dt` seconds.
    pub fn tick(&self, dt: f32) {
        {
            let tickables = self.tickables.lock().unwrap();
            for (_, handle) in tickables.iter() {
                if let Some(t) = handle.lock().unwrap().as_tickable() {
                    t.tick(dt);
                }
            }
        }

        self.collisions.calculate_collisions();

        let movables = self.movables.lock().unwrap();
        let mut order: Vec<usize> = (0..movables.len()).collect();
        order.shuffle(&mut *self.rng.lock().unwrap());
        for idx in order {
            if let Some(body) = movables[idx].1.lock().unwrap().as_movable() {
                integrate(body, self.gravity, self.friction_per_second, dt);
            }
        }
    }

    /// Clears the frame and draws every renderable, tagging pixels with the
    /// owning entity's id.
    pub fn render(&self, camera: &Camera, raster: &mut Rasterizer) {
        raster.clear();
        let renderables = self.renderables.lock().unwrap();
        for (id, handle) in renderables.iter() {
            if let Some(r) = handle.lock().unwrap().as_renderable() {
                r.render(*id, camera, raster);
            }
        }
    }
}
