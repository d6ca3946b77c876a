//! Sphere-sphere collision detection and response
//!
//! Pairwise narrow phase over everything the world registered as collidable.
//! Velocities exchange along the contact normal with a configurable
//! restitution; tangential components pass through untouched. Overlap is
//! resolved by pushing the bodies apart in inverse proportion to their mass.

use std::sync::Mutex;

use glam::Vec3;

use crate::entity::{Collidable, EntityHandle, Status};

/// Resolves the velocities of two touching bodies along their contact normal
/// with restitution `k` and returns the kinetic energy dissipated.
///
/// An immovable body acts as the infinite-mass limit: it keeps its velocity
/// and the movable partner's normal component bounces off it. Two immovable
/// bodies exchange nothing. Coincident centers have no defined normal and
/// are skipped.
pub fn collide(a: &mut dyn Collidable, b: &mut dyn Collidable, k: f32) -> f32 {
    let dir = (b.position() - a.position()).normalize_or_zero();
    if dir == Vec3::ZERO {
        return 0.0;
    }

    let v1n = a.velocity().dot(dir);
    let v2n = b.velocity().dot(dir);
    let v1t = a.velocity() - dir * v1n;
    let v2t = b.velocity() - dir * v2n;
    let (m1, m2) = (a.mass(), b.mass());

    let (new_v1n, new_v2n) = match (a.status(), b.status()) {
        (Status::Immovable, Status::Immovable) => return 0.0,
        (Status::Movable, Status::Movable) => {
            let total = m1 * v1n + m2 * v2n;
            (
                (total - (v1n - v2n) * m2 * k) / (m1 + m2),
                (total + (v1n - v2n) * m1 * k) / (m1 + m2),
            )
        }
        // Infinite-mass limits of the formula above.
        (Status::Immovable, Status::Movable) => (v1n, v1n * (1.0 + k) - k * v2n),
        (Status::Movable, Status::Immovable) => (v2n * (1.0 + k) - k * v1n, v2n),
    };

    let before = 0.5 * m1 * v1n * v1n + 0.5 * m2 * v2n * v2n;
    let after = 0.5 * m1 * new_v1n * new_v1n + 0.5 * m2 * new_v2n * new_v2n;

    if a.status() == Status::Movable {
        a.set_velocity(v1t + dir * new_v1n);
    }
    if b.status() == Status::Movable {
        b.set_velocity(v2t + dir * new_v2n);
    }
    (before - after).max(0.0)
}

/// Registry of collidable entities with a shared restitution coefficient.
pub struct CollisionManager {
    collidables: Mutex<Vec<EntityHandle>>,
    restitution: f32,
}

impl CollisionManager {
    pub fn new(restitution: f32) -> Self {
        Self {
            collidables: Mutex::new(Vec::new()),
            restitution,
        }
    }

    pub fn register(&self, handle: EntityHandle) {
        self.collidables.lock().unwrap().push(handle);
    }

    pub fn unregister(&self, handle: &EntityHandle) {
        self.collidables
            .lock()
            .unwrap()
            .retain(|h| !std::sync::Arc::ptr_eq(h, handle));
    }

    pub fn reset(&self) {
        self.collidables.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.collidables.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.collidables.lock().unwrap().is_empty()
    }

    /// One narrow-phase pass: every unordered pair is tested and resolved at
    /// most once. Entities are locked in registration order, lower index
    /// first, so concurrent passes cannot deadlock.
    pub fn calculate_collisions(&self) {
        let handles = self.collidables.lock().unwrap();
        for i in 0..handles.len() {
            for j in (i + 1)..handles.len() {
                if std::sync::Arc::ptr_eq(&handles[i], &handles[j]) {
                    // A doubly-registered body must not deadlock on itself.
                    continue;
                }
                let mut first = handles[i].lock().unwrap();
                let mut second = handles[j].lock().unwrap();
                let (Some(a), Some(b)) = (first.as_collidable(), second.as_collidable()) else {
                    continue;
                };
                let (Some(r1), Some(r2)) = (a.bounding_radius(), b.bounding_radius()) else {
                    // Non-sphere shapes would go through GJK here.
                    continue;
                };
                let delta = b.position() - a.position();
                let dist = delta.length();
                if dist > r1 + r2 {
                    continue;
                }
                collide(a, b, self.restitution);

                let dir = delta.normalize_or_zero();
                if dir == Vec3::ZERO {
                    continue;
                }
                let overlap = r1 + r2 - dist;
                match (a.status(), b.status()) {
                    (Status::Movable, Status::Movable) => {
                        // Heavier body yields less ground.
                        let (ma, mb) = (a.mass(), b.mass());
                        a.set_position(a.position() - dir * (overlap * mb / (ma + mb)));
                        b.set_position(b.position() + dir * (overlap * ma / (ma + mb)));
                    }
                    (Status::Movable, Status::Immovable) => {
                        a.set_position(a.position() - dir * overlap);
                    }
                    (Status::Immovable, Status::Movable) => {
                        b.set_position(b.position() + dir * overlap);
                    }
                    (Status::Immovable, Status::Immovable) => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::mass::PointMass;
    use std::sync::{Arc, Mutex};

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_equal_masses_swap_normal_velocities_elastically() {
        let mut a = PointMass::new(1.0, Vec3::new(-1.0, 0.0, 0.0), 1.0).unwrap();
        let mut b = PointMass::new(1.0, Vec3::new(1.0, 0.0, 0.0), 1.0).unwrap();
        a.velocity = Vec3::new(2.0, 0.0, 0.0);
        b.velocity = Vec3::new(-1.0, 0.0, 0.0);
        let dissipated = collide(&mut a, &mut b, 1.0);
        assert!(approx(a.velocity, Vec3::new(-1.0, 0.0, 0.0)));
        assert!(approx(b.velocity, Vec3::new(2.0, 0.0, 0.0)));
        assert!(dissipated.abs() < 1e-5);
    }

    #[test]
    fn test_momentum_conserved_for_unequal_masses() {
        let mut a = PointMass::new(3.0, Vec3::new(-1.0, 0.0, 0.0), 1.0).unwrap();
        let mut b = PointMass::new(1.0, Vec3::new(1.0, 0.0, 0.0), 1.0).unwrap();
        a.velocity = Vec3::new(1.0, 0.5, 0.0);
        b.velocity = Vec3::new(-2.0, -0.5, 0.0);
        let before = a.impulse() + b.impulse();
        collide(&mut a, &mut b, 0.7);
        let after = a.impulse() + b.impulse();
        assert!(approx(before, after));
    }

    #[test]
    fn test_tangential_velocity_untouched() {
        let mut a = PointMass::new(1.0, Vec3::new(-1.0, 0.0, 0.0), 1.0).unwrap();
        let mut b = PointMass::new(1.0, Vec3::new(1.0, 0.0, 0.0), 1.0).unwrap();
        a.velocity = Vec3::new(1.0, 3.0, -2.0);
        collide(&mut a, &mut b, 1.0);
        assert!((a.velocity.y - 3.0).abs() < 1e-5);
        assert!((a.velocity.z + 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_immovable_reverses_and_scales_normal_component() {
        let mut wall = PointMass::new(100.0, Vec3::new(1.0, 0.0, 0.0), 1.0)
            .unwrap()
            .immovable();
        let mut ball = PointMass::new(1.0, Vec3::new(-1.0, 0.0, 0.0), 1.0).unwrap();
        ball.velocity = Vec3::new(4.0, 0.0, 0.0);
        let k = 0.5;
        collide(&mut ball, &mut wall, k);
        assert!(approx(ball.velocity, Vec3::new(-2.0, 0.0, 0.0)));
        assert_eq!(wall.velocity, Vec3::ZERO);
    }

    #[test]
    fn test_inelastic_collision_dissipates_energy() {
        let mut a = PointMass::new(1.0, Vec3::new(-1.0, 0.0, 0.0), 1.0).unwrap();
        let mut b = PointMass::new(1.0, Vec3::new(1.0, 0.0, 0.0), 1.0).unwrap();
        a.velocity = Vec3::new(2.0, 0.0, 0.0);
        let dissipated = collide(&mut a, &mut b, 0.0);
        assert!(dissipated > 0.0);
        // Fully inelastic: both move together afterwards.
        assert!(approx(a.velocity, b.velocity));
    }

    #[test]
    fn test_coincident_centers_are_skipped() {
        let mut a = PointMass::new(1.0, Vec3::ZERO, 1.0).unwrap();
        let mut b = PointMass::new(1.0, Vec3::ZERO, 1.0).unwrap();
        a.velocity = Vec3::new(1.0, 0.0, 0.0);
        assert_eq!(collide(&mut a, &mut b, 1.0), 0.0);
        assert_eq!(a.velocity, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_manager_separates_overlapping_pair() {
        let manager = CollisionManager::new(1.0);
        let a = Arc::new(Mutex::new(
            PointMass::new(1.0, Vec3::new(-0.5, 0.0, 0.0), 1.0).unwrap(),
        ));
        let b = Arc::new(Mutex::new(
            PointMass::new(1.0, Vec3::new(0.5, 0.0, 0.0), 1.0).unwrap(),
        ));
        manager.register(a.clone() as EntityHandle);
        manager.register(b.clone() as EntityHandle);
        manager.calculate_collisions();
        let dist = {
            let (ga, gb) = (a.lock().unwrap(), b.lock().unwrap());
            (gb.position - ga.position).length()
        };
        assert!((dist - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_manager_full_overlap_push_on_single_movable() {
        let manager = CollisionManager::new(1.0);
        let wall = Arc::new(Mutex::new(
            PointMass::new(1.0, Vec3::ZERO, 1.0).unwrap().immovable(),
        ));
        let ball = Arc::new(Mutex::new(
            PointMass::new(1.0, Vec3::new(1.0, 0.0, 0.0), 1.0).unwrap(),
        ));
        manager.register(wall.clone() as EntityHandle);
        manager.register(ball.clone() as EntityHandle);
        manager.calculate_collisions();
        assert_eq!(wall.lock().unwrap().position, Vec3::ZERO);
        let dist = (ball.lock().unwrap().position - Vec3::ZERO).length();
        assert!((dist - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_doubly_registered_body_does_not_collide_with_itself() {
        let manager = CollisionManager::new(1.0);
        let ball = Arc::new(Mutex::new(
            PointMass::new(1.0, Vec3::ZERO, 1.0).unwrap(),
        ));
        ball.lock().unwrap().velocity = Vec3::new(1.0, 0.0, 0.0);
        manager.register(ball.clone() as EntityHandle);
        manager.register(ball.clone() as EntityHandle);
        manager.calculate_collisions();
        assert_eq!(ball.lock().unwrap().velocity, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(ball.lock().unwrap().position, Vec3::ZERO);
    }

    #[test]
    fn test_unregister_removes_only_that_handle() {
        let manager = CollisionManager::new(1.0);
        let a: EntityHandle = Arc::new(Mutex::new(PointMass::new(1.0, Vec3::ZERO, 1.0).unwrap()));
        let b: EntityHandle = Arc::new(Mutex::new(PointMass::new(1.0, Vec3::ONE, 1.0).unwrap()));
        manager.register(a.clone());
        manager.register(b.clone());
        manager.unregister(&a);
        assert_eq!(manager.len(), 1);
    }
}
