//! Input state, camera control and pointer picking
//!
//! The host window decodes raw events into [`InputState`]; this module turns
//! that state into camera motion, maps pointer positions back to entities
//! through the rasterizer's tag buffer, and converts pointer drags into
//! world-space forces.

use glam::Vec3;

use crate::consts::CAMERA_SPEED;
use crate::entity::EntityId;
use crate::render::{Camera, Rasterizer};

/// Which camera-control keys are currently held.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    pub turn_up: bool,
    pub turn_down: bool,
    pub zoom_in: bool,
    pub zoom_out: bool,
    /// Snaps the view orientation back to straight-ahead.
    pub reset: bool,
}

/// Pointer position in pixels plus the delta since the previous frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub pressed: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InputState {
    pub keys: KeyState,
    pub pointer: PointerState,
}

/// Applies one frame of held-key camera motion. Translation moves at
/// [`CAMERA_SPEED`] world units per second along the camera basis; turning
/// advances one radian per second and zoom scales by `1 +- dt`.
pub fn apply_camera_input(camera: &mut Camera, keys: &KeyState, dt: f32) {
    let step = CAMERA_SPEED * dt;
    if keys.forward {
        camera.move_forward(step);
    }
    if keys.backward {
        camera.move_forward(-step);
    }
    if keys.left {
        camera.move_left(step);
    }
    if keys.right {
        camera.move_left(-step);
    }
    if keys.up {
        camera.move_up(step);
    }
    if keys.down {
        camera.move_up(-step);
    }
    if keys.turn_left {
        camera.turn(-dt, 0.0);
    }
    if keys.turn_right {
        camera.turn(dt, 0.0);
    }
    if keys.turn_up {
        camera.turn(0.0, dt);
    }
    if keys.turn_down {
        camera.turn(0.0, -dt);
    }
    if keys.zoom_in {
        camera.scale_zoom(1.0 + dt);
    }
    if keys.zoom_out {
        camera.scale_zoom(1.0 - dt);
    }
    if keys.reset {
        camera.set_phi(0.0);
        camera.set_theta(0.0);
    }
}

/// Finds the entity nearest to `(x, y)` within a square search window of the
/// given pixel radius, by reading the tag buffer of the last rendered frame.
pub fn pick(raster: &Rasterizer, x: u32, y: u32, radius: u32) -> Option<EntityId> {
    let (cx, cy, r) = (x as i64, y as i64, radius as i64);
    let mut best: Option<(i64, EntityId)> = None;
    for py in (cy - r).max(0)..=(cy + r).min(raster.height() as i64 - 1) {
        for px in (cx - r).max(0)..=(cx + r).min(raster.width() as i64 - 1) {
            let Some(id) = raster.entity_at(px as u32, py as u32) else {
                continue;
            };
            let dist_sq = (px - cx).pow(2) + (py - cy).pow(2);
            if best.is_none_or(|(d, _)| dist_sq < d) {
                best = Some((dist_sq, id));
            }
        }
    }
    best.map(|(_, id)| id)
}

/// World-space force for a pointer drag of `(dx, dy)` pixels. Dragging right
/// pushes along the camera's right, dragging up pushes along its up, so the
/// entity follows the pointer on screen.
pub fn drag_force(camera: &Camera, dx: f32, dy: f32, strength: f32) -> Vec3 {
    (camera.left() * -dx + camera.up() * -dy) * strength
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Vertex;

    fn camera() -> Camera {
        Camera::new(Vec3::ZERO, 100.0, 1.0, 100, 100).unwrap()
    }

    #[test]
    fn test_forward_key_moves_along_view_direction() {
        let mut cam = camera();
        let keys = KeyState {
            forward: true,
            ..Default::default()
        };
        apply_camera_input(&mut cam, &keys, 0.5);
        assert!((cam.position - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-5);
    }

    #[test]
    fn test_opposing_keys_cancel() {
        let mut cam = camera();
        let keys = KeyState {
            left: true,
            right: true,
            ..Default::default()
        };
        apply_camera_input(&mut cam, &keys, 0.5);
        assert_eq!(cam.position, Vec3::ZERO);
    }

    #[test]
    fn test_turn_keys_change_angles() {
        let mut cam = camera();
        let keys = KeyState {
            turn_right: true,
            turn_up: true,
            ..Default::default()
        };
        apply_camera_input(&mut cam, &keys, 0.25);
        assert!((cam.phi() - 0.25).abs() < 1e-6);
        assert!((cam.theta() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_reset_key_levels_the_view() {
        let mut cam = camera();
        cam.set_phi(1.2);
        cam.set_theta(-0.8);
        let keys = KeyState {
            reset: true,
            ..Default::default()
        };
        apply_camera_input(&mut cam, &keys, 0.016);
        assert_eq!(cam.phi(), 0.0);
        assert_eq!(cam.theta(), 0.0);
    }

    #[test]
    fn test_zoom_keys_scale_zoom() {
        let mut cam = camera();
        let keys = KeyState {
            zoom_in: true,
            ..Default::default()
        };
        apply_camera_input(&mut cam, &keys, 0.5);
        assert!((cam.zoom() - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_pick_finds_tagged_sphere_near_pointer() {
        let cam = camera();
        let mut raster = Rasterizer::new(100, 100).unwrap();
        let center = Vertex::flat(Vec3::new(0.0, 0.0, 10.0), Vec3::new(255.0, 0.0, 0.0));
        raster.draw_sphere(&cam, &center, 1.0, Some(9));
        // Sphere spans ~10px around the buffer center; a pointer a bit off
        // still picks it up through the search window.
        assert_eq!(pick(&raster, 50, 50, 2), Some(9));
        assert_eq!(pick(&raster, 62, 50, 5), Some(9));
        assert_eq!(pick(&raster, 5, 5, 3), None);
    }

    #[test]
    fn test_pick_prefers_nearest_tag() {
        let cam = camera();
        let mut raster = Rasterizer::new(100, 100).unwrap();
        let left = Vertex::flat(Vec3::new(-2.0, 0.0, 10.0), Vec3::new(255.0, 0.0, 0.0));
        let right = Vertex::flat(Vec3::new(2.0, 0.0, 10.0), Vec3::new(0.0, 255.0, 0.0));
        raster.draw_sphere(&cam, &left, 0.5, Some(1));
        raster.draw_sphere(&cam, &right, 0.5, Some(2));
        // Pointer sits between the spheres, slightly toward the right one.
        assert_eq!(pick(&raster, 60, 50, 30), Some(2));
    }

    #[test]
    fn test_pick_near_border_does_not_panic() {
        let raster = Rasterizer::new(100, 100).unwrap();
        assert_eq!(pick(&raster, 0, 0, 10), None);
        assert_eq!(pick(&raster, 99, 99, 10), None);
    }

    #[test]
    fn test_drag_force_follows_screen_axes() {
        let cam = camera();
        // Dragging right (+dx) pushes toward world +X, dragging up (-dy)
        // toward world +Y.
        let f = drag_force(&cam, 10.0, 0.0, 1.0);
        assert!(f.x > 0.0);
        let f = drag_force(&cam, 0.0, -10.0, 1.0);
        assert!(f.y > 0.0);
    }
}
