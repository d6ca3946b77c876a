//! Pinhole camera: world space to pixel coordinates
//!
//! The camera sits at an arbitrary position with a yaw/pitch orientation and
//! projects world points onto the raster plane. At zero rotation it looks
//! along world +Z with +Y up. Orientation is rebuilt from the angles on every
//! call so that continuous camera motion is reflected immediately.

use glam::{Mat3, Vec2, Vec3};

use crate::error::SimError;

/// Pitch stays strictly inside (-pi/2, pi/2) to avoid gimbal degeneracy.
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 1e-3;

#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    phi: f32,
    theta: f32,
    focal_length: f32,
    zoom_x: f32,
    zoom_y: f32,
    pub width: u32,
    pub height: u32,
}

impl Camera {
    pub fn new(
        position: Vec3,
        focal_length: f32,
        zoom: f32,
        width: u32,
        height: u32,
    ) -> Result<Self, SimError> {
        if !(zoom > 0.0) {
            return Err(SimError::NonPositiveZoom(zoom));
        }
        if !(focal_length > 0.0) {
            return Err(SimError::NonPositiveFocalLength(focal_length));
        }
        Ok(Self {
            position,
            phi: 0.0,
            theta: 0.0,
            focal_length,
            zoom_x: zoom,
            zoom_y: zoom,
            width,
            height,
        })
    }

    /// Yaw angle in radians, unbounded.
    pub fn phi(&self) -> f32 {
        self.phi
    }

    pub fn set_phi(&mut self, phi: f32) {
        self.phi = phi;
    }

    /// Pitch angle in radians, clamped inside (-pi/2, pi/2).
    pub fn theta(&self) -> f32 {
        self.theta
    }

    pub fn set_theta(&mut self, theta: f32) {
        self.theta = theta.clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub fn turn(&mut self, d_phi: f32, d_theta: f32) {
        self.set_phi(self.phi + d_phi);
        self.set_theta(self.theta + d_theta);
    }

    pub fn zoom(&self) -> f32 {
        self.zoom_x
    }

    pub fn focal_length(&self) -> f32 {
        self.focal_length
    }

    /// Multiplicative zoom update. A factor that would leave the zoom
    /// non-finite or non-positive is rejected as a logged no-op; existing
    /// state is untouched.
    pub fn scale_zoom(&mut self, factor: f32) {
        let zx = self.zoom_x * factor;
        let zy = self.zoom_y * factor;
        if !zx.is_finite() || !zy.is_finite() || zx <= 0.0 || zy <= 0.0 {
            log::warn!("rejected zoom factor {factor}: would produce zoom {zx}");
            return;
        }
        self.zoom_x = zx;
        self.zoom_y = zy;
    }

    /// Multiplicative focal-length update with the same rejection rule as
    /// [`scale_zoom`](Self::scale_zoom).
    pub fn scale_focal_length(&mut self, factor: f32) {
        let f = self.focal_length * factor;
        if !f.is_finite() || f <= 0.0 {
            log::warn!("rejected focal factor {factor}: would produce focal length {f}");
            return;
        }
        self.focal_length = f;
    }

    /// Orientation matrix mapping camera axes into world space.
    fn rotation(&self) -> Mat3 {
        Mat3::from_rotation_y(self.phi) * Mat3::from_rotation_x(-self.theta)
    }

    /// Unit looking direction in world space.
    pub fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::Z
    }

    /// Unit up vector in world space.
    pub fn up(&self) -> Vec3 {
        self.rotation() * Vec3::Y
    }

    /// Unit left vector in world space.
    pub fn left(&self) -> Vec3 {
        self.rotation() * Vec3::NEG_X
    }

    pub fn move_forward(&mut self, dist: f32) {
        self.position += self.forward() * dist;
    }

    pub fn move_left(&mut self, dist: f32) {
        self.position += self.left() * dist;
    }

    pub fn move_up(&mut self, dist: f32) {
        self.position += self.up() * dist;
    }

    /// Projects a world point to pixel coordinates plus a depth scalar.
    ///
    /// Depth is the camera-space forward component. A point at or behind the
    /// camera plane yields a sentinel depth of `f32::NEG_INFINITY`; its
    /// screen position is undefined and callers must cull it.
    pub fn project(&self, world: Vec3) -> (Vec2, f32) {
        let cam = self.rotation().transpose() * (world - self.position);
        let depth = cam.z;
        if depth <= 0.0 {
            return (Vec2::new(-1.0, -1.0), f32::NEG_INFINITY);
        }
        let sx = self.width as f32 / 2.0 + self.focal_length * cam.x / (self.zoom_x * depth);
        let sy = self.height as f32 / 2.0 - self.focal_length * cam.y / (self.zoom_y * depth);
        (Vec2::new(sx, sy), depth)
    }

    /// Pixel radius of a world-space sphere of `radius` seen at `depth`.
    pub fn pixel_radius(&self, radius: f32, depth: f32) -> f32 {
        radius * self.focal_length / (depth * self.zoom_x)
    }
}
