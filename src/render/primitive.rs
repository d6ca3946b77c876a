//! Primitives and per-pixel interpolation
//!
//! Vertices carry world position, color (0-255 per channel) and normal.
//! Screen position and depth are transient, computed fresh each draw call.

use glam::{Vec2, Vec3};

use crate::render::Camera;

/// Barycentric denominators below this magnitude mark a degenerate
/// (zero-area) triangle, which covers no pixels.
const DEGENERATE_AREA_EPS: f32 = 1e-6;

#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Vec3,
    /// Color channels as 0-255 floats.
    pub color: Vec3,
    pub normal: Vec3,
}

impl Vertex {
    pub fn new(position: Vec3, color: Vec3, normal: Vec3) -> Self {
        Self {
            position,
            color,
            normal,
        }
    }

    /// Vertex with a zero normal, for unlit primitives like lines.
    pub fn flat(position: Vec3, color: Vec3) -> Self {
        Self::new(position, color, Vec3::ZERO)
    }
}

/// Vertex after projection, valid for a single draw call.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Projected {
    pub screen: Vec2,
    pub depth: f32,
    pub color: Vec3,
    pub normal: Vec3,
}

impl Projected {
    /// `None` when the vertex lies behind the camera; the caller culls the
    /// whole primitive in that case.
    pub fn of(camera: &Camera, v: &Vertex) -> Option<Self> {
        let (screen, depth) = camera.project(v.position);
        if depth <= 0.0 {
            return None;
        }
        Some(Self {
            screen,
            depth,
            color: v.color,
            normal: v.normal,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub v: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self { v: [v0, v1, v2] }
    }
}

/// Integer screen-space bounding box, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl BoundingBox {
    pub fn of(points: &[Vec2]) -> Self {
        let mut bb = Self {
            min_x: i32::MAX,
            min_y: i32::MAX,
            max_x: i32::MIN,
            max_y: i32::MIN,
        };
        for p in points {
            bb.min_x = bb.min_x.min(p.x.floor() as i32);
            bb.min_y = bb.min_y.min(p.y.floor() as i32);
            bb.max_x = bb.max_x.max(p.x.ceil() as i32);
            bb.max_y = bb.max_y.max(p.y.ceil() as i32);
        }
        bb
    }

    /// Clips to `[0, width) x [0, height)`; `None` when nothing remains.
    pub fn clipped(mut self, width: u32, height: u32) -> Option<Self> {
        self.min_x = self.min_x.max(0);
        self.min_y = self.min_y.max(0);
        self.max_x = self.max_x.min(width as i32 - 1);
        self.max_y = self.max_y.min(height as i32 - 1);
        (self.min_x <= self.max_x && self.min_y <= self.max_y).then_some(self)
    }
}

/// Barycentric coordinates of `pixel` with respect to the projected triangle
/// `(p0, p1, p2)` via the standard signed-area ratios.
///
/// Returns `None` outside the triangle (boundary inclusive) or when the
/// triangle is degenerate.
pub fn barycentric(p0: Vec2, p1: Vec2, p2: Vec2, pixel: Vec2) -> Option<(f32, f32, f32)> {
    let denom = (p1.y - p2.y) * (p0.x - p2.x) + (p2.x - p1.x) * (p0.y - p2.y);
    if denom.abs() < DEGENERATE_AREA_EPS {
        return None;
    }
    let alpha = ((p1.y - p2.y) * (pixel.x - p2.x) + (p2.x - p1.x) * (pixel.y - p2.y)) / denom;
    let beta = ((p2.y - p0.y) * (pixel.x - p2.x) + (p0.x - p2.x) * (pixel.y - p2.y)) / denom;
    let gamma = 1.0 - alpha - beta;
    let inside = (0.0..=1.0).contains(&alpha)
        && (0.0..=1.0).contains(&beta)
        && (0.0..=1.0).contains(&gamma);
    inside.then_some((alpha, beta, gamma))
}

/// Packs 0-255 float channels into 0xRRGGBB, clamping out-of-range values.
pub fn pack_color(color: Vec3) -> u32 {
    let r = color.x.clamp(0.0, 255.0) as u32;
    let g = color.y.clamp(0.0, 255.0) as u32;
    let b = color.z.clamp(0.0, 255.0) as u32;
    (r << 16) | (g << 8) | b
}
