//! Depth-buffered scan conversion
//!
//! Owns three same-sized buffers: 0xRRGGBB color, f32 depth (cleared to +inf)
//! and an entity tag per pixel for pointer picking. Buffers are only reset by
//! an explicit [`clear`](Rasterizer::clear) at the start of a frame, never
//! implicitly between primitives.

use glam::{Vec2, Vec3};

use crate::entity::EntityId;
use crate::error::SimError;
use crate::render::camera::Camera;
use crate::render::primitive::{BoundingBox, Projected, Triangle, Vertex, barycentric, pack_color};

pub struct Rasterizer {
    width: u32,
    height: u32,
    color: Vec<u32>,
    depth: Vec<f32>,
    entity: Vec<Option<EntityId>>,
    pub background: u32,
}

impl Rasterizer {
    pub fn new(width: u32, height: u32) -> Result<Self, SimError> {
        if width == 0 || height == 0 {
            return Err(SimError::EmptyRaster { width, height });
        }
        let len = (width * height) as usize;
        Ok(Self {
            width,
            height,
            color: vec![0; len],
            depth: vec![f32::INFINITY; len],
            entity: vec![None; len],
            background: 0x000000,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Resets color to the background, depth to +inf and all entity tags.
    pub fn clear(&mut self) {
        self.color.fill(self.background);
        self.depth.fill(f32::INFINITY);
        self.entity.fill(None);
    }

    /// Drops the buffers and reallocates at the new window size.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), SimError> {
        if width == 0 || height == 0 {
            return Err(SimError::EmptyRaster { width, height });
        }
        let len = (width * height) as usize;
        self.width = width;
        self.height = height;
        self.color = vec![self.background; len];
        self.depth = vec![f32::INFINITY; len];
        self.entity = vec![None; len];
        Ok(())
    }

    /// The pixel buffer, row-major, for the host to blit.
    pub fn color_buffer(&self) -> &[u32] {
        &self.color
    }

    pub fn color_at(&self, x: u32, y: u32) -> u32 {
        self.color[(y * self.width + x) as usize]
    }

    pub fn depth_at(&self, x: u32, y: u32) -> f32 {
        self.depth[(y * self.width + x) as usize]
    }

    /// Entity drawn on top at the given pixel, if any primitive carrying a
    /// tag won the depth test there this frame.
    pub fn entity_at(&self, x: u32, y: u32) -> Option<EntityId> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.entity[(y * self.width + x) as usize]
    }

    /// Depth-tested pixel write; keeps the buffer only if strictly closer.
    fn plot(&mut self, x: i32, y: i32, depth: f32, color: Vec3, entity: Option<EntityId>) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = (y as u32 * self.width + x as u32) as usize;
        if depth >= 0.0 && depth < self.depth[idx] {
            self.depth[idx] = depth;
            self.color[idx] = pack_color(color);
            self.entity[idx] = entity;
        }
    }

    /// Scan-converts a triangle with barycentric depth, color and normal
    /// interpolation. Vertices carrying nonzero normals get a flat
    /// directional shade against the view direction; zero-normal vertices
    /// stay unlit. Skipped entirely when any vertex is behind the camera.
    pub fn draw_triangle(&mut self, camera: &Camera, tri: &Triangle, entity: Option<EntityId>) {
        let Some(p0) = Projected::of(camera, &tri.v[0]) else {
            return;
        };
        let Some(p1) = Projected::of(camera, &tri.v[1]) else {
            return;
        };
        let Some(p2) = Projected::of(camera, &tri.v[2]) else {
            return;
        };

        let Some(bb) = BoundingBox::of(&[p0.screen, p1.screen, p2.screen])
            .clipped(self.width, self.height)
        else {
            return;
        };

        let toward_camera = -camera.forward();
        for y in bb.min_y..=bb.max_y {
            for x in bb.min_x..=bb.max_x {
                let pixel = Vec2::new(x as f32, y as f32);
                let Some((alpha, beta, gamma)) =
                    barycentric(p0.screen, p1.screen, p2.screen, pixel)
                else {
                    continue;
                };
                let depth = alpha * p0.depth + beta * p1.depth + gamma * p2.depth;
                let mut color = alpha * p0.color + beta * p1.color + gamma * p2.color;
                let normal = alpha * p0.normal + beta * p1.normal + gamma * p2.normal;
                if let Some(n) = normal.try_normalize() {
                    color *= 0.3 + 0.7 * n.dot(toward_camera).max(0.0);
                }
                self.plot(x, y, depth, color, entity);
            }
        }
    }

    /// Bresenham line scan with linear depth/color interpolation along the
    /// stepped axis. The projected segment is clipped to the buffer first, so
    /// per-line work is bounded by the buffer size even when an endpoint
    /// projects far off screen (depth close to the camera plane).
    pub fn draw_line(&mut self, camera: &Camera, a: &Vertex, b: &Vertex, entity: Option<EntityId>) {
        let Some(pa) = Projected::of(camera, a) else {
            return;
        };
        let Some(pb) = Projected::of(camera, b) else {
            return;
        };
        if !pa.screen.is_finite() || !pb.screen.is_finite() {
            return;
        }
        let Some((t0, t1)) = clip_segment(pa.screen, pb.screen, self.width, self.height) else {
            return;
        };
        let s0 = pa.screen.lerp(pb.screen, t0);
        let s1 = pa.screen.lerp(pb.screen, t1);
        let d0 = pa.depth + (pb.depth - pa.depth) * t0;
        let d1 = pa.depth + (pb.depth - pa.depth) * t1;
        let c0 = pa.color + (pb.color - pa.color) * t0;
        let c1 = pa.color + (pb.color - pa.color) * t1;

        let mut x0 = s0.x.round() as i32;
        let mut y0 = s0.y.round() as i32;
        let x1 = s1.x.round() as i32;
        let y1 = s1.y.round() as i32;

        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        let steps = dx.max(-dy).max(1) as f32;
        let mut step = 0.0f32;

        loop {
            let t = step / steps;
            let depth = (1.0 - t) * d0 + t * d1;
            let color = (1.0 - t) * c0 + t * c1;
            self.plot(x0, y0, depth, color, entity);

            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
            step += 1.0;
        }
    }

    /// Sphere impostor: screen-space circle around the projected center with
    /// per-pixel spherical depth adjustment and a shading falloff toward the
    /// silhouette.
    pub fn draw_sphere(
        &mut self,
        camera: &Camera,
        center: &Vertex,
        radius: f32,
        entity: Option<EntityId>,
    ) {
        let Some(pc) = Projected::of(camera, center) else {
            return;
        };
        let r_px = camera.pixel_radius(radius, pc.depth);
        if !(r_px >= 1.0) {
            // Sub-pixel sphere collapses to a single dot.
            self.plot(
                pc.screen.x.round() as i32,
                pc.screen.y.round() as i32,
                pc.depth,
                pc.color,
                entity,
            );
            return;
        }

        let rv = Vec2::splat(r_px);
        let Some(bb) = BoundingBox::of(&[pc.screen - rv, pc.screen + rv])
            .clipped(self.width, self.height)
        else {
            return;
        };

        let r2 = r_px * r_px;
        for y in bb.min_y..=bb.max_y {
            for x in bb.min_x..=bb.max_x {
                let dx = x as f32 - pc.screen.x;
                let dy = y as f32 - pc.screen.y;
                let d2 = dx * dx + dy * dy;
                if d2 > r2 {
                    continue;
                }
                let dz_px = (r2 - d2).sqrt();
                // Bulge toward the camera in world units.
                let depth = pc.depth - dz_px / r_px * radius;
                let shade = 0.3 + 0.7 * (dz_px / r_px);
                self.plot(x, y, depth, pc.color * shade, entity);
            }
        }
    }
}

/// Liang-Barsky clip of the parametric segment `p0 + t * (p1 - p0)`,
/// t in [0, 1], against `[0, width - 1] x [0, height - 1]`. Returns the
/// surviving parameter range, `None` when the segment misses the rectangle.
fn clip_segment(p0: Vec2, p1: Vec2, width: u32, height: u32) -> Option<(f32, f32)> {
    let d = p1 - p0;
    let (mut t0, mut t1) = (0.0_f32, 1.0_f32);
    let edges = [
        (-d.x, p0.x),
        (d.x, width as f32 - 1.0 - p0.x),
        (-d.y, p0.y),
        (d.y, height as f32 - 1.0 - p0.y),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            // Parallel to this edge; fully outside when q is negative.
            if q < 0.0 {
                return None;
            }
        } else {
            let t = q / p;
            if p < 0.0 {
                t0 = t0.max(t);
            } else {
                t1 = t1.min(t);
            }
        }
    }
    (t0 <= t1).then_some((t0, t1))
}
