//! Core types for the rasterizer

use super::math::{Mat4, Vec3};
use super::transform::Viewport;

/// RGBA color (0-255 per channel), the presenter's output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Round and clamp an interpolated RGB triple into a displayable color
    pub fn from_rgb(rgb: Vec3) -> Self {
        let channel = |v: f64| v.round().clamp(0.0, 255.0) as u8;
        Self::new(channel(rgb.x), channel(rgb.y), channel(rgb.z))
    }

    /// Convert to [u8; 4] for the RGBA surface
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Three vertices with a color each.
///
/// Pipeline stages return a new triangle instead of mutating this one:
/// model space -> `mvp_transform` -> `viewport_transform` -> rasterize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Vec3; 3],
    pub colors: [Vec3; 3],
}

impl Triangle {
    pub fn new(vertices: [Vec3; 3], colors: [Vec3; 3]) -> Self {
        Self { vertices, colors }
    }

    /// Single color applied to all three vertices
    pub fn flat(vertices: [Vec3; 3], color: Vec3) -> Self {
        Self::new(vertices, [color; 3])
    }

    /// Apply the combined MVP matrix with perspective divide.
    /// `None` when a vertex has w = 0.
    pub fn mvp_transform(&self, mvp: &Mat4) -> Option<Triangle> {
        let [a, b, c] = self.vertices;
        Some(Triangle {
            vertices: [
                mvp.transform_point(a)?,
                mvp.transform_point(b)?,
                mvp.transform_point(c)?,
            ],
            colors: self.colors,
        })
    }

    /// Map NDC vertices into pixel space
    pub fn viewport_transform(&self, viewport: &Viewport) -> Triangle {
        Triangle {
            vertices: self.vertices.map(|v| viewport.map(v)),
            colors: self.colors,
        }
    }

    /// True when every vertex lies inside the NDC depth range [-1, 1]
    pub fn in_depth_range(&self) -> bool {
        self.vertices.iter().all(|v| v.z.is_finite() && (-1.0..=1.0).contains(&v.z))
    }

    /// Twice the signed screen-space area
    pub fn signed_area(&self) -> f64 {
        let [a, b, c] = self.vertices;
        (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
    }

    /// Interpolate vertex colors with barycentric weights
    pub fn color_at(&self, bc: Vec3) -> Vec3 {
        let [c0, c1, c2] = self.colors;
        c0 * bc.x + c1 * bc.y + c2 * bc.z
    }

    /// Interpolate vertex depth with barycentric weights
    pub fn depth_at(&self, bc: Vec3) -> f64 {
        let [a, b, c] = self.vertices;
        a.z * bc.x + b.z * bc.y + c.z * bc.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::transform::DepthRange;

    fn sample() -> Triangle {
        Triangle::flat(
            [Vec3::new(2.0, 0.0, -2.0), Vec3::new(0.0, 2.0, -2.0), Vec3::new(-2.0, 0.0, -2.0)],
            Vec3::new(185.0, 217.0, 238.0),
        )
    }

    #[test]
    fn test_color_from_rgb_rounds_and_clamps() {
        assert_eq!(Color::from_rgb(Vec3::new(12.4, 12.6, 300.0)), Color::new(12, 13, 255));
        assert_eq!(Color::from_rgb(Vec3::new(-4.0, 0.0, 0.0)), Color::BLACK);
    }

    #[test]
    fn test_mvp_transform_leaves_input_untouched() {
        let tri = sample();
        let shift = Mat4::from_rows([
            [1.0, 0.0, 0.0, 1.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        let moved = tri.mvp_transform(&shift).unwrap();
        assert_eq!(tri, sample());
        assert!(moved.vertices[0].approx_eq(Vec3::new(3.0, 0.0, -2.0), 1e-12));
        assert_eq!(moved.colors, tri.colors);
    }

    #[test]
    fn test_mvp_transform_zero_w() {
        let collapse = Mat4::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 0.0],
        ]);
        assert_eq!(sample().mvp_transform(&collapse), None);
    }

    #[test]
    fn test_viewport_transform() {
        let tri = Triangle::flat(
            [Vec3::new(-1.0, 1.0, 1.0), Vec3::new(1.0, 1.0, 1.0), Vec3::new(0.0, -1.0, -1.0)],
            Vec3::ZERO,
        );
        let vp = Viewport::new(10, 20, DepthRange::new(-1.0, -50.0));
        let mapped = tri.viewport_transform(&vp);
        assert!(mapped.vertices[0].approx_eq(Vec3::new(0.0, 0.0, 1.0), 1e-12));
        assert!(mapped.vertices[1].approx_eq(Vec3::new(10.0, 0.0, 1.0), 1e-12));
        assert!(mapped.vertices[2].approx_eq(Vec3::new(5.0, 20.0, 50.0), 1e-12));
    }

    #[test]
    fn test_interpolation() {
        let tri = Triangle::new(
            [Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 2.0), Vec3::new(0.0, 1.0, 3.0)],
            [Vec3::new(255.0, 0.0, 0.0), Vec3::new(0.0, 255.0, 0.0), Vec3::new(0.0, 0.0, 255.0)],
        );
        let bc = Vec3::new(0.5, 0.25, 0.25);
        assert!((tri.depth_at(bc) - 1.75).abs() < 1e-12);
        assert!(tri.color_at(bc).approx_eq(Vec3::new(127.5, 63.75, 63.75), 1e-12));
    }
}
