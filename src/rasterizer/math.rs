//! Vector and matrix math for the transform pipeline
//!
//! Everything is `f64` and row-major. Points are promoted to homogeneous
//! coordinates with w = 1 when transformed.

use std::ops::{Add, Mul, Neg, Sub};
use serde::{Serialize, Deserialize};

/// Below this |w| a homogeneous point cannot be brought back to 3-space
const W_EPSILON: f64 = 1e-12;

/// Below this |area| a triangle covers nothing
const AREA_EPSILON: f64 = 1e-12;

/// 3D Vector (also used as an RGB triple, 0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn from_array(a: [f64; 3]) -> Self {
        Self { x: a[0], y: a[1], z: a[2] }
    }

    pub fn scale(self, s: f64) -> Vec3 {
        Vec3 {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    #[cfg(test)]
    pub fn approx_eq(self, other: Vec3, eps: f64) -> bool {
        (self.x - other.x).abs() <= eps
            && (self.y - other.y).abs() <= eps
            && (self.z - other.z).abs() <= eps
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f64) -> Vec3 {
        self.scale(s)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        self.scale(-1.0)
    }
}

/// 4x4 matrix, row-major. `a * b` applies `b` first when transforming points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    pub rows: [[f64; 4]; 4],
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        rows: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    pub const fn from_rows(rows: [[f64; 4]; 4]) -> Self {
        Self { rows }
    }

    pub fn multiply(&self, other: &Mat4) -> Mat4 {
        let mut result = [[0.0; 4]; 4];
        for (i, row) in result.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..4).map(|k| self.rows[i][k] * other.rows[k][j]).sum();
            }
        }
        Mat4 { rows: result }
    }

    /// Multiply (x, y, z, 1) by this matrix without dividing by w
    pub fn transform_homogeneous(&self, p: Vec3) -> [f64; 4] {
        let m = &self.rows;
        let mut out = [0.0; 4];
        for (i, o) in out.iter_mut().enumerate() {
            *o = m[i][0] * p.x + m[i][1] * p.y + m[i][2] * p.z + m[i][3];
        }
        out
    }

    /// Transform a point, dividing by w when it is not 1.
    /// Returns `None` when w is zero: the point has no image in 3-space.
    pub fn transform_point(&self, p: Vec3) -> Option<Vec3> {
        let [x, y, z, w] = self.transform_homogeneous(p);
        if w.abs() < W_EPSILON {
            return None;
        }
        if w == 1.0 {
            return Some(Vec3::new(x, y, z));
        }
        Some(Vec3::new(x / w, y / w, z / w))
    }

    #[cfg(test)]
    pub fn approx_eq(&self, other: &Mat4, eps: f64) -> bool {
        self.rows
            .iter()
            .flatten()
            .zip(other.rows.iter().flatten())
            .all(|(a, b)| (a - b).abs() <= eps)
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Mat4 {
    type Output = Mat4;
    fn mul(self, other: Mat4) -> Mat4 {
        self.multiply(&other)
    }
}

/// Barycentric weights of (px, py) in the screen-space triangle (a, b, c).
///
/// Edge functions are divided by the signed area, so the weights are
/// positive inside the triangle for either winding. Returns `None` for a
/// degenerate (zero-area) triangle.
pub fn barycentric(px: f64, py: f64, a: Vec3, b: Vec3, c: Vec3) -> Option<Vec3> {
    let area = edge(a, b, c.x, c.y);
    if area.abs() < AREA_EPSILON {
        return None;
    }

    let w0 = edge(b, c, px, py) / area;
    let w1 = edge(c, a, px, py) / area;
    let w2 = 1.0 - w0 - w1;

    Some(Vec3::new(w0, w1, w2))
}

/// Signed doubled area of (a, b, p)
fn edge(a: Vec3, b: Vec3, px: f64, py: f64) -> f64 {
    (b.x - a.x) * (py - a.y) - (b.y - a.y) * (px - a.x)
}
