//! Model, view and projection matrix builders
//!
//! The camera sits at `eye` looking down -Z, so both clip planes are
//! expected to be negative with `z_near` closer to zero than `z_far`.

use macroquad::logging::warn;

use super::math::{Mat4, Vec3};
use super::params::{ParamError, RenderParams};

fn rotate_x(deg: f64) -> Mat4 {
    let (s, c) = deg.to_radians().sin_cos();
    Mat4::from_rows([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, c, -s, 0.0],
        [0.0, s, c, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ])
}

fn rotate_y(deg: f64) -> Mat4 {
    let (s, c) = deg.to_radians().sin_cos();
    Mat4::from_rows([
        [c, 0.0, s, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [-s, 0.0, c, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ])
}

fn rotate_z(deg: f64) -> Mat4 {
    let (s, c) = deg.to_radians().sin_cos();
    Mat4::from_rows([
        [c, -s, 0.0, 0.0],
        [s, c, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ])
}

/// Model matrix `Rx * Ry * Rz`: the Z rotation is applied to the point first.
/// Angles are in degrees.
pub fn model_matrix(x_deg: f64, y_deg: f64, z_deg: f64) -> Mat4 {
    rotate_x(x_deg) * rotate_y(y_deg) * rotate_z(z_deg)
}

/// Translate the world so the eye ends up at the origin
pub fn view_matrix(eye: Vec3) -> Mat4 {
    Mat4::from_rows([
        [1.0, 0.0, 0.0, -eye.x],
        [0.0, 1.0, 0.0, -eye.y],
        [0.0, 0.0, 1.0, -eye.z],
        [0.0, 0.0, 0.0, 1.0],
    ])
}

/// Perspective projection built as `ortho * persp_to_ortho`.
///
/// `persp_to_ortho` squeezes the frustum into a box between the two planes,
/// `ortho` then centers that box on the origin and scales it to [-1, 1].
/// The near plane lands on NDC z = +1 and the far plane on z = -1.
pub fn projection_matrix(
    fov_deg: f64,
    aspect_ratio: f64,
    z_near: f64,
    z_far: f64,
) -> Result<Mat4, ParamError> {
    check_frustum(fov_deg, aspect_ratio, z_near, z_far)?;

    let top = (fov_deg.to_radians() / 2.0).tan() * z_near.abs();
    let right = aspect_ratio * top;

    let right_to_left = right * 2.0;
    let top_to_bottom = top * 2.0;
    let near_to_far = z_near - z_far;

    let scale = Mat4::from_rows([
        [2.0 / right_to_left, 0.0, 0.0, 0.0],
        [0.0, 2.0 / top_to_bottom, 0.0, 0.0],
        [0.0, 0.0, 2.0 / near_to_far, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);
    // Camera is on the z axis, so only z needs centering
    let center = Mat4::from_rows([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, -(z_near + z_far) / 2.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);
    let ortho = scale * center;

    let persp_to_ortho = Mat4::from_rows([
        [z_near, 0.0, 0.0, 0.0],
        [0.0, z_near, 0.0, 0.0],
        [0.0, 0.0, z_near + z_far, -z_near * z_far],
        [0.0, 0.0, 1.0, 0.0],
    ]);

    Ok(ortho * persp_to_ortho)
}

fn check_frustum(fov_deg: f64, aspect_ratio: f64, z_near: f64, z_far: f64) -> Result<(), ParamError> {
    for (name, value) in [
        ("eye_fov", fov_deg),
        ("aspect_ratio", aspect_ratio),
        ("z_near", z_near),
        ("z_far", z_far),
    ] {
        if !value.is_finite() {
            return Err(ParamError::NotFinite { name, value });
        }
    }
    if fov_deg <= 0.0 || fov_deg >= 180.0 {
        return Err(ParamError::FieldOfView(fov_deg));
    }
    if aspect_ratio <= 0.0 {
        return Err(ParamError::AspectRatio(aspect_ratio));
    }
    if z_near == 0.0 || z_near == z_far {
        return Err(ParamError::ZeroExtentFrustum { z_near, z_far });
    }
    if z_near > 0.0 || z_far > 0.0 {
        warn!(
            "clip planes z_near={} z_far={} are not both negative, the scene will be mirrored",
            z_near, z_far
        );
    }
    Ok(())
}

/// Combined `projection * view * model` for a parameter set
pub fn mvp_matrix(params: &RenderParams) -> Result<Mat4, ParamError> {
    let view = view_matrix(params.eye);
    let model = model_matrix(params.x_rotate, params.y_rotate, params.z_rotate);
    let projection = projection_matrix(
        params.eye_fov,
        params.aspect_ratio(),
        params.z_near,
        params.z_far,
    )?;
    Ok(projection * view * model)
}

/// Factors re-linearizing NDC depth for the depth buffer: `z' = z * f1 + f2`.
///
/// The near plane (NDC +1) maps to `|z_near|` and the far plane (NDC -1) to
/// `|z_far|`, so a smaller stored depth is always closer to the eye.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthRange {
    pub f1: f64,
    pub f2: f64,
}

impl DepthRange {
    pub fn new(z_near: f64, z_far: f64) -> Self {
        let near = z_near.abs();
        let far = z_far.abs();
        Self {
            f1: (near - far) / 2.0,
            f2: (far + near) / 2.0,
        }
    }

    pub fn apply(&self, z_ndc: f64) -> f64 {
        z_ndc * self.f1 + self.f2
    }
}

/// Target of the viewport transform: raster size plus depth factors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: usize,
    pub height: usize,
    pub depth: DepthRange,
}

impl Viewport {
    pub fn new(width: usize, height: usize, depth: DepthRange) -> Self {
        Self { width, height, depth }
    }

    /// Map an NDC point to pixel space. Row 0 is the top of the image.
    pub fn map(&self, ndc: Vec3) -> Vec3 {
        Vec3::new(
            (ndc.x + 1.0) * self.width as f64 / 2.0,
            (1.0 - ndc.y) * self.height as f64 / 2.0,
            self.depth.apply(ndc.z),
        )
    }
}
