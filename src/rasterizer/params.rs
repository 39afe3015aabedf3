//! Render parameters
//!
//! One explicit value drives a render pass. Defaults match the basic
//! rasterization demo: 800x800 display, pixel size 8, fov 45, planes -1/-50.

use std::fs;
use std::path::Path;
use serde::{Serialize, Deserialize};
use thiserror::Error;

use super::math::Vec3;
use super::render::AntiAlias;

/// Anti-alias choices offered by the viewer (0 = off, else n x n samples)
pub const ANTI_ALIAS_PRESETS: [u32; 4] = [0, 2, 4, 8];

/// Pixel sizes offered by the viewer
pub const PIXEL_SIZE_PRESETS: [u32; 3] = [1, 4, 8];

/// Largest sample grid dimension (16 x 16 = 256 samples per pixel)
pub const MAX_ANTI_ALIAS: u32 = 16;

/// Largest display width or height
pub const MAX_DISPLAY_SIZE: u32 = 8192;

/// Parameter-range errors. A render is refused rather than producing NaNs.
#[derive(Debug, Error)]
pub enum ParamError {
    #[error("{name} must be finite, got {value}")]
    NotFinite { name: &'static str, value: f64 },

    #[error("field of view must be between 0 and 180 degrees (exclusive), got {0}")]
    FieldOfView(f64),

    #[error("aspect ratio must be positive, got {0}")]
    AspectRatio(f64),

    #[error("frustum has zero extent: z_near={z_near}, z_far={z_far}")]
    ZeroExtentFrustum { z_near: f64, z_far: f64 },

    #[error("pixel size must be between 1 and {max}, got {size}")]
    PixelSize { size: u32, max: u32 },

    #[error("anti-alias factor must be at most {max}, got {factor}")]
    AntiAlias { factor: u32, max: u32 },

    #[error("display size must be between 1x1 and {max}x{max}, got {width}x{height}")]
    DisplaySize { width: u32, height: u32, max: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderParams {
    /// Rotation about X in degrees
    pub x_rotate: f64,
    /// Rotation about Y in degrees
    pub y_rotate: f64,
    /// Rotation about Z in degrees
    pub z_rotate: f64,
    /// 0 disables anti-aliasing, otherwise the sample grid dimension
    pub anti_alias: u32,
    /// Each logical pixel covers a pixel_size x pixel_size block on the display
    pub pixel_size: u32,
    pub eye_fov: f64,
    pub z_near: f64,
    pub z_far: f64,
    pub eye: Vec3,
    pub display_width: u32,
    pub display_height: u32,
    /// Color behind the scene; also what partially covered MSAA pixels blend with
    pub background: [u8; 3],
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            x_rotate: 0.0,
            y_rotate: 0.0,
            z_rotate: 0.0,
            anti_alias: 0,
            pixel_size: 8,
            eye_fov: 45.0,
            z_near: -1.0,
            z_far: -50.0,
            eye: Vec3::new(0.0, 0.0, 5.0),
            display_width: 800,
            display_height: 800,
            background: [0, 0, 0],
        }
    }
}

impl RenderParams {
    /// Logical raster size (display size divided by pixel size)
    pub fn raster_size(&self) -> (usize, usize) {
        let size = self.pixel_size.max(1);
        (
            (self.display_width / size) as usize,
            (self.display_height / size) as usize,
        )
    }

    pub fn aspect_ratio(&self) -> f64 {
        let (w, h) = self.raster_size();
        if h == 0 {
            return 0.0;
        }
        w as f64 / h as f64
    }

    pub fn anti_alias(&self) -> AntiAlias {
        AntiAlias::from_factor(self.anti_alias)
    }

    pub fn background_rgb(&self) -> Vec3 {
        let [r, g, b] = self.background;
        Vec3::new(r as f64, g as f64, b as f64)
    }

    /// Check everything a render pass depends on
    pub fn validate(&self) -> Result<(), ParamError> {
        let display_ok = |v: u32| (1..=MAX_DISPLAY_SIZE).contains(&v);
        if !display_ok(self.display_width) || !display_ok(self.display_height) {
            return Err(ParamError::DisplaySize {
                width: self.display_width,
                height: self.display_height,
                max: MAX_DISPLAY_SIZE,
            });
        }
        if self.anti_alias > MAX_ANTI_ALIAS {
            return Err(ParamError::AntiAlias { factor: self.anti_alias, max: MAX_ANTI_ALIAS });
        }
        let max = self.display_width.min(self.display_height);
        if self.pixel_size == 0 || self.pixel_size > max {
            return Err(ParamError::PixelSize { size: self.pixel_size, max });
        }
        for (name, value) in [
            ("x_rotate", self.x_rotate),
            ("y_rotate", self.y_rotate),
            ("z_rotate", self.z_rotate),
            ("eye.x", self.eye.x),
            ("eye.y", self.eye.y),
            ("eye.z", self.eye.z),
        ] {
            if !value.is_finite() {
                return Err(ParamError::NotFinite { name, value });
            }
        }
        super::transform::projection_matrix(self.eye_fov, self.aspect_ratio(), self.z_near, self.z_far)?;
        Ok(())
    }

    /// Step to the next anti-alias preset, wrapping around
    pub fn cycle_anti_alias(&mut self) {
        self.anti_alias = next_preset(&ANTI_ALIAS_PRESETS, self.anti_alias);
    }

    /// Step to the next pixel size preset, wrapping around
    pub fn cycle_pixel_size(&mut self) {
        self.pixel_size = next_preset(&PIXEL_SIZE_PRESETS, self.pixel_size);
    }
}

fn next_preset(presets: &[u32], current: u32) -> u32 {
    match presets.iter().position(|&p| p == current) {
        Some(i) => presets[(i + 1) % presets.len()],
        None => presets[0],
    }
}

/// Load render parameters from a RON file
pub fn load_params<P: AsRef<Path>>(path: P) -> Result<RenderParams, ParamError> {
    let contents = fs::read_to_string(path)?;
    let params: RenderParams = ron::from_str(&contents)?;
    Ok(params)
}

/// Save render parameters to a RON file
pub fn save_params<P: AsRef<Path>>(params: &RenderParams, path: P) -> Result<(), ParamError> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(2)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(params, config)?;
    fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let params = RenderParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.raster_size(), (100, 100));
        assert!((params.aspect_ratio() - 1.0).abs() < 1e-12);
        assert_eq!(params.anti_alias(), AntiAlias::Off);
    }

    #[test]
    fn test_pixel_size_rejected() {
        let mut params = RenderParams::default();
        params.pixel_size = 0;
        assert!(matches!(params.validate(), Err(ParamError::PixelSize { .. })));
        params.pixel_size = 801;
        assert!(matches!(params.validate(), Err(ParamError::PixelSize { .. })));
    }

    #[test]
    fn test_anti_alias_bounded() {
        let mut params = RenderParams { anti_alias: MAX_ANTI_ALIAS, ..Default::default() };
        assert!(params.validate().is_ok());
        params.anti_alias = 70000;
        assert!(matches!(
            params.validate(),
            Err(ParamError::AntiAlias { factor: 70000, max: MAX_ANTI_ALIAS })
        ));
    }

    #[test]
    fn test_display_size_bounded() {
        let huge = RenderParams {
            display_width: 70000,
            display_height: 70000,
            pixel_size: 70000,
            ..Default::default()
        };
        assert!(matches!(huge.validate(), Err(ParamError::DisplaySize { width: 70000, .. })));

        let empty = RenderParams { display_height: 0, ..Default::default() };
        assert!(matches!(empty.validate(), Err(ParamError::DisplaySize { height: 0, .. })));

        let largest = RenderParams {
            display_width: MAX_DISPLAY_SIZE,
            display_height: MAX_DISPLAY_SIZE,
            ..Default::default()
        };
        assert!(largest.validate().is_ok());
    }

    #[test]
    fn test_fov_rejected() {
        let params = RenderParams { eye_fov: 180.0, ..Default::default() };
        assert!(matches!(params.validate(), Err(ParamError::FieldOfView(_))));
    }

    #[test]
    fn test_non_finite_rotation_rejected() {
        let params = RenderParams { y_rotate: f64::INFINITY, ..Default::default() };
        assert!(matches!(params.validate(), Err(ParamError::NotFinite { name: "y_rotate", .. })));
    }

    #[test]
    fn test_cycle_presets() {
        let mut params = RenderParams::default();
        params.cycle_anti_alias();
        assert_eq!(params.anti_alias, 2);
        params.anti_alias = 8;
        params.cycle_anti_alias();
        assert_eq!(params.anti_alias, 0);

        params.cycle_pixel_size();
        assert_eq!(params.pixel_size, 1);
        params.pixel_size = 3;
        params.cycle_pixel_size();
        assert_eq!(params.pixel_size, 1);
    }

    #[test]
    fn test_ron_partial_document_uses_defaults() {
        let params: RenderParams = ron::from_str("(anti_alias: 4, eye_fov: 60.0)").unwrap();
        assert_eq!(params.anti_alias, 4);
        assert_eq!(params.eye_fov, 60.0);
        assert_eq!(params.pixel_size, 8);
    }
}
