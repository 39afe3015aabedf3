//! Presenting rendered frames
//!
//! A `Surface` is an RGBA pixel grid at display resolution that can only
//! draw single (possibly enlarged) pixels. Frames are blitted onto it and
//! then shown in the viewer or written out as PNG.

use std::path::{Path, PathBuf};
use macroquad::logging::info;
use thiserror::Error;

use crate::rasterizer::{render, Color, Framebuffer, ParamError, RenderError, RenderParams};
use crate::scene::Scene;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Invalid parameters: {0}")]
    Params(#[from] ParamError),

    #[error("surface of {width}x{height} does not match its pixel data")]
    SurfaceSize { width: u32, height: u32 },
}

/// RGBA display surface, 4 bytes per pixel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Surface {
    pub fn new(width: u32, height: u32, clear: Color) -> Self {
        let mut surface = Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        };
        surface.clear(clear);
        surface
    }

    pub fn clear(&mut self, color: Color) {
        let bytes = color.to_bytes();
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&bytes);
        }
    }

    /// Fill the `pixel_size` block for logical pixel (x, y), clipped to the surface
    pub fn draw_pixel(&mut self, x: u32, y: u32, color: Color, pixel_size: u32) {
        let bytes = color.to_bytes();
        let (width, height) = (self.width as usize, self.height as usize);
        let size = pixel_size as usize;
        let x0 = x as usize * size;
        let y0 = y as usize * size;
        for py in y0..(y0 + size).min(height) {
            for px in x0..(x0 + size).min(width) {
                let idx = (py * width + px) * 4;
                self.pixels[idx..idx + 4].copy_from_slice(&bytes);
            }
        }
    }

    /// Draw every written cell of the frame; blank cells keep the surface color
    pub fn blit(&mut self, fb: &Framebuffer, pixel_size: u32) {
        for (x, y, rgb) in fb.color.iter_written() {
            self.draw_pixel(x as u32, y as u32, Color::from_rgb(rgb), pixel_size);
        }
    }

    #[cfg(test)]
    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let p = &self.pixels[idx..idx + 4];
        Some(Color { r: p[0], g: p[1], b: p[2], a: p[3] })
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), ExportError> {
        let img = image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .ok_or(ExportError::SurfaceSize { width: self.width, height: self.height })?;
        img.save(path)?;
        Ok(())
    }
}

fn clear_color(params: &RenderParams) -> Color {
    let [r, g, b] = params.background;
    Color::new(r, g, b)
}

/// Logical-resolution RGBA bytes, one texel per raster cell
pub fn frame_rgba(fb: &Framebuffer, params: &RenderParams) -> Surface {
    let mut surface = Surface::new(fb.width() as u32, fb.height() as u32, clear_color(params));
    surface.blit(fb, 1);
    surface
}

/// Display-resolution surface: each cell becomes a pixel_size block
pub fn present(fb: &Framebuffer, params: &RenderParams) -> Surface {
    let mut surface = Surface::new(params.display_width, params.display_height, clear_color(params));
    surface.blit(fb, params.pixel_size.max(1));
    surface
}

/// Write a rendered frame to a PNG at display resolution
pub fn export_png<P: AsRef<Path>>(path: P, fb: &Framebuffer, params: &RenderParams) -> Result<(), ExportError> {
    params.validate()?;
    let path = path.as_ref();
    present(fb, params).save_png(path)?;
    info!("exported {}", path.display());
    Ok(())
}

/// Rotation axis for a turntable sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn rotate(self, params: &mut RenderParams, deg: f64) {
        match self {
            Axis::X => params.x_rotate += deg,
            Axis::Y => params.y_rotate += deg,
            Axis::Z => params.z_rotate += deg,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

/// Render a full 360 degree sweep about one axis into `dir`, one PNG per step.
/// Returns the written paths in order.
#[cfg(not(target_arch = "wasm32"))]
pub fn export_turntable<P: AsRef<Path>>(
    scene: &Scene,
    params: &RenderParams,
    axis: Axis,
    steps: u32,
    dir: P,
) -> Result<Vec<PathBuf>, ExportError> {
    use indicatif::{ProgressBar, ProgressStyle};

    params.validate()?;
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    let steps = steps.max(1);
    let step_deg = 360.0 / steps as f64;

    let progress = ProgressBar::new(steps as u64);
    if let Ok(style) = ProgressStyle::with_template("{msg} [{bar:30}] {pos}/{len}") {
        progress.set_style(style.progress_chars("=> "));
    }
    progress.set_message(format!("turntable {}", axis.label()));

    let mut frame_params = params.clone();
    let mut written = Vec::with_capacity(steps as usize);
    for i in 0..steps {
        let frame = render(scene, &frame_params)?;
        let path = dir.join(format!("{}_{}_{:03}.png", slug(&scene.name), axis.label(), i));
        present(&frame.framebuffer, &frame_params).save_png(&path)?;
        written.push(path);

        axis.rotate(&mut frame_params, step_deg);
        progress.inc(1);
    }
    progress.finish_and_clear();

    info!("exported {} turntable frames to {}", written.len(), dir.display());
    Ok(written)
}

/// File-name-safe version of a scene name
pub fn slug(name: &str) -> String {
    let s: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    if s.is_empty() { "scene".to_string() } else { s }
}
