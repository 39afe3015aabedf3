//! Frame and depth buffers
//!
//! Flat `Vec`s indexed by `y * width + x`. Accessors take 2D coordinates and
//! ignore anything outside the grid, so callers never do index math.

use super::math::Vec3;

/// Per-pixel interpolated RGB, `None` until something is drawn there
#[derive(Debug, Clone, PartialEq)]
pub struct ColorBuffer {
    width: usize,
    height: usize,
    cells: Vec<Option<Vec3>>,
}

impl ColorBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Vec3> {
        self.index(x, y).and_then(|i| self.cells[i])
    }

    pub fn set(&mut self, x: usize, y: usize, rgb: Vec3) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = Some(rgb);
        }
    }

    #[cfg(test)]
    pub fn is_written(&self, x: usize, y: usize) -> bool {
        self.get(x, y).is_some()
    }

    /// Number of cells holding a color
    #[cfg(test)]
    pub fn written_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// `(x, y, rgb)` for every written cell, row by row
    pub fn iter_written(&self) -> impl Iterator<Item = (usize, usize, Vec3)> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(i, c)| c.map(|rgb| (i % width, i / width, rgb)))
    }
}

/// Closest depth written per pixel; `f64::INFINITY` means nothing yet
#[derive(Debug, Clone, PartialEq)]
pub struct DepthBuffer {
    width: usize,
    height: usize,
    depths: Vec<f64>,
}

impl DepthBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            depths: vec![f64::INFINITY; width * height],
        }
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    #[cfg(test)]
    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        self.index(x, y).map(|i| self.depths[i])
    }

    /// Store `z` if it is closer (smaller) than the current value
    pub fn test_and_set(&mut self, x: usize, y: usize, z: f64) -> bool {
        match self.index(x, y) {
            Some(i) if z < self.depths[i] => {
                self.depths[i] = z;
                true
            }
            _ => false,
        }
    }
}

/// Render target: color and depth of the same size
#[derive(Debug, Clone, PartialEq)]
pub struct Framebuffer {
    pub color: ColorBuffer,
    pub depth: DepthBuffer,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            color: ColorBuffer::new(width, height),
            depth: DepthBuffer::new(width, height),
        }
    }

    pub fn width(&self) -> usize {
        self.color.width()
    }

    pub fn height(&self) -> usize {
        self.color.height()
    }

    /// Depth-test a fragment and write its color when it passes
    pub fn write_with_depth(&mut self, x: usize, y: usize, z: f64, rgb: Vec3) -> bool {
        if self.depth.test_and_set(x, y, z) {
            self.color.set(x, y, rgb);
            return true;
        }
        false
    }
}
