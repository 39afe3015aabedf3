//! Scene module - indexed triangle lists with one color per triangle
//!
//! Two builtin scenes, plus RON scene files on disk.

mod file;

pub use file::*;

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::rasterizer::{Triangle, Vec3};

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),

    #[error("triangle {triangle} references vertex {index}, but the scene has {len} vertices")]
    IndexOutOfRange { triangle: usize, index: usize, len: usize },

    #[error("scene has {triangles} triangles but {colors} colors")]
    ColorCountMismatch { triangles: usize, colors: usize },

    #[error("vertex {0} has a non-finite coordinate")]
    NonFiniteVertex(usize),
}

/// Vertex positions, index triples into them, and one RGB color per triple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub name: String,
    pub vecs: Vec<[f64; 3]>,
    pub inds: Vec<[usize; 3]>,
    pub cols: Vec<[f64; 3]>,
}

impl Scene {
    /// Three separate triangles at different depths, two of them interpenetrating
    pub fn basic_triangles() -> Self {
        Self {
            name: "Triangles".to_string(),
            vecs: vec![
                [2.0, 0.0, -2.0],
                [0.0, 2.0, -2.0],
                [-2.0, 0.0, -2.0],
                [3.5, -1.0, -5.0],
                [2.5, 1.5, -5.0],
                [-1.0, 0.5, -5.0],
                [1.0, 0.0, -1.0],
                [0.0, 4.0, -4.0],
                [-2.0, 0.0, -7.0],
            ],
            inds: vec![[0, 1, 2], [3, 4, 5], [6, 7, 8]],
            cols: vec![
                [185.0, 217.0, 238.0],
                [217.0, 238.0, 185.0],
                [66.0, 135.0, 245.0],
            ],
        }
    }

    /// Triangular pyramid: four faces sharing edges
    pub fn pyramid() -> Self {
        Self {
            name: "Pyramid".to_string(),
            vecs: vec![
                [2.0, 0.0, -2.0],
                [0.0, 2.0, -2.0],
                [-2.0, 0.0, -2.0],
                [0.0, 0.0, -6.0],
            ],
            inds: vec![[0, 1, 2], [0, 1, 3], [1, 2, 3], [0, 2, 3]],
            cols: vec![
                [185.0, 217.0, 238.0],
                [217.0, 238.0, 185.0],
                [66.0, 135.0, 245.0],
                [50.0, 168.0, 82.0],
            ],
        }
    }

    /// Builtin scenes in selector order
    pub fn builtins() -> Vec<Scene> {
        vec![Self::basic_triangles(), Self::pyramid()]
    }

    pub fn triangle_count(&self) -> usize {
        self.inds.len()
    }

    /// Check indices, colors and coordinates before anything is drawn
    pub fn validate(&self) -> Result<(), SceneError> {
        if self.cols.len() != self.inds.len() {
            return Err(SceneError::ColorCountMismatch {
                triangles: self.inds.len(),
                colors: self.cols.len(),
            });
        }
        if let Some(i) = self.vecs.iter().position(|v| !v.iter().all(|c| c.is_finite())) {
            return Err(SceneError::NonFiniteVertex(i));
        }
        for (triangle, ind) in self.inds.iter().enumerate() {
            if let Some(&index) = ind.iter().find(|&&i| i >= self.vecs.len()) {
                return Err(SceneError::IndexOutOfRange {
                    triangle,
                    index,
                    len: self.vecs.len(),
                });
            }
        }
        Ok(())
    }

    /// Build the model-space triangles, failing fast on bad data
    pub fn triangles(&self) -> Result<Vec<Triangle>, SceneError> {
        self.validate()?;
        Ok(self
            .inds
            .iter()
            .zip(&self.cols)
            .map(|(ind, col)| {
                let vertices = ind.map(|i| Vec3::from_array(self.vecs[i]));
                Triangle::flat(vertices, Vec3::from_array(*col))
            })
            .collect())
    }
}
