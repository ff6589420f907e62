//! Scene representation.
//!
//! The scene owns two contiguous arenas - primitives and materials -
//! addressed by stable integer index, plus a sky color. Index stability
//! holds for the duration of a render pass; removals may shift indices
//! between passes, which is why every mutation is expected to be followed
//! by an accumulation reset on the renderer side.

use ember_math::Vec3;
use thiserror::Error;

use crate::{Material, Sphere};

/// Errors from scene and material construction or validation.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum SceneError {
    #[error("sphere radius must be positive, got {0}")]
    InvalidRadius(f32),

    #[error("{field} components must be finite and within [0, 1], got {color}")]
    InvalidColor { field: &'static str, color: Vec3 },

    #[error("{field} must be within [0, 1], got {value}")]
    OutOfUnitRange { field: &'static str, value: f32 },

    #[error("index of refraction must be positive, got {0}")]
    InvalidIor(f32),

    #[error("emission power must be non-negative, got {0}")]
    InvalidEmissionPower(f32),

    #[error("sphere {sphere} references material {material}, but the scene has {material_count} materials")]
    DanglingMaterial {
        sphere: usize,
        material: usize,
        material_count: usize,
    },

    #[error("no sphere at index {0}")]
    NoSuchSphere(usize),

    #[error("no material at index {0}")]
    NoSuchMaterial(usize),
}

/// A renderable scene: sphere arena + material arena + sky color.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    spheres: Vec<Sphere>,
    materials: Vec<Material>,
    pub sky_color: Vec3,
}

impl Scene {
    /// Create an empty scene with the given sky color.
    pub fn new(sky_color: Vec3) -> Self {
        Self {
            spheres: Vec::new(),
            materials: Vec::new(),
            sky_color,
        }
    }

    /// Add a sphere, returning its index.
    pub fn add_sphere(&mut self, sphere: Sphere) -> usize {
        self.spheres.push(sphere);
        self.spheres.len() - 1
    }

    /// Remove the sphere at `index`. Indices above it shift down.
    pub fn remove_sphere(&mut self, index: usize) -> Result<Sphere, SceneError> {
        if index >= self.spheres.len() {
            return Err(SceneError::NoSuchSphere(index));
        }
        Ok(self.spheres.remove(index))
    }

    /// Mutable access to a sphere for between-pass edits.
    pub fn sphere_mut(&mut self, index: usize) -> Result<&mut Sphere, SceneError> {
        self.spheres
            .get_mut(index)
            .ok_or(SceneError::NoSuchSphere(index))
    }

    /// Add a material, returning its index.
    pub fn add_material(&mut self, material: Material) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    /// Remove the material at `index`. Indices above it shift down;
    /// spheres still referencing it will fail the next `validate`.
    pub fn remove_material(&mut self, index: usize) -> Result<Material, SceneError> {
        if index >= self.materials.len() {
            return Err(SceneError::NoSuchMaterial(index));
        }
        Ok(self.materials.remove(index))
    }

    /// Mutable access to a material for between-pass edits.
    pub fn material_mut(&mut self, index: usize) -> Result<&mut Material, SceneError> {
        self.materials
            .get_mut(index)
            .ok_or(SceneError::NoSuchMaterial(index))
    }

    /// All spheres, in index order.
    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    /// All materials, in index order.
    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// Check every primitive's material reference.
    ///
    /// Runs before a render pass so the per-bounce material lookup can
    /// index the arena without bounds failures.
    pub fn validate(&self) -> Result<(), SceneError> {
        for (i, sphere) in self.spheres.iter().enumerate() {
            if sphere.material_index >= self.materials.len() {
                log::error!(
                    "scene validation failed: sphere {} references missing material {}",
                    i,
                    sphere.material_index
                );
                return Err(SceneError::DanglingMaterial {
                    sphere: i,
                    material: sphere.material_index,
                    material_count: self.materials.len(),
                });
            }
        }
        Ok(())
    }
}
