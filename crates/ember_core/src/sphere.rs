//! Sphere primitive.

use ember_math::Vec3;

use crate::scene::SceneError;

/// A sphere primitive.
///
/// References its material by index into the owning scene's material
/// table. Immutable during a render pass; edits between passes go through
/// the scene so the accumulation reset can be signaled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
    pub material_index: usize,
}

impl Sphere {
    /// Create a new sphere. The radius must be positive.
    pub fn new(center: Vec3, radius: f32, material_index: usize) -> Result<Self, SceneError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(SceneError::InvalidRadius(radius));
        }
        Ok(Self {
            center,
            radius,
            material_index,
        })
    }
}
