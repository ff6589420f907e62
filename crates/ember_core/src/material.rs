//! Material definitions for surface scattering.
//!
//! The material set is closed and known at design time, so it is a plain
//! enum dispatched by pattern matching rather than a trait object. The
//! scattering math itself lives in the renderer crate; this module only
//! holds the validated parameters.

use ember_math::Vec3;

use crate::scene::SceneError;

/// A surface material.
///
/// Cross-referenced from primitives by index into the scene's material
/// table. Constructors validate parameter ranges so the renderer never
/// sees an out-of-range material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Material {
    /// Lambertian-style diffuse surface.
    Diffuse {
        /// Base reflectance color, components in [0, 1]
        albedo: Vec3,
        /// Scatter-direction spread, 0 = mirror-like, 1 = fully diffuse
        roughness: f32,
    },
    /// Specular surface with fuzzy reflection.
    Metal {
        /// Base reflectance color, components in [0, 1]
        albedo: Vec3,
        /// Reflection perturbation, 0 = perfect mirror, 1 = very rough
        fuzz: f32,
    },
    /// Clear refractive surface (glass, water).
    Dielectric {
        /// Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
        ior: f32,
    },
    /// Light-emitting surface. Absorbs incoming paths.
    Emissive {
        /// Emission color, components in [0, 1]
        color: Vec3,
        /// Emission intensity multiplier
        power: f32,
    },
}

impl Material {
    /// Create a diffuse material.
    pub fn diffuse(albedo: Vec3, roughness: f32) -> Result<Self, SceneError> {
        validate_color("albedo", albedo)?;
        validate_unit_range("roughness", roughness)?;
        Ok(Self::Diffuse { albedo, roughness })
    }

    /// Create a metal material.
    pub fn metal(albedo: Vec3, fuzz: f32) -> Result<Self, SceneError> {
        validate_color("albedo", albedo)?;
        validate_unit_range("fuzz", fuzz)?;
        Ok(Self::Metal { albedo, fuzz })
    }

    /// Create a dielectric material.
    pub fn dielectric(ior: f32) -> Result<Self, SceneError> {
        if !ior.is_finite() || ior <= 0.0 {
            return Err(SceneError::InvalidIor(ior));
        }
        Ok(Self::Dielectric { ior })
    }

    /// Create an emissive material.
    pub fn emissive(color: Vec3, power: f32) -> Result<Self, SceneError> {
        validate_color("color", color)?;
        if !power.is_finite() || power < 0.0 {
            return Err(SceneError::InvalidEmissionPower(power));
        }
        Ok(Self::Emissive { color, power })
    }

    /// Light emitted by this material, black for non-emitters.
    pub fn emitted(&self) -> Vec3 {
        match self {
            Self::Emissive { color, power } => *color * *power,
            _ => Vec3::ZERO,
        }
    }
}

fn validate_color(field: &'static str, color: Vec3) -> Result<(), SceneError> {
    let ok = color.is_finite() && color.min_element() >= 0.0 && color.max_element() <= 1.0;
    if ok {
        Ok(())
    } else {
        Err(SceneError::InvalidColor { field, color })
    }
}

fn validate_unit_range(field: &'static str, value: f32) -> Result<(), SceneError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SceneError::OutOfUnitRange { field, value })
    }
}
