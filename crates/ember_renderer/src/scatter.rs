//! Material scattering.
//!
//! Maps an incoming ray and a resolved hit to an outgoing direction and
//! attenuation, or signals absorption. Dispatch is a plain match over the
//! closed material set.

use ember_core::Material;
use ember_math::{Ray, Vec3};

use crate::{hit::HitRecord, sampler::Sampler};

/// Outcome of a successful scatter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scatter {
    /// Per-bounce multiplicative color factor
    pub attenuation: Vec3,
    /// Outgoing ray direction (not necessarily normalized)
    pub direction: Vec3,
}

/// Scatter an incoming ray off a surface.
///
/// Returns `None` when the path is absorbed: emissive surfaces terminate
/// paths, and a fuzzy metal reflection that would re-enter the surface is
/// treated as absorbed.
pub fn scatter(
    material: &Material,
    ray_in: &Ray,
    hit: &HitRecord,
    sampler: &mut Sampler,
) -> Option<Scatter> {
    match *material {
        Material::Diffuse { albedo, roughness } => {
            let mut direction = hit.normal + roughness * sampler.unit_vector();

            // Catch degenerate scatter direction
            if direction.abs().max_element() < 1e-8 {
                direction = hit.normal;
            }

            Some(Scatter {
                attenuation: albedo,
                direction: direction.normalize(),
            })
        }
        Material::Metal { albedo, fuzz } => {
            let reflected = reflect(ray_in.direction.normalize(), hit.normal);
            let direction = reflected + fuzz * sampler.in_unit_sphere();

            // Only scatter into the hemisphere above the surface
            if direction.dot(hit.normal) > 0.0 {
                Some(Scatter {
                    attenuation: albedo,
                    direction,
                })
            } else {
                None
            }
        }
        Material::Dielectric { ior } => {
            let refraction_ratio = if hit.front_face { 1.0 / ior } else { ior };

            let unit_direction = ray_in.direction.normalize();
            let cos_theta = (-unit_direction).dot(hit.normal).min(1.0);
            let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

            // Check for total internal reflection
            let cannot_refract = refraction_ratio * sin_theta > 1.0;

            let direction = if cannot_refract
                || schlick_reflectance(cos_theta, refraction_ratio) > sampler.next_f32()
            {
                reflect(unit_direction, hit.normal)
            } else {
                refract(unit_direction, hit.normal, refraction_ratio)
            };

            Some(Scatter {
                attenuation: Vec3::ONE,
                direction,
            })
        }
        Material::Emissive { .. } => None,
    }
}

/// Schlick's approximation for Fresnel reflectance.
#[inline]
pub fn schlick_reflectance(cos_theta: f32, ior: f32) -> f32 {
    let r0 = ((1.0 - ior) / (1.0 + ior)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cos_theta).powi(5)
}

/// Reflect a vector about a normal.
#[inline]
fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a vector through a surface via Snell's law.
#[inline]
fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}
