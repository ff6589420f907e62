//! Ember Core - scene model for the Ember path tracer.
//!
//! This crate provides:
//!
//! - **Materials**: a closed set of scattering behaviors (`Material`)
//! - **Primitives**: `Sphere`, addressed by stable index
//! - **Scene**: index-addressed arenas of primitives and materials plus
//!   a sky color, with construction-time validation
//!
//! # Example
//!
//! ```
//! use ember_core::{Material, Scene, Sphere};
//! use ember_math::Vec3;
//!
//! let mut scene = Scene::new(Vec3::new(0.6, 0.7, 0.9));
//! let grey = scene.add_material(
//!     Material::diffuse(Vec3::splat(0.5), 1.0).unwrap(),
//! );
//! scene.add_sphere(Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, grey).unwrap());
//! assert!(scene.validate().is_ok());
//! ```

pub mod material;
pub mod scene;
pub mod sphere;

// Re-export commonly used types
pub use material::Material;
pub use scene::{Scene, SceneError};
pub use sphere::Sphere;
