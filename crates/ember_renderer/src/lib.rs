//! Ember Renderer - progressive CPU path tracing.
//!
//! A Monte Carlo path tracer that refines an image over successive
//! frames: every pass adds one frame of per-pixel radiance into an
//! accumulation buffer and the display shows the running average. The
//! windowing layer, property UI, and texture upload live outside this
//! crate; they drive it through `Renderer::{configure, on_resize,
//! notify_camera_changed, notify_scene_changed, render, pixel_data}` and
//! `Camera::{on_resize, on_update}`.

mod bucket;
mod camera;
mod hit;
mod renderer;
mod sampler;
mod scatter;

pub use bucket::{generate_buckets, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use camera::{Camera, CameraInput};
pub use hit::{nearest_hit, resolve_hit, HitRecord, RawHit};
pub use renderer::{RenderError, RenderSettings, Renderer};
pub use sampler::{entropy_seed, Sampler};
pub use scatter::{scatter, schlick_reflectance, Scatter};

/// Re-export common math and scene types
pub use ember_core::{Material, Scene, SceneError, Sphere};
pub use ember_math::{Interval, Ray, Vec3};
