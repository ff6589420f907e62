//! Progressive path-tracing renderer.
//!
//! One `render` call is one full-viewport pass: every pixel traces
//! `sample_count` paths, the resulting radiance is added into a persistent
//! accumulation buffer, and the displayed pixel is the running average
//! over `frame_index` passes, clamped and gamma-encoded to RGBA8. Any
//! camera move, scene edit, or resize resets the accumulation so stale
//! radiance never bleeds into the new view.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use ember_core::{Scene, SceneError};
use ember_math::{Interval, Ray, Vec3, Vec4};
use rayon::prelude::*;
use thiserror::Error;

use crate::{
    bucket::{generate_buckets, Bucket, BucketResult, DEFAULT_BUCKET_SIZE},
    camera::Camera,
    hit::{nearest_hit, resolve_hit},
    sampler::{entropy_seed, Sampler},
    scatter::scatter,
};

/// Offset applied to re-cast ray origins, along the scattered direction,
/// so a bounce does not immediately re-hit the surface it left.
const ORIGIN_EPSILON: f32 = 1e-4;

/// Minimum ray parameter for hit queries, guarding against
/// self-intersection at the origin surface.
const T_MIN: f32 = 0.001;

/// Errors from renderer configuration or a render pass.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("bounce limit must be at least 1, got {0}")]
    InvalidBounceLimit(u32),

    #[error("sample count must be at least 1, got {0}")]
    InvalidSampleCount(u32),

    #[error("aperture radius must be non-negative, got {0}")]
    InvalidApertureRadius(f32),

    #[error("focus distance must be positive, got {0}")]
    InvalidFocusDistance(f32),

    #[error("camera viewport is {camera_width}x{camera_height} but the renderer is {width}x{height}")]
    ViewportMismatch {
        width: u32,
        height: u32,
        camera_width: u32,
        camera_height: u32,
    },

    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Per-session render configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    /// Maximum path length in surface interactions
    pub bounce_limit: u32,
    /// Paths traced per pixel per pass
    pub sample_count: u32,
    /// Whether passes accumulate into a running average
    pub accumulate: bool,
    /// Whether primary rays get a sub-pixel jitter
    pub antialiasing: bool,
    /// Thin-lens aperture radius; 0 disables depth of field
    pub aperture_radius: f32,
    /// Distance to the plane of perfect focus
    pub focus_distance: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            bounce_limit: 5,
            sample_count: 1,
            accumulate: true,
            antialiasing: false,
            aperture_radius: 0.0,
            focus_distance: 10.0,
        }
    }
}

impl RenderSettings {
    /// Check every parameter range.
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.bounce_limit < 1 {
            return Err(RenderError::InvalidBounceLimit(self.bounce_limit));
        }
        if self.sample_count < 1 {
            return Err(RenderError::InvalidSampleCount(self.sample_count));
        }
        if !self.aperture_radius.is_finite() || self.aperture_radius < 0.0 {
            return Err(RenderError::InvalidApertureRadius(self.aperture_radius));
        }
        if !self.focus_distance.is_finite() || self.focus_distance <= 0.0 {
            return Err(RenderError::InvalidFocusDistance(self.focus_distance));
        }
        Ok(())
    }
}

/// Progressive renderer owning the accumulation and pixel buffers.
pub struct Renderer {
    settings: RenderSettings,

    width: u32,
    height: u32,

    // Per-pixel radiance sums, averaged by frame_index for display
    accumulation: Vec<Vec4>,
    // Packed RGBA8, gamma-encoded, ready for texture upload
    pixels: Vec<u32>,
    buckets: Vec<Bucket>,

    frame_index: u32,
    seed: u64,
    cancel: AtomicBool,
}

impl Renderer {
    /// Create a renderer with default settings and an entropy seed.
    pub fn new() -> Self {
        Self::with_seed(entropy_seed())
    }

    /// Create a renderer with a fixed base seed for reproducible runs.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            settings: RenderSettings::default(),
            width: 0,
            height: 0,
            accumulation: Vec::new(),
            pixels: Vec::new(),
            buckets: Vec::new(),
            frame_index: 1,
            seed,
            cancel: AtomicBool::new(false),
        }
    }

    /// Replace the render settings. Resets accumulation, since the new
    /// settings change what a pass means.
    pub fn configure(&mut self, settings: RenderSettings) -> Result<(), RenderError> {
        settings.validate()?;
        if settings != self.settings {
            self.settings = settings;
            self.reset_frame_index();
        }
        Ok(())
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Resize the viewport. Idempotent for unchanged dimensions; otherwise
    /// reallocates both buffers and restarts accumulation.
    pub fn on_resize(&mut self, width: u32, height: u32) {
        if width == self.width && height == self.height {
            return;
        }

        log::info!("renderer resize {}x{} -> {}x{}", self.width, self.height, width, height);

        self.width = width;
        self.height = height;

        let pixel_count = (width * height) as usize;
        self.accumulation = vec![Vec4::ZERO; pixel_count];
        self.pixels = vec![0; pixel_count];
        self.buckets = generate_buckets(width, height, DEFAULT_BUCKET_SIZE);

        self.reset_frame_index();
    }

    /// Restart progressive accumulation at frame 1.
    pub fn reset_frame_index(&mut self) {
        self.frame_index = 1;
    }

    /// The camera moved; accumulated radiance is stale.
    pub fn notify_camera_changed(&mut self) {
        self.reset_frame_index();
    }

    /// The scene was edited; accumulated radiance is stale.
    pub fn notify_scene_changed(&mut self) {
        self.reset_frame_index();
    }

    /// Ask an in-flight pass to stop at the next bucket boundary. A
    /// cancelled pass leaves the previous frame's buffers untouched.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn frame_index(&self) -> u32 {
        self.frame_index
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The latest accumulated, gamma-encoded frame as RGBA8 bytes.
    pub fn pixel_data(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Render one full pass over the viewport.
    ///
    /// The scene and camera are read-only for the whole pass; mutations
    /// are only safe between passes and must go through the notify hooks.
    pub fn render(&mut self, scene: &Scene, camera: &Camera) -> Result<(), RenderError> {
        scene.validate()?;

        if self.width == 0 || self.height == 0 {
            return Ok(());
        }
        if camera.viewport_width() != self.width || camera.viewport_height() != self.height {
            return Err(RenderError::ViewportMismatch {
                width: self.width,
                height: self.height,
                camera_width: camera.viewport_width(),
                camera_height: camera.viewport_height(),
            });
        }

        let start = Instant::now();

        if self.frame_index == 1 {
            self.accumulation.fill(Vec4::ZERO);
        }

        let settings = self.settings;
        let frame_index = self.frame_index;
        let seed = self.seed;
        let cancel = &self.cancel;

        // Each bucket is an independent worker with its own sampler
        // stream; results only merge after the whole pass finishes.
        let results: Vec<Option<BucketResult>> = self
            .buckets
            .par_iter()
            .map(|bucket| {
                if cancel.load(Ordering::Relaxed) {
                    return None;
                }

                let stream = ((frame_index as u64) << 32) | bucket.index as u64;
                let mut sampler = Sampler::new(seed, stream);

                let mut radiance = Vec::with_capacity(bucket.pixel_count() as usize);
                for local_y in 0..bucket.height {
                    for local_x in 0..bucket.width {
                        let x = bucket.x + local_x;
                        let y = bucket.y + local_y;
                        radiance.push(per_pixel(scene, camera, x, y, &settings, &mut sampler));
                    }
                }

                Some(BucketResult::new(*bucket, radiance))
            })
            .collect();

        if results.iter().any(Option::is_none) {
            self.cancel.store(false, Ordering::Relaxed);
            log::debug!("render pass cancelled at frame {}", self.frame_index);
            return Ok(());
        }

        for result in results.into_iter().flatten() {
            self.merge_bucket(&result);
        }

        if self.settings.accumulate {
            self.frame_index += 1;
        } else {
            self.frame_index = 1;
        }

        log::debug!(
            "pass complete: frame {} in {:.2} ms",
            frame_index,
            start.elapsed().as_secs_f64() * 1000.0
        );

        Ok(())
    }

    /// Fold one bucket's radiance into the accumulation buffer and
    /// refresh the displayed pixels it covers.
    fn merge_bucket(&mut self, result: &BucketResult) {
        let bucket = &result.bucket;
        let mut i = 0;

        for local_y in 0..bucket.height {
            for local_x in 0..bucket.width {
                let x = bucket.x + local_x;
                let y = bucket.y + local_y;
                let index = (x + y * self.width) as usize;

                self.accumulation[index] += result.radiance[i].extend(1.0);

                let averaged = self.accumulation[index] / self.frame_index as f32;
                self.pixels[index] = pack_rgba(averaged.clamp(Vec4::ZERO, Vec4::ONE));

                i += 1;
            }
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Trace all samples for one pixel and average them.
fn per_pixel(
    scene: &Scene,
    camera: &Camera,
    x: u32,
    y: u32,
    settings: &RenderSettings,
    sampler: &mut Sampler,
) -> Vec3 {
    let mut color = Vec3::ZERO;

    for _ in 0..settings.sample_count {
        let ray = primary_ray(camera, x, y, settings, sampler);
        color += trace_path(scene, ray, settings.bounce_limit, sampler);
    }

    color / settings.sample_count as f32
}

/// Build the primary ray for a pixel, with optional sub-pixel jitter and
/// thin-lens depth of field.
fn primary_ray(
    camera: &Camera,
    x: u32,
    y: u32,
    settings: &RenderSettings,
    sampler: &mut Sampler,
) -> Ray {
    let mut origin = camera.position();
    let mut direction = if settings.antialiasing {
        camera.jittered_ray_direction(x, y, sampler)
    } else {
        camera.ray_direction(x, y)
    };

    if settings.aperture_radius > 0.0 {
        // Jitter the origin within the lens disk and re-aim at the focal
        // point so the focus plane stays sharp
        let focal_point = origin + direction * settings.focus_distance;
        let disk = sampler.in_unit_disk() * settings.aperture_radius;
        origin += camera.right() * disk.x + camera.up() * disk.y;
        direction = (focal_point - origin).normalize();
    }

    Ray::new(origin, direction)
}

/// Walk one path through the scene, collecting radiance.
fn trace_path(scene: &Scene, mut ray: Ray, bounce_limit: u32, sampler: &mut Sampler) -> Vec3 {
    let mut light = Vec3::ZERO;
    let mut contribution = Vec3::ONE;

    for _ in 0..bounce_limit {
        let Some(raw) = nearest_hit(scene, &ray, Interval::new(T_MIN, f32::INFINITY)) else {
            // Ray escaped to the sky
            light += scene.sky_color * contribution;
            break;
        };

        let hit = resolve_hit(scene, &ray, raw);
        let material = &scene.materials()[hit.material_index];

        light += material.emitted() * contribution;

        match scatter(material, &ray, &hit, sampler) {
            Some(s) => {
                contribution *= s.attenuation;
                ray = Ray::new(hit.position + s.direction * ORIGIN_EPSILON, s.direction);
            }
            None => {
                // Absorbed: the path carries no further light
                break;
            }
        }
    }

    light
}

/// Gamma-encode (1/2.2) and pack a linear color into RGBA8, red in the
/// low byte.
fn pack_rgba(color: Vec4) -> u32 {
    let encoded = color.powf(1.0 / 2.2);

    let r = (encoded.x * 255.0) as u32;
    let g = (encoded.y * 255.0) as u32;
    let b = (encoded.z * 255.0) as u32;
    let a = (encoded.w * 255.0) as u32;

    (a << 24) | (b << 16) | (g << 8) | r
}
