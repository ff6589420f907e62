//! Interactive camera and ray generation.
//!
//! The camera owns a view/projection matrix pair plus a precomputed table
//! of world-space ray directions, one per viewport pixel. The table is
//! rebuilt only when the pose, lens, or viewport changes, so steady-state
//! ray generation is a single array lookup. The windowing layer stays
//! external: it pushes an input snapshot into `on_update` every frame and
//! resets the renderer's accumulation when that returns true.

use ember_math::{Mat4, Quat, Vec2, Vec3, Vec4, Vec4Swizzles};

use crate::sampler::Sampler;

/// Units per second of WASD translation.
const MOVE_SPEED: f32 = 5.0;
/// Radians of rotation per unit of scaled mouse delta.
const ROTATION_SPEED: f32 = 0.3;
/// Scale applied to raw pixel mouse deltas.
const MOUSE_SENSITIVITY: f32 = 0.002;

/// One frame's worth of navigation input, captured by the external
/// windowing layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct CameraInput {
    pub move_forward: bool,
    pub move_back: bool,
    pub move_left: bool,
    pub move_right: bool,
    pub move_up: bool,
    pub move_down: bool,
    /// Whether the look modifier (right mouse button) is held.
    /// Navigation only applies while it is.
    pub look_active: bool,
    /// Mouse movement since the previous frame, in pixels.
    pub mouse_delta: Vec2,
}

/// Perspective camera with a cached per-pixel ray-direction table.
#[derive(Debug, Clone)]
pub struct Camera {
    vertical_fov: f32,
    near_clip: f32,
    far_clip: f32,

    position: Vec3,
    forward: Vec3,

    projection: Mat4,
    inverse_projection: Mat4,
    view: Mat4,
    inverse_view: Mat4,

    // Cached world-space ray directions, row-major
    ray_directions: Vec<Vec3>,

    viewport_width: u32,
    viewport_height: u32,
}

impl Camera {
    /// Create a camera looking down -Z. Call `on_resize` before asking
    /// for ray directions.
    pub fn new(vertical_fov: f32, near_clip: f32, far_clip: f32, position: Vec3) -> Self {
        let mut camera = Self {
            vertical_fov,
            near_clip,
            far_clip,
            position,
            forward: Vec3::NEG_Z,
            projection: Mat4::IDENTITY,
            inverse_projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            inverse_view: Mat4::IDENTITY,
            ray_directions: Vec::new(),
            viewport_width: 0,
            viewport_height: 0,
        };
        camera.recalculate_view();
        camera
    }

    /// Update the viewport size. No-op when unchanged; otherwise rebuilds
    /// the projection and the full ray table (O(width * height)).
    pub fn on_resize(&mut self, width: u32, height: u32) {
        if width == self.viewport_width && height == self.viewport_height {
            return;
        }

        self.viewport_width = width;
        self.viewport_height = height;

        if width == 0 || height == 0 {
            self.ray_directions.clear();
            return;
        }

        self.recalculate_projection();
        self.recalculate_ray_directions();
    }

    /// Apply one frame of navigation input.
    ///
    /// Returns whether the pose changed, in which case the caller must
    /// reset the renderer's accumulation.
    pub fn on_update(&mut self, dt: f32, input: &CameraInput) -> bool {
        if !input.look_active {
            return false;
        }

        let mut moved = false;

        let up_direction = Vec3::Y;
        let right_direction = self.forward.cross(up_direction).normalize_or_zero();

        // Movement
        let step = MOVE_SPEED * dt;
        if input.move_forward {
            self.position += self.forward * step;
            moved = true;
        } else if input.move_back {
            self.position -= self.forward * step;
            moved = true;
        }
        if input.move_left {
            self.position -= right_direction * step;
            moved = true;
        } else if input.move_right {
            self.position += right_direction * step;
            moved = true;
        }
        if input.move_down {
            self.position -= up_direction * step;
            moved = true;
        } else if input.move_up {
            self.position += up_direction * step;
            moved = true;
        }

        // Rotation: pitch about the local right axis, yaw about world up
        let delta = input.mouse_delta * MOUSE_SENSITIVITY;
        if delta != Vec2::ZERO && right_direction != Vec3::ZERO {
            let pitch_delta = delta.y * ROTATION_SPEED;
            let yaw_delta = delta.x * ROTATION_SPEED;

            let q = (Quat::from_axis_angle(right_direction, -pitch_delta)
                * Quat::from_axis_angle(Vec3::Y, -yaw_delta))
            .normalize();
            let rotated = q * self.forward;

            debug_assert!(
                rotated.is_finite() && rotated.length_squared() > 1e-12,
                "degenerate camera direction after rotation"
            );
            if rotated.is_finite() && rotated.length_squared() > 1e-12 {
                self.forward = rotated.normalize();
                moved = true;
            }
        }

        if moved {
            self.recalculate_view();
            self.recalculate_ray_directions();
        }

        moved
    }

    /// Precomputed world-space ray direction for pixel (x, y).
    #[inline]
    pub fn ray_direction(&self, x: u32, y: u32) -> Vec3 {
        self.ray_directions[(x + y * self.viewport_width) as usize]
    }

    /// Ray direction for pixel (x, y) with a sub-pixel jitter, for
    /// antialiasing. The offset magnitude stays within one pixel.
    pub fn jittered_ray_direction(&self, x: u32, y: u32, sampler: &mut Sampler) -> Vec3 {
        let pixel_size = 1.0 / self.viewport_width.min(self.viewport_height) as f32;
        let coord = Vec2::new(
            x as f32 / self.viewport_width as f32 + sampler.next_f32() * pixel_size,
            y as f32 / self.viewport_height as f32 + sampler.next_f32() * pixel_size,
        );
        self.direction_for_coord(coord)
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    /// Camera-space right axis in world space.
    pub fn right(&self) -> Vec3 {
        self.forward.cross(Vec3::Y).normalize_or_zero()
    }

    /// Camera-space up axis in world space.
    pub fn up(&self) -> Vec3 {
        self.right().cross(self.forward)
    }

    pub fn viewport_width(&self) -> u32 {
        self.viewport_width
    }

    pub fn viewport_height(&self) -> u32 {
        self.viewport_height
    }

    /// Map a [0,1]^2 viewport coordinate through the inverse projection
    /// and view matrices to a world-space direction.
    fn direction_for_coord(&self, coord: Vec2) -> Vec3 {
        let ndc = coord * 2.0 - 1.0;

        let target = self.inverse_projection * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
        let view_direction = (target.xyz() / target.w).normalize();
        (self.inverse_view * view_direction.extend(0.0)).xyz()
    }

    fn recalculate_projection(&mut self) {
        let aspect = self.viewport_width as f32 / self.viewport_height as f32;
        self.projection = Mat4::perspective_rh(
            self.vertical_fov.to_radians(),
            aspect,
            self.near_clip,
            self.far_clip,
        );
        self.inverse_projection = self.projection.inverse();
    }

    fn recalculate_view(&mut self) {
        self.view = Mat4::look_at_rh(self.position, self.position + self.forward, Vec3::Y);
        self.inverse_view = self.view.inverse();
    }

    fn recalculate_ray_directions(&mut self) {
        if self.viewport_width == 0 || self.viewport_height == 0 {
            return;
        }

        self.ray_directions
            .resize((self.viewport_width * self.viewport_height) as usize, Vec3::ZERO);

        for y in 0..self.viewport_height {
            for x in 0..self.viewport_width {
                let coord = Vec2::new(
                    x as f32 / self.viewport_width as f32,
                    y as f32 / self.viewport_height as f32,
                );
                self.ray_directions[(x + y * self.viewport_width) as usize] =
                    self.direction_for_coord(coord);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_camera() -> Camera {
        let mut camera = Camera::new(45.0, 0.1, 100.0, Vec3::ZERO);
        camera.on_resize(64, 64);
        camera
    }

    #[test]
    fn test_resize_builds_ray_table() {
        let camera = test_camera();
        assert_eq!(camera.ray_directions.len(), 64 * 64);

        // All directions unit length and pointing forward
        for dir in &camera.ray_directions {
            assert!((dir.length() - 1.0).abs() < 1e-4);
            assert!(dir.z < 0.0);
        }
    }

    #[test]
    fn test_resize_same_dims_is_noop() {
        let mut camera = test_camera();
        let before = camera.ray_directions.clone();
        camera.on_resize(64, 64);
        assert_eq!(camera.ray_directions, before);
    }

    #[test]
    fn test_resize_zero_is_accepted() {
        let mut camera = test_camera();
        camera.on_resize(0, 0);
        assert!(camera.ray_directions.is_empty());
    }

    #[test]
    fn test_center_ray_points_along_forward() {
        let camera = test_camera();
        let dir = camera.ray_direction(32, 32);
        // Center of a symmetric viewport looks straight down -Z
        assert!(dir.dot(Vec3::NEG_Z) > 0.99);
    }

    #[test]
    fn test_jittered_direction_stays_near_pixel() {
        let camera = test_camera();
        let mut sampler = Sampler::new(42, 0);

        let base = camera.ray_direction(32, 32);
        for _ in 0..50 {
            let jittered = camera.jittered_ray_direction(32, 32, &mut sampler);
            assert!((jittered.length() - 1.0).abs() < 1e-4);
            // Within a couple of pixels of the unjittered direction
            assert!(base.dot(jittered) > 0.999);
        }
    }

    #[test]
    fn test_update_requires_look_modifier() {
        let mut camera = test_camera();
        let input = CameraInput {
            move_forward: true,
            look_active: false,
            ..Default::default()
        };
        assert!(!camera.on_update(0.016, &input));
        assert_eq!(camera.position(), Vec3::ZERO);
    }

    #[test]
    fn test_update_translates_along_forward() {
        let mut camera = test_camera();
        let input = CameraInput {
            move_forward: true,
            look_active: true,
            ..Default::default()
        };
        assert!(camera.on_update(0.5, &input));
        // Half a second forward at MOVE_SPEED
        assert!((camera.position() - Vec3::new(0.0, 0.0, -2.5)).length() < 1e-5);
    }

    #[test]
    fn test_update_mouse_look_rotates_forward() {
        let mut camera = test_camera();
        let input = CameraInput {
            look_active: true,
            mouse_delta: Vec2::new(120.0, 0.0),
            ..Default::default()
        };
        assert!(camera.on_update(0.016, &input));

        let forward = camera.forward();
        assert!((forward.length() - 1.0).abs() < 1e-5);
        assert!(forward != Vec3::NEG_Z);
        // Pure yaw keeps the forward vector level
        assert!(forward.y.abs() < 1e-5);
    }
}
