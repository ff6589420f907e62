//! Ray-scene intersection queries.
//!
//! Hit resolution is split in two phases, mirroring a raygen/closest-hit
//! pipeline: `nearest_hit` finds only the winning primitive and its ray
//! parameter, and `resolve_hit` computes the surface data for that single
//! winner. Both are pure functions over an immutable scene, so a render
//! pass can run them from any number of workers.

use ember_core::{Scene, Sphere};
use ember_math::{Interval, Ray, Vec3};

/// The winning candidate from a nearest-hit query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawHit {
    /// Ray parameter of the intersection
    pub t: f32,
    /// Index of the sphere that was hit
    pub sphere_index: usize,
}

/// Fully resolved surface data at an intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRecord {
    /// Ray parameter of the intersection
    pub t: f32,
    /// World-space intersection point
    pub position: Vec3,
    /// Unit surface normal, oriented against the incoming ray
    pub normal: Vec3,
    /// Whether the ray hit the outside of the surface
    pub front_face: bool,
    /// Index of the sphere that was hit
    pub sphere_index: usize,
    /// Index into the scene's material table
    pub material_index: usize,
}

/// Intersect a ray with a single sphere.
///
/// Solves |O + tD - C|^2 = r^2. The smaller quadratic root is preferred;
/// the larger one is only taken when the smaller falls outside the
/// interval (ray origin inside the sphere).
fn sphere_hit(sphere: &Sphere, ray: &Ray, ray_t: Interval) -> Option<f32> {
    let oc = sphere.center - ray.origin;
    let a = ray.direction.length_squared();
    let h = ray.direction.dot(oc);
    let c = oc.length_squared() - sphere.radius * sphere.radius;

    let discriminant = h * h - a * c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrtd = discriminant.sqrt();

    // Find the nearest root in the acceptable range
    let mut root = (h - sqrtd) / a;
    if !ray_t.surrounds(root) {
        root = (h + sqrtd) / a;
        if !ray_t.surrounds(root) {
            return None;
        }
    }

    Some(root)
}

/// Find the closest intersection along a ray, if any.
///
/// Iterates the flat sphere arena, shrinking the search interval to the
/// closest hit found so far.
pub fn nearest_hit(scene: &Scene, ray: &Ray, ray_t: Interval) -> Option<RawHit> {
    let mut closest: Option<RawHit> = None;
    let mut closest_so_far = ray_t.max;

    for (sphere_index, sphere) in scene.spheres().iter().enumerate() {
        if let Some(t) = sphere_hit(sphere, ray, ray_t.with_max(closest_so_far)) {
            closest_so_far = t;
            closest = Some(RawHit { t, sphere_index });
        }
    }

    closest
}

/// Resolve surface data for the winner of a `nearest_hit` query.
pub fn resolve_hit(scene: &Scene, ray: &Ray, raw: RawHit) -> HitRecord {
    let sphere = &scene.spheres()[raw.sphere_index];

    let position = ray.at(raw.t);
    let outward_normal = (position - sphere.center) / sphere.radius;

    // Normal always points against the ray
    let front_face = ray.direction.dot(outward_normal) < 0.0;
    let normal = if front_face {
        outward_normal
    } else {
        -outward_normal
    };

    HitRecord {
        t: raw.t,
        position,
        normal,
        front_face,
        sphere_index: raw.sphere_index,
        material_index: sphere.material_index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::Material;

    fn single_sphere_scene(center: Vec3, radius: f32) -> Scene {
        let mut scene = Scene::new(Vec3::new(0.6, 0.7, 0.9));
        let grey = scene.add_material(Material::diffuse(Vec3::splat(0.5), 1.0).unwrap());
        scene.add_sphere(Sphere::new(center, radius, grey).unwrap());
        scene
    }

    #[test]
    fn test_hit_distance_toward_center() {
        // Aimed at the sphere center from outside: t = distance - radius
        let center = Vec3::new(0.0, 0.0, -3.0);
        let scene = single_sphere_scene(center, 0.5);

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let hit = nearest_hit(&scene, &ray, Interval::new(0.001, f32::INFINITY)).unwrap();

        let expected = center.length() - 0.5;
        assert!((hit.t - expected).abs() < 1e-5);
    }

    #[test]
    fn test_miss_when_pointing_away() {
        let scene = single_sphere_scene(Vec3::new(0.0, 0.0, -3.0), 0.5);

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        assert!(nearest_hit(&scene, &ray, Interval::new(0.001, f32::INFINITY)).is_none());

        let sideways = Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        assert!(nearest_hit(&scene, &sideways, Interval::new(0.001, f32::INFINITY)).is_none());
    }

    #[test]
    fn test_nearest_of_two_spheres_wins() {
        let mut scene = single_sphere_scene(Vec3::new(0.0, 0.0, -5.0), 0.5);
        scene.add_sphere(Sphere::new(Vec3::new(0.0, 0.0, -2.0), 0.5, 0).unwrap());

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let hit = nearest_hit(&scene, &ray, Interval::new(0.001, f32::INFINITY)).unwrap();

        assert_eq!(hit.sphere_index, 1);
        assert!((hit.t - 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_resolve_hit_front_face_normal() {
        let scene = single_sphere_scene(Vec3::new(0.0, 0.0, -1.0), 0.5);

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let raw = nearest_hit(&scene, &ray, Interval::new(0.001, f32::INFINITY)).unwrap();
        let hit = resolve_hit(&scene, &ray, raw);

        assert!((hit.normal.length() - 1.0).abs() < 1e-5);
        assert!(hit.front_face);
        // Facing the camera, so the normal points back along +Z
        assert!(hit.normal.z > 0.99);
        assert_eq!(hit.material_index, 0);
    }

    #[test]
    fn test_resolve_hit_inside_sphere_flips_normal() {
        // Ray origin at the sphere center: every hit is a back face
        let scene = single_sphere_scene(Vec3::new(0.0, 0.0, -1.0), 0.5);

        let ray = Ray::new(Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, -1.0));
        let raw = nearest_hit(&scene, &ray, Interval::new(0.001, f32::INFINITY)).unwrap();
        let hit = resolve_hit(&scene, &ray, raw);

        assert!(!hit.front_face);
        assert!((hit.normal.length() - 1.0).abs() < 1e-5);
        // Flipped inward, against the ray
        assert!(hit.normal.dot(ray.direction) < 0.0);
    }

    #[test]
    fn test_t_min_skips_surface_at_origin() {
        // Origin sitting exactly on the surface: the near root is ~0 and
        // must be rejected by the interval minimum
        let scene = single_sphere_scene(Vec3::new(0.0, 0.0, -1.0), 0.5);

        let ray = Ray::new(Vec3::new(0.0, 0.0, -0.5), Vec3::new(0.0, 0.0, -1.0));
        let hit = nearest_hit(&scene, &ray, Interval::new(0.001, f32::INFINITY)).unwrap();

        // Should find the far side of the sphere, not the origin surface
        assert!((hit.t - 1.0).abs() < 1e-4);
    }
}
