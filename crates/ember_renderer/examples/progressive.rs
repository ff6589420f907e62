//! Progressive render example.
//!
//! Builds the classic three-sphere editor scene, accumulates a number of
//! passes, and saves the result to PNG. Run with RUST_LOG=debug to see
//! per-pass timing.

use anyhow::Result;
use ember_renderer::{
    Camera, Material, RenderSettings, Renderer, Scene, Sphere, Vec3,
};

const WIDTH: u32 = 800;
const HEIGHT: u32 = 450;
const PASSES: u32 = 64;

fn main() -> Result<()> {
    env_logger::init();

    let scene = build_scene()?;

    let mut camera = Camera::new(45.0, 0.1, 100.0, Vec3::new(0.0, 0.0, 6.0));
    camera.on_resize(WIDTH, HEIGHT);

    let mut renderer = Renderer::with_seed(42);
    renderer.on_resize(WIDTH, HEIGHT);
    renderer.configure(RenderSettings {
        bounce_limit: 8,
        sample_count: 1,
        accumulate: true,
        antialiasing: true,
        aperture_radius: 0.0,
        focus_distance: 6.0,
    })?;

    println!("Rendering {WIDTH}x{HEIGHT}, {PASSES} passes...");
    let start = std::time::Instant::now();

    for pass in 1..=PASSES {
        renderer.render(&scene, &camera)?;
        if pass % 16 == 0 {
            println!("  pass {pass}/{PASSES}");
        }
    }

    println!("Rendered in {:?}", start.elapsed());

    let filename = "progressive.png";
    image::save_buffer(
        filename,
        renderer.pixel_data(),
        WIDTH,
        HEIGHT,
        image::ColorType::Rgba8,
    )?;
    println!("Saved to {filename}");

    Ok(())
}

fn build_scene() -> Result<Scene> {
    let mut scene = Scene::new(Vec3::new(0.6, 0.7, 0.9));

    let pink = scene.add_material(Material::diffuse(Vec3::new(1.0, 0.0, 1.0), 0.0)?);
    let blue = scene.add_material(Material::diffuse(Vec3::new(0.2, 0.3, 1.0), 0.1)?);
    let orange = scene.add_material(Material::emissive(Vec3::new(0.8, 0.5, 0.2), 2.0)?);
    let glass = scene.add_material(Material::dielectric(1.5)?);
    let mirror = scene.add_material(Material::metal(Vec3::new(0.7, 0.6, 0.5), 0.05)?);

    scene.add_sphere(Sphere::new(Vec3::new(0.0, 0.0, 0.0), 1.0, pink)?);
    scene.add_sphere(Sphere::new(Vec3::new(2.0, 0.0, 0.0), 1.0, orange)?);
    scene.add_sphere(Sphere::new(Vec3::new(-2.0, 0.0, 0.0), 1.0, glass)?);
    scene.add_sphere(Sphere::new(Vec3::new(0.0, 2.0, -1.0), 0.8, mirror)?);
    scene.add_sphere(Sphere::new(Vec3::new(0.0, -101.0, 0.0), 100.0, blue)?);

    scene.validate()?;
    Ok(scene)
}
