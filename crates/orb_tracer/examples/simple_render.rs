//! Simple path tracer example.
//!
//! Renders a small sphere scene single-threaded and saves it in PPM format.

use orb_tracer::{
    color_to_rgba, render, CameraDescription, Color, ImageBuffer, Material, RenderConfig, Sphere, Vec3, World,
};
use std::fs::File;
use std::io::{BufWriter, Write};

fn main() -> std::io::Result<()> {
    println!("orb Path Tracer - Simple Example");
    println!("=================================");

    // Build the scene
    let start = std::time::Instant::now();
    let world = build_scene();
    println!("Scene built in {:?}", start.elapsed());

    let config = RenderConfig {
        width: 400,
        height: 225,
        samples_per_pixel: 32,
        max_depth: 8,
        background: Color::ZERO,
        use_sky_gradient: true,
        light_sampling: true,
    };

    let camera = CameraDescription {
        look_from: Vec3::new(13.0, 2.0, 3.0),
        look_at: Vec3::ZERO,
        vup: Vec3::Y,
        vfov: 20.0,
        aperture: 0.1,
        focus_dist: Some(10.0),
    }
    .build(config.aspect());

    println!(
        "Rendering {}x{} @ {} spp...",
        config.width, config.height, config.samples_per_pixel
    );

    let start = std::time::Instant::now();
    let image = render(&camera, &world, &config, 0);
    println!("Rendered in {:?}", start.elapsed());

    let filename = "output.ppm";
    save_ppm(&image, filename)?;
    println!("Saved to {}", filename);
    Ok(())
}

fn build_scene() -> World {
    let mut spheres = vec![Sphere::new(Vec3::new(0.0, -1000.0, 0.0), 1000.0)];
    let mut materials = vec![Material::lambertian(Color::new(0.5, 0.5, 0.5))];

    let mut add = |sphere: Sphere, material: Material| {
        spheres.push(sphere);
        materials.push(material);
    };

    add(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 1.0), Material::dielectric(1.5));
    add(
        Sphere::new(Vec3::new(-4.0, 1.0, 0.0), 1.0),
        Material::lambertian(Color::new(0.4, 0.2, 0.1)),
    );
    add(
        Sphere::new(Vec3::new(4.0, 1.0, 0.0), 1.0),
        Material::metal(Color::new(0.7, 0.6, 0.5), 0.0),
    );
    add(
        Sphere::new(Vec3::new(0.0, 4.0, 2.0), 0.5),
        Material::light(Color::ZERO, Color::new(12.0, 11.0, 10.0)),
    );

    World::new(spheres, materials).expect("example scene fits its batch")
}

fn save_ppm(image: &ImageBuffer, filename: &str) -> std::io::Result<()> {
    let file = File::create(filename)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "P3")?;
    writeln!(writer, "{} {}", image.width, image.height)?;
    writeln!(writer, "255")?;

    for color in &image.pixels {
        let [r, g, b, _] = color_to_rgba(*color);
        writeln!(writer, "{} {} {}", r, g, b)?;
    }

    Ok(())
}
