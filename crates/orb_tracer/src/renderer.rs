//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing with configurable depth
//! - Explicit light sampling at diffuse bounces
//! - Gamma correction
//! - Anti-aliasing via multi-sampling

use crate::{Camera, Color, Hit, World};
use orb_math::{pixel_seed, Interval, Ray, Vec3, XorShift32};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::path::Path;

/// Smallest accepted hit distance, keeps bounced rays off their own surface.
pub const T_MIN: f32 = 0.001;

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Background color when ray doesn't hit anything
    pub background: Color,
    /// Whether to use sky gradient instead of solid background
    pub use_sky_gradient: bool,
    /// Sample emissive spheres directly at diffuse bounces
    pub light_sampling: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 360,
            samples_per_pixel: 16,
            max_depth: 10,
            background: Color::ZERO,
            use_sky_gradient: true,
            light_sampling: true,
        }
    }
}

impl RenderConfig {
    /// Image width / height.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Compute the color seen by a ray.
///
/// This is the core path tracing function. It traces the ray through
/// the scene, bouncing off surfaces and accumulating color.
pub fn trace(ray: &Ray, world: &World, depth: u32, config: &RenderConfig, rng: &mut XorShift32) -> Color {
    trace_path(ray, world, depth, true, config, rng)
}

fn trace_path(
    ray: &Ray,
    world: &World,
    depth: u32,
    include_emission: bool,
    config: &RenderConfig,
    rng: &mut XorShift32,
) -> Color {
    // If we've exceeded max depth, return black (no light)
    if depth == 0 {
        return Color::ZERO;
    }

    let mut hit = Hit::default();
    let Some(id) = world.hit(ray, Interval::new(T_MIN, f32::INFINITY), &mut hit) else {
        if config.use_sky_gradient {
            return sky_gradient(ray);
        }
        return config.background;
    };

    let material = world.material(id);

    // Emission already counted by light sampling at the previous bounce is skipped
    let mut color = if include_emission {
        material.emitted()
    } else {
        Color::ZERO
    };

    if let Some(scatter) = material.scatter(ray, &hit, rng) {
        let mut emission_next = true;
        if config.light_sampling {
            if let Some(albedo) = material.diffuse_albedo() {
                color += sample_lights(world, id, &hit, ray, albedo, rng);
                emission_next = false;
            }
        }
        color += scatter.attenuation
            * trace_path(&scatter.ray, world, depth - 1, emission_next, config, rng);
    }

    color
}

/// Direct light from every emissive sphere at a diffuse hit.
///
/// Picks one direction per light, uniformly inside the cone the light
/// subtends, and keeps it if the shadow ray reaches that light first.
fn sample_lights(
    world: &World,
    self_id: usize,
    hit: &Hit,
    ray_in: &Ray,
    albedo: Color,
    rng: &mut XorShift32,
) -> Color {
    let batch = world.batch();
    let nl = hit.facing_normal(ray_in.direction());
    let mut light = Color::ZERO;

    for &light_id in batch.emissive_spheres() {
        if light_id == self_id {
            continue;
        }

        // Orthonormal frame around the direction to the light
        let center = batch.center(light_id);
        let sw = (center - hit.pos).normalize();
        let helper = if sw.x.abs() > 0.01 { Vec3::Y } else { Vec3::X };
        let su = helper.cross(sw).normalize();
        let sv = sw.cross(su);

        let sin_max_sq = batch.sq_radius(light_id) / (hit.pos - center).length_squared();
        let cos_a_max = (1.0 - sin_max_sq).max(0.0).sqrt();

        let eps1 = rng.next_f32();
        let eps2 = rng.next_f32();
        let cos_a = 1.0 - eps1 + eps1 * cos_a_max;
        let sin_a = (1.0 - cos_a * cos_a).max(0.0).sqrt();
        let phi = 2.0 * PI * eps2;
        let l = (su * (phi.cos() * sin_a) + sv * (phi.sin() * sin_a) + sw * cos_a).normalize();

        let mut shadow = Hit::default();
        let shadow_ray = Ray::new(hit.pos, l);
        if world.hit(&shadow_ray, Interval::new(T_MIN, f32::INFINITY), &mut shadow) == Some(light_id) {
            let omega = 2.0 * PI * (1.0 - cos_a_max);
            let emission = world.material(light_id).emitted();
            light += albedo * emission * (l.dot(nl).max(0.0) * omega / PI);
        }
    }

    light
}

/// Compute sky gradient background.
fn sky_gradient(ray: &Ray) -> Color {
    let a = 0.5 * (ray.direction().y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a color to 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    // Apply gamma correction and convert to 0-255
    let r = (255.0 * Interval::UNIT.clamp(linear_to_gamma(color.x))) as u8;
    let g = (255.0 * Interval::UNIT.clamp(linear_to_gamma(color.y))) as u8;
    let b = (255.0 * Interval::UNIT.clamp(linear_to_gamma(color.z))) as u8;
    [r, g, b, 255]
}

/// Render a single pixel with multi-sampling.
///
/// Pixel (0, 0) is the top-left corner. The sampler is seeded from the pixel
/// coordinates and `frame`, so a pixel renders identically no matter which
/// thread or bucket produces it.
pub fn render_pixel(camera: &Camera, world: &World, x: u32, y: u32, config: &RenderConfig, frame: u32) -> Color {
    let mut rng = XorShift32::new(pixel_seed(x, y, config.width, frame));
    let mut pixel_color = Color::ZERO;

    let row = (config.height - 1 - y) as f32;
    for _ in 0..config.samples_per_pixel {
        let s = (x as f32 + rng.next_f32()) / config.width as f32;
        let t = (row + rng.next_f32()) / config.height as f32;
        let ray = camera.get_ray(s, t, &mut rng);
        pixel_color += trace(&ray, world, config.max_depth, config, &mut rng);
    }

    // Average the samples
    pixel_color / config.samples_per_pixel as f32
}

/// Simple image buffer for storing render output.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width * height) as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Convert to RGBA bytes (for display or saving).
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity((self.width * self.height * 4) as usize);
        for color in &self.pixels {
            let rgba = color_to_rgba(*color);
            bytes.extend_from_slice(&rgba);
        }
        bytes
    }

    /// Save as an 8-bit image; the format follows the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> image::ImageResult<()> {
        let img = image::RgbaImage::from_fn(self.width, self.height, |x, y| {
            image::Rgba(color_to_rgba(self.get(x, y)))
        });
        img.save(path)
    }
}

/// Render the entire scene to an image buffer.
///
/// This is a simple single-threaded renderer for testing; see
/// [`render_parallel`](crate::render_parallel) for the bucketed version.
pub fn render(camera: &Camera, world: &World, config: &RenderConfig, frame: u32) -> ImageBuffer {
    let mut image = ImageBuffer::new(config.width, config.height);

    for y in 0..config.height {
        for x in 0..config.width {
            let color = render_pixel(camera, world, x, y, config, frame);
            image.set(x, y, color);
        }
    }

    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CameraDescription, Material, Sphere};

    fn small_config() -> RenderConfig {
        RenderConfig {
            width: 8,
            height: 8,
            samples_per_pixel: 4,
            max_depth: 5,
            background: Color::ZERO,
            use_sky_gradient: false,
            light_sampling: true,
        }
    }

    /// Ground sphere with a small light hovering above the origin.
    fn lit_world() -> World {
        World::new(
            vec![
                Sphere::new(Vec3::new(0.0, -100.0, 0.0), 100.0),
                Sphere::new(Vec3::new(0.0, 3.0, 0.0), 0.25),
            ],
            vec![
                Material::lambertian(Color::new(0.8, 0.8, 0.8)),
                Material::light(Color::ZERO, Color::new(20.0, 20.0, 20.0)),
            ],
        )
        .unwrap()
    }

    fn looking_down() -> Camera {
        CameraDescription {
            look_from: Vec3::new(0.0, 2.0, 2.0),
            look_at: Vec3::ZERO,
            ..Default::default()
        }
        .build(1.0)
    }

    #[test]
    fn test_sky_gradient() {
        // Ray pointing up should be more blue (less red than white)
        let up_ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        let up_color = sky_gradient(&up_ray);

        // Ray pointing down should be more white (more red)
        let down_ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0));
        let down_color = sky_gradient(&down_ray);

        assert!(
            up_color.x < down_color.x,
            "up_color.x={} should be < down_color.x={}",
            up_color.x,
            down_color.x
        );
    }

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert_eq!(linear_to_gamma(-1.0), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 0.0001);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_color_to_rgba_clamps() {
        assert_eq!(color_to_rgba(Color::new(4.0, 0.0, -1.0)), [255, 0, 0, 255]);
        assert_eq!(color_to_rgba(Color::new(0.25, 1.0, 0.0)), [127, 255, 0, 255]);
    }

    #[test]
    fn test_miss_returns_background() {
        let world = World::new(vec![], Vec::<Material>::new()).unwrap();
        let mut config = small_config();
        config.background = Color::new(0.1, 0.2, 0.3);
        let mut rng = XorShift32::new(1);

        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        assert_eq!(trace(&ray, &world, 5, &config, &mut rng), Color::new(0.1, 0.2, 0.3));

        config.use_sky_gradient = true;
        assert_eq!(trace(&ray, &world, 5, &config, &mut rng), sky_gradient(&ray));
    }

    #[test]
    fn test_zero_depth_is_black() {
        let world = lit_world();
        let mut rng = XorShift32::new(1);
        let ray = Ray::new(Vec3::new(0.0, 3.0, 5.0), Vec3::new(0.0, 0.0, -1.0));

        assert_eq!(trace(&ray, &world, 0, &small_config(), &mut rng), Color::ZERO);
    }

    #[test]
    fn test_primary_ray_sees_light_emission() {
        let world = lit_world();
        let mut rng = XorShift32::new(1);
        let ray = Ray::new(Vec3::new(0.0, 3.0, 5.0), Vec3::new(0.0, 0.0, -1.0));

        let color = trace(&ray, &world, 5, &small_config(), &mut rng);
        assert!(color.x >= 20.0, "color = {color}");
    }

    #[test]
    fn test_light_sampling_lights_the_ground() {
        let world = lit_world();
        let mut rng = XorShift32::new(9);
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -1.0, 0.0));

        // Depth 1: no bounce can reach the light, only the explicit sample
        let color = trace(&ray, &world, 1, &small_config(), &mut rng);
        assert!(color.x > 0.0, "color = {color}");

        // Without light sampling the same path sees nothing
        let mut config = small_config();
        config.light_sampling = false;
        let color = trace(&ray, &world, 1, &config, &mut rng);
        assert_eq!(color, Color::ZERO);
    }

    #[test]
    fn test_light_sampling_respects_occluders() {
        let world = World::new(
            vec![
                Sphere::new(Vec3::new(0.0, -100.0, 0.0), 100.0),
                Sphere::new(Vec3::new(0.0, 3.0, 0.0), 0.25),
                // Blocker between the ground point and the light
                Sphere::new(Vec3::new(0.0, 1.5, 0.0), 1.0),
            ],
            vec![
                Material::lambertian(Color::new(0.8, 0.8, 0.8)),
                Material::light(Color::ZERO, Color::new(20.0, 20.0, 20.0)),
                Material::lambertian(Color::new(0.8, 0.8, 0.8)),
            ],
        )
        .unwrap();
        let mut rng = XorShift32::new(9);
        let ray = Ray::new(Vec3::new(0.0, 0.3, 0.0), Vec3::new(0.0, -1.0, 0.0));

        let color = trace(&ray, &world, 1, &small_config(), &mut rng);
        assert_eq!(color, Color::ZERO);
    }

    #[test]
    fn test_render_pixel_is_deterministic() {
        let world = lit_world();
        let camera = looking_down();
        let config = small_config();

        let a = render_pixel(&camera, &world, 4, 4, &config, 0);
        let b = render_pixel(&camera, &world, 4, 4, &config, 0);
        assert_eq!(a, b);
        assert!(a.length() > 0.0);
    }

    #[test]
    fn test_render_fills_image() {
        let world = lit_world();
        let camera = looking_down();
        let config = small_config();

        let image = render(&camera, &world, &config, 0);
        assert_eq!(image.pixels.len(), 64);
        assert_eq!(image.to_rgba().len(), 64 * 4);
        assert_eq!(image.get(3, 5), render_pixel(&camera, &world, 3, 5, &config, 0));
    }
}
