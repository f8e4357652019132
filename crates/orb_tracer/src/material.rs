//! Surface materials and how they scatter light.

use crate::{batch::Emissive, Hit};
use orb_math::{reflect, refract, schlick, Ray, Vec3, XorShift32};
use serde::{Deserialize, Serialize};

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// A scattered ray and how much it is attenuated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scatter {
    pub attenuation: Color,
    pub ray: Ray,
}

/// Material of one sphere.
///
/// Materials are stored in a slice parallel to the spheres, so they are a
/// closed enum rather than trait objects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Material {
    /// Diffuse surface; a non-black `emissive` makes it a light.
    Lambertian {
        albedo: Color,
        #[serde(default)]
        emissive: Color,
    },
    /// Specular reflector; `roughness` 0.0 = perfect mirror.
    Metal { albedo: Color, roughness: f32 },
    /// Clear refractive material (1.5 = glass).
    Dielectric { ior: f32 },
}

impl Material {
    /// Create a diffuse material.
    pub fn lambertian(albedo: Color) -> Self {
        Material::Lambertian {
            albedo,
            emissive: Color::ZERO,
        }
    }

    /// Create a diffuse light.
    pub fn light(albedo: Color, emissive: Color) -> Self {
        Material::Lambertian { albedo, emissive }
    }

    /// Create a metal, clamping roughness to [0, 1].
    pub fn metal(albedo: Color, roughness: f32) -> Self {
        Material::Metal {
            albedo,
            roughness: roughness.clamp(0.0, 1.0),
        }
    }

    /// Create a dielectric with the given index of refraction.
    pub fn dielectric(ior: f32) -> Self {
        Material::Dielectric { ior }
    }

    /// Light emitted by the surface.
    #[inline]
    pub fn emitted(&self) -> Color {
        match self {
            Material::Lambertian { emissive, .. } => *emissive,
            _ => Color::ZERO,
        }
    }

    /// Scatter an incoming ray at `hit`.
    ///
    /// Returns `None` if the ray is absorbed.
    pub fn scatter(&self, ray_in: &Ray, hit: &Hit, rng: &mut XorShift32) -> Option<Scatter> {
        match *self {
            Material::Lambertian { albedo, .. } => {
                let mut direction = hit.normal + rng.unit_vector();

                // Catch degenerate scatter direction
                if direction.length_squared() < 1e-8 {
                    direction = hit.normal;
                }

                Some(Scatter {
                    attenuation: albedo,
                    ray: Ray::new(hit.pos, direction.normalize()),
                })
            }
            Material::Metal { albedo, roughness } => {
                let reflected = reflect(ray_in.direction(), hit.normal);
                let direction = (reflected + roughness * rng.in_unit_sphere()).normalize();

                // Fuzz can push the ray below the surface
                if direction.dot(hit.normal) > 0.0 {
                    Some(Scatter {
                        attenuation: albedo,
                        ray: Ray::new(hit.pos, direction),
                    })
                } else {
                    None
                }
            }
            Material::Dielectric { ior } => {
                let dir = ray_in.direction();
                let d_n = dir.dot(hit.normal);

                let (outward_normal, ni_over_nt, cosine) = if d_n > 0.0 {
                    // Leaving the medium
                    (-hit.normal, ior, ior * d_n)
                } else {
                    (hit.normal, 1.0 / ior, -d_n)
                };

                let direction = match refract(dir, outward_normal, ni_over_nt) {
                    Some(refracted) if rng.next_f32() >= schlick(cosine, ior) => refracted,
                    _ => reflect(dir, hit.normal),
                };

                Some(Scatter {
                    attenuation: Color::ONE,
                    ray: Ray::new(hit.pos, direction.normalize()),
                })
            }
        }
    }

    /// Diffuse albedo if this material takes part in explicit light sampling.
    #[inline]
    pub fn diffuse_albedo(&self) -> Option<Color> {
        match self {
            Material::Lambertian { albedo, .. } => Some(*albedo),
            _ => None,
        }
    }
}

impl Emissive for Material {
    fn is_emissive(&self) -> bool {
        self.emitted() != Color::ZERO
    }
}
