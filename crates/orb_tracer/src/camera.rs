//! Thin-lens camera for primary ray generation.

use orb_math::{Ray, Vec3, XorShift32};
use serde::{Deserialize, Serialize};

/// Camera for generating rays into the scene.
///
/// All derived values are computed once in [`Camera::new`]; build a new
/// camera when the view changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    origin: Vec3,
    lower_left_corner: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    lens_radius: f32,
}

impl Camera {
    /// Create a camera.
    ///
    /// - `vfov`: vertical field of view in degrees
    /// - `aspect`: image width / height
    /// - `aperture`: lens diameter, 0.0 = pinhole
    /// - `focus_dist`: distance from `look_from` to the plane of perfect focus
    pub fn new(
        look_from: Vec3,
        look_at: Vec3,
        vup: Vec3,
        vfov: f32,
        aspect: f32,
        aperture: f32,
        focus_dist: f32,
    ) -> Self {
        let lens_radius = aperture / 2.0;
        let theta = vfov.to_radians();
        let half_height = (theta / 2.0).tan();
        let half_width = aspect * half_height;

        // Calculate camera basis vectors; w points backwards along the view
        let w = (look_from - look_at).normalize();
        let u = vup.cross(w).normalize();
        let v = w.cross(u);

        let origin = look_from;
        let lower_left_corner = origin
            - half_width * focus_dist * u
            - half_height * focus_dist * v
            - focus_dist * w;

        Self {
            origin,
            lower_left_corner,
            horizontal: 2.0 * half_width * focus_dist * u,
            vertical: 2.0 * half_height * focus_dist * v,
            u,
            v,
            w,
            lens_radius,
        }
    }

    /// Generate a ray through image-plane coordinates `(s, t)` in [0, 1].
    ///
    /// `s` runs left to right and `t` bottom to top. The origin is jittered
    /// over the lens disk; with zero aperture the ray does not depend on
    /// `rng`, though a disk sample is still drawn.
    pub fn get_ray(&self, s: f32, t: f32, rng: &mut XorShift32) -> Ray {
        let rd = self.lens_radius * rng.in_unit_disk();
        let offset = self.u * rd.x + self.v * rd.y;

        let origin = self.origin + offset;
        let target = self.lower_left_corner + s * self.horizontal + t * self.vertical;
        Ray::new(origin, (target - origin).normalize())
    }

    /// Camera position.
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Unit vector the camera looks along.
    pub fn forward(&self) -> Vec3 {
        -self.w
    }

    /// Lens radius (half the aperture).
    pub fn lens_radius(&self) -> f32 {
        self.lens_radius
    }
}

/// Serializable camera parameters, as found in scene files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraDescription {
    pub look_from: Vec3,
    pub look_at: Vec3,
    pub vup: Vec3,
    /// Vertical field of view in degrees
    pub vfov: f32,
    pub aperture: f32,
    /// Distance to the focus plane; `None` focuses on `look_at`
    pub focus_dist: Option<f32>,
}

impl Default for CameraDescription {
    fn default() -> Self {
        Self {
            look_from: Vec3::new(0.0, 2.0, 3.0),
            look_at: Vec3::ZERO,
            vup: Vec3::Y,
            vfov: 60.0,
            aperture: 0.0,
            focus_dist: None,
        }
    }
}

impl CameraDescription {
    /// Build the camera for an image with the given aspect ratio.
    pub fn build(&self, aspect: f32) -> Camera {
        let focus_dist = self
            .focus_dist
            .unwrap_or_else(|| (self.look_from - self.look_at).length());
        Camera::new(
            self.look_from,
            self.look_at,
            self.vup,
            self.vfov,
            aspect,
            self.aperture,
            focus_dist,
        )
    }
}
