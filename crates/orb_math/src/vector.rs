//! Vector helpers used by the scattering code.
//!
//! `Vector3` is `glam::Vec3`, which already covers the arithmetic. What lives
//! here is the part glam doesn't have: the loose unit-length check the debug
//! assertions use, and the reflection/refraction physics.

use glam::Vec3;

/// Three single-precision components.
pub type Vector3 = Vec3;

/// Tolerance on the squared length for a vector to count as normalized.
///
/// Deliberately loose (about 0.5% on the length).
pub const NORMALIZED_EPSILON: f32 = 0.01;

/// Returns true if `|v|² - 1` is within [`NORMALIZED_EPSILON`].
#[inline]
pub fn is_normalized(v: Vec3) -> bool {
    (v.length_squared() - 1.0).abs() < NORMALIZED_EPSILON
}

/// Extra operations on `Vec3` that glam does not provide.
pub trait VectorExt {
    /// Normalize in place by dividing by the length.
    ///
    /// A zero vector turns into NaNs; nothing is corrected.
    fn normalize_in_place(&mut self);

    /// Unit-length check using [`NORMALIZED_EPSILON`].
    fn is_unit(&self) -> bool;
}

impl VectorExt for Vec3 {
    #[inline]
    fn normalize_in_place(&mut self) {
        *self /= self.length();
    }

    #[inline]
    fn is_unit(&self) -> bool {
        is_normalized(*self)
    }
}

/// Reflect `v` about the normal `n`.
///
/// `v` must be unit length (checked in debug builds only).
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    debug_assert!(is_normalized(v), "reflect: v is not normalized: {v}");
    v - 2.0 * v.dot(n) * n
}

/// Refract the unit vector `v` through a surface with normal `n`.
///
/// Returns `None` on total internal reflection; the caller should reflect
/// instead. Otherwise the refracted direction is unit length.
#[inline]
pub fn refract(v: Vec3, n: Vec3, ni_over_nt: f32) -> Option<Vec3> {
    debug_assert!(is_normalized(v), "refract: v is not normalized: {v}");
    let dt = v.dot(n);
    let discriminant = 1.0 - ni_over_nt * ni_over_nt * (1.0 - dt * dt);
    if discriminant > 0.0 {
        Some(ni_over_nt * (v - n * dt) - n * discriminant.sqrt())
    } else {
        None
    }
}

/// Schlick's approximation of Fresnel reflectance.
#[inline]
pub fn schlick(cosine: f32, refractive_index: f32) -> f32 {
    let r0 = ((1.0 - refractive_index) / (1.0 + refractive_index)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}
