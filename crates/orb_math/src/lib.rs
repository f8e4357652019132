//! Math types for the orb path tracer.
//!
//! Vectors come straight from `glam`; this crate adds the ray record, the
//! scattering helpers (reflect, refract, Schlick) and the xorshift sampler
//! that every shading routine threads through explicitly.

// Re-export glam for convenience
pub use glam::*;

// orb math types
mod interval;
mod ray;
pub mod random;
pub mod vector;

pub use interval::Interval;
pub use random::{pixel_seed, XorShift32};
pub use ray::Ray;
pub use vector::{is_normalized, reflect, refract, schlick, Vector3, VectorExt, NORMALIZED_EPSILON};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector3_is_glam_vec3() {
        let v: Vector3 = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(v.x, 1.0);
        assert_eq!(v.y, 2.0);
        assert_eq!(v.z, 3.0);
    }

    #[test]
    fn test_vector3_operations() {
        let a = Vector3::new(1.0, 2.0, 3.0);
        let b = Vector3::new(4.0, 5.0, 6.0);

        assert_eq!(a + b, Vector3::new(5.0, 7.0, 9.0));
        assert_eq!(b - a, Vector3::new(3.0, 3.0, 3.0));
        assert_eq!(a * b, Vector3::new(4.0, 10.0, 18.0));
        assert_eq!(a * 2.0, 2.0 * a);
        assert_eq!(-a, Vector3::new(-1.0, -2.0, -3.0));
        assert_eq!(a.dot(b), 32.0);
        assert_eq!(Vector3::X.cross(Vector3::Y), Vector3::Z);
        assert_eq!(Vector3::new(3.0, 4.0, 0.0).length(), 5.0);
        assert_eq!(Vector3::new(3.0, 4.0, 0.0).length_squared(), 25.0);
    }
}
