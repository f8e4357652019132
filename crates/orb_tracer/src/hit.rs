//! Intersection record returned by the sphere batch.

use orb_math::Vec3;

/// Record of a ray-sphere intersection.
///
/// A plain value: it holds no reference back into the batch that produced
/// it. The index of the sphere that was hit is returned separately.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Hit {
    /// Point of intersection
    pub pos: Vec3,
    /// Outward surface normal, unit length
    pub normal: Vec3,
    /// Ray parameter where the intersection occurs
    pub t: f32,
}

impl Hit {
    /// Whether the ray arrived from outside the surface.
    #[inline]
    pub fn front_face(&self, direction: Vec3) -> bool {
        direction.dot(self.normal) < 0.0
    }

    /// The normal flipped to face against `direction`.
    #[inline]
    pub fn facing_normal(&self, direction: Vec3) -> Vec3 {
        if self.front_face(direction) {
            self.normal
        } else {
            -self.normal
        }
    }
}
