//! Sphere source record.

use orb_math::Vec3;
use serde::{Deserialize, Serialize};

/// A sphere in the scene.
///
/// This is the editable source of truth; the derived data used for
/// intersection lives in [`SphereBatch`](crate::SphereBatch) and is refreshed
/// by its `update`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }
}
