//! Structure-of-arrays sphere storage and the nearest-hit scan.
//!
//! Every field the intersection loop touches lives in its own column, so the
//! scan streams through contiguous `f32`s instead of hopping over per-sphere
//! records. There is no acceleration structure: for the small-to-moderate
//! sphere counts this renderer targets, a linear pass over hot columns beats
//! a tree.
//!
//! The batch is rebuilt with [`SphereBatch::update`] whenever the source
//! spheres or their materials change, and is read-only between updates.

use crate::{Hit, Sphere};
use orb_math::{Interval, Ray, Vec3};
use thiserror::Error;

/// Anything that can tell the batch whether a sphere is a light.
pub trait Emissive {
    fn is_emissive(&self) -> bool;
}

impl Emissive for bool {
    fn is_emissive(&self) -> bool {
        *self
    }
}

/// Errors from rebuilding a [`SphereBatch`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BatchError {
    #[error("{count} spheres exceed batch capacity of {capacity}")]
    CapacityExceeded { count: usize, capacity: usize },

    #[error("got {spheres} spheres but {materials} materials")]
    LengthMismatch { spheres: usize, materials: usize },
}

/// Sphere geometry in columnar form plus the indices of emissive spheres.
#[derive(Debug, Clone)]
pub struct SphereBatch {
    center_x: Vec<f32>,
    center_y: Vec<f32>,
    center_z: Vec<f32>,
    sq_radius: Vec<f32>,
    inv_radius: Vec<f32>,
    /// Active slots; columns are allocated for `capacity` up front
    len: usize,
    emissive: Vec<usize>,
}

impl SphereBatch {
    /// Allocate a batch able to hold up to `capacity` spheres.
    pub fn new(capacity: usize) -> Self {
        Self {
            center_x: vec![0.0; capacity],
            center_y: vec![0.0; capacity],
            center_z: vec![0.0; capacity],
            sq_radius: vec![0.0; capacity],
            inv_radius: vec![0.0; capacity],
            len: 0,
            emissive: Vec::with_capacity(capacity),
        }
    }

    /// Build a batch sized exactly for `spheres` and fill it.
    pub fn from_spheres<M: Emissive>(spheres: &[Sphere], materials: &[M]) -> Result<Self, BatchError> {
        let mut batch = Self::new(spheres.len());
        batch.update(spheres, materials)?;
        Ok(batch)
    }

    /// Recompute all derived columns and the emissive index list.
    ///
    /// `materials[i]` belongs to `spheres[i]`. Must be called again after any
    /// change to sphere geometry or to which materials emit.
    pub fn update<M: Emissive>(&mut self, spheres: &[Sphere], materials: &[M]) -> Result<(), BatchError> {
        if spheres.len() != materials.len() {
            return Err(BatchError::LengthMismatch {
                spheres: spheres.len(),
                materials: materials.len(),
            });
        }
        if spheres.len() > self.capacity() {
            return Err(BatchError::CapacityExceeded {
                count: spheres.len(),
                capacity: self.capacity(),
            });
        }

        self.len = spheres.len();
        self.emissive.clear();

        for (i, (sphere, material)) in spheres.iter().zip(materials).enumerate() {
            self.center_x[i] = sphere.center.x;
            self.center_y[i] = sphere.center.y;
            self.center_z[i] = sphere.center.z;
            self.sq_radius[i] = sphere.radius * sphere.radius;
            self.inv_radius[i] = 1.0 / sphere.radius;

            if material.is_emissive() {
                self.emissive.push(i);
            }
        }

        Ok(())
    }

    /// Find the closest sphere hit with `ray_t.min < t < ray_t.max`.
    ///
    /// Returns the sphere index and fills `hit`, or returns `None` and leaves
    /// `hit` untouched. When the near root is at or behind `ray_t.min` (ray
    /// starts inside the sphere) the far root is used. Exact ties go to the
    /// lower index.
    pub fn hit_spheres(&self, ray: &Ray, ray_t: Interval, hit: &mut Hit) -> Option<usize> {
        let origin = ray.origin();
        let dir = ray.direction();

        let mut closest = ray_t.max;
        let mut hit_id = None;

        for i in 0..self.len {
            let co = Vec3::new(
                self.center_x[i] - origin.x,
                self.center_y[i] - origin.y,
                self.center_z[i] - origin.z,
            );
            let nb = co.dot(dir);
            let c = co.length_squared() - self.sq_radius[i];
            let discriminant = nb * nb - c;
            if discriminant > 0.0 {
                let d = discriminant.sqrt();
                let mut t = nb - d;
                if t <= ray_t.min {
                    t = nb + d;
                }
                if Interval::new(ray_t.min, closest).surrounds(t) {
                    closest = t;
                    hit_id = Some(i);
                }
            }
        }

        let id = hit_id?;
        hit.pos = ray.at(closest);
        hit.normal = (hit.pos - self.center(id)) * self.inv_radius[id];
        hit.t = closest;
        Some(id)
    }

    /// Number of spheres currently in the batch.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the batch holds no spheres.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maximum number of spheres this batch was allocated for.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.center_x.len()
    }

    /// Center of sphere `i`.
    #[inline]
    pub fn center(&self, i: usize) -> Vec3 {
        Vec3::new(self.center_x[i], self.center_y[i], self.center_z[i])
    }

    /// Radius of sphere `i`, recovered from the stored reciprocal.
    #[inline]
    pub fn radius(&self, i: usize) -> f32 {
        1.0 / self.inv_radius[i]
    }

    /// Squared radius of sphere `i`.
    #[inline]
    pub fn sq_radius(&self, i: usize) -> f32 {
        self.sq_radius[i]
    }

    /// Indices of emissive spheres, in ascending order.
    #[inline]
    pub fn emissive_spheres(&self) -> &[usize] {
        &self.emissive
    }

    /// Number of emissive spheres.
    #[inline]
    pub fn emissive_count(&self) -> usize {
        self.emissive.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAY_T: Interval = Interval {
        min: 0.001,
        max: 1000.0,
    };

    fn batch_of(spheres: &[Sphere]) -> SphereBatch {
        let lights = vec![false; spheres.len()];
        SphereBatch::from_spheres(spheres, &lights).unwrap()
    }

    #[test]
    fn test_hit_front_of_sphere() {
        let batch = batch_of(&[Sphere::new(Vec3::ZERO, 2.0)]);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 0.0, -1.0));

        let mut hit = Hit::default();
        assert_eq!(batch.hit_spheres(&ray, RAY_T, &mut hit), Some(0));
        assert_eq!(hit.t, 8.0);
        assert_eq!(hit.pos, Vec3::new(0.0, 0.0, 2.0));
        assert_eq!(hit.normal, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_hit_from_inside_uses_far_root() {
        let batch = batch_of(&[Sphere::new(Vec3::ZERO, 5.0)]);
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);

        let mut hit = Hit::default();
        assert_eq!(batch.hit_spheres(&ray, RAY_T, &mut hit), Some(0));
        assert_eq!(hit.t, 5.0);
        assert_eq!(hit.pos, Vec3::new(0.0, 0.0, 5.0));
        // Outward normal, same direction as the ray
        assert_eq!(hit.normal, Vec3::Z);
    }

    #[test]
    fn test_miss_leaves_hit_untouched() {
        let batch = batch_of(&[Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5)]);
        let ray = Ray::new(Vec3::ZERO, Vec3::Y);

        let mut hit = Hit {
            pos: Vec3::ONE,
            normal: Vec3::X,
            t: 42.0,
        };
        let before = hit;
        assert_eq!(batch.hit_spheres(&ray, RAY_T, &mut hit), None);
        assert_eq!(hit, before);
    }

    #[test]
    fn test_tangent_ray_misses() {
        // Discriminant exactly zero counts as a miss
        let batch = batch_of(&[Sphere::new(Vec3::ZERO, 1.0)]);
        let ray = Ray::new(Vec3::new(1.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));

        let mut hit = Hit::default();
        assert_eq!(batch.hit_spheres(&ray, RAY_T, &mut hit), None);
    }

    #[test]
    fn test_sphere_behind_ray_misses() {
        let batch = batch_of(&[Sphere::new(Vec3::new(0.0, 0.0, 10.0), 1.0)]);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let mut hit = Hit::default();
        assert_eq!(batch.hit_spheres(&ray, RAY_T, &mut hit), None);
    }

    #[test]
    fn test_t_max_limits_hits() {
        let batch = batch_of(&[Sphere::new(Vec3::ZERO, 2.0)]);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 0.0, -1.0));

        let mut hit = Hit::default();
        assert_eq!(batch.hit_spheres(&ray, Interval::new(0.001, 8.0), &mut hit), None);
        assert_eq!(batch.hit_spheres(&ray, Interval::new(0.001, 8.5), &mut hit), Some(0));
    }

    #[test]
    fn test_nearest_sphere_wins() {
        let batch = batch_of(&[
            Sphere::new(Vec3::new(0.0, 0.0, -10.0), 1.0),
            Sphere::new(Vec3::new(0.0, 0.0, -4.0), 1.0),
            Sphere::new(Vec3::new(0.0, 0.0, -20.0), 1.0),
        ]);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let mut hit = Hit::default();
        assert_eq!(batch.hit_spheres(&ray, RAY_T, &mut hit), Some(1));
        assert_eq!(hit.t, 3.0);
    }

    #[test]
    fn test_tie_goes_to_lower_index() {
        // Identical spheres produce identical t
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0);
        let batch = batch_of(&[sphere, sphere, sphere]);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let mut hit = Hit::default();
        assert_eq!(batch.hit_spheres(&ray, RAY_T, &mut hit), Some(0));
        assert_eq!(hit.t, 4.0);
    }

    #[test]
    fn test_update_derived_columns() {
        let batch = batch_of(&[Sphere::new(Vec3::new(1.0, 2.0, 3.0), 4.0)]);

        assert_eq!(batch.len(), 1);
        assert_eq!(batch.center(0), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(batch.sq_radius(0), 16.0);
        assert_eq!(batch.radius(0), 4.0);
    }

    #[test]
    fn test_emissive_list_is_compacted() {
        let spheres = vec![Sphere::new(Vec3::ZERO, 1.0); 5];
        let mut batch = SphereBatch::new(8);

        batch.update(&spheres, &[false, true, false, true, true]).unwrap();
        assert_eq!(batch.emissive_spheres(), &[1, 3, 4]);
        assert_eq!(batch.emissive_count(), 3);

        // A second update resets the list rather than appending
        batch.update(&spheres, &[true, false, false, false, false]).unwrap();
        assert_eq!(batch.emissive_spheres(), &[0]);
        assert_eq!(batch.emissive_count(), 1);
    }

    #[test]
    fn test_update_shrinks_active_count() {
        let mut batch = SphereBatch::new(4);
        let spheres = [
            Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0),
            Sphere::new(Vec3::new(0.0, 0.0, -3.0), 1.0),
        ];
        batch.update(&spheres, &[false, false]).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.capacity(), 4);

        batch.update(&spheres[..1], &[false]).unwrap();
        assert_eq!(batch.len(), 1);

        // The stale second slot must not be scanned
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut hit = Hit::default();
        assert_eq!(batch.hit_spheres(&ray, RAY_T, &mut hit), Some(0));
        assert_eq!(hit.t, 4.0);
    }

    #[test]
    fn test_update_errors() {
        let spheres = vec![Sphere::new(Vec3::ZERO, 1.0); 3];
        let mut batch = SphereBatch::new(2);

        assert_eq!(
            batch.update(&spheres, &[false; 3]),
            Err(BatchError::CapacityExceeded { count: 3, capacity: 2 })
        );
        assert_eq!(
            batch.update(&spheres[..2], &[false; 1]),
            Err(BatchError::LengthMismatch { spheres: 2, materials: 1 })
        );
        assert!(batch.is_empty());
    }

    #[test]
    fn test_batch_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SphereBatch>();
    }
}
