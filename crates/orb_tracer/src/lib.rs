//! orb - a sphere-only Monte Carlo path tracer.
//!
//! The hot path is [`SphereBatch::hit_spheres`], a linear scan over
//! structure-of-arrays sphere data, fed by [`Camera::get_ray`]. Materials,
//! the integrator, bucketed parallel rendering and scene files sit on top.

mod batch;
mod bucket;
mod camera;
mod hit;
mod material;
mod renderer;
mod scene;
mod sphere;

pub use batch::{BatchError, Emissive, SphereBatch};
pub use bucket::{generate_buckets, render_bucket, render_parallel, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use camera::{Camera, CameraDescription};
pub use hit::Hit;
pub use material::{Color, Material, Scatter};
pub use renderer::{color_to_rgba, linear_to_gamma, render, render_pixel, trace, ImageBuffer, RenderConfig, T_MIN};
pub use scene::{SceneDescription, SceneError, SceneObject, SceneResult, World};
pub use sphere::Sphere;

/// Re-export Vec3 and common math types from orb_math
pub use orb_math::{Interval, Ray, Vec3, XorShift32};
