//! Tiled rendering.
//!
//! The image is cut into square tiles ("buckets"). Each one only reads the
//! shared `World`, so rayon can hand them to any worker in any order.

use crate::renderer::render_pixel;
use crate::{Camera, Color, ImageBuffer, RenderConfig, World};
use rayon::prelude::*;

/// One tile of the image, in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// Left edge
    pub x: u32,
    /// Top edge
    pub y: u32,
    /// Tile width; edge tiles may be narrower than the bucket size
    pub width: u32,
    /// Tile height; edge tiles may be shorter than the bucket size
    pub height: u32,
    /// Position in the scheduling order
    pub index: usize,
}

impl Bucket {
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self { x, y, width, height, index }
    }

    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }
}

/// Tile edge length used when the caller has no preference.
pub const DEFAULT_BUCKET_SIZE: u32 = 32;

/// Cover a `width` x `height` image with tiles of at most `bucket_size`.
///
/// Tiles come back ordered center-first and renumbered in that order.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let size = bucket_size.max(1);
    let cols = width.div_ceil(size);
    let rows = height.div_ceil(size);

    let mut buckets: Vec<Bucket> = (0..rows)
        .flat_map(|row| (0..cols).map(move |col| (col * size, row * size)))
        .map(|(x, y)| Bucket::new(x, y, size.min(width - x), size.min(height - y), 0))
        .collect();

    order_center_out(&mut buckets, width, height);
    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = i;
    }
    buckets
}

/// Order tiles by the squared distance of their midpoint to the image midpoint.
fn order_center_out(buckets: &mut [Bucket], width: u32, height: u32) {
    let mid = (width as f32 * 0.5, height as f32 * 0.5);
    let dist_sq = |b: &Bucket| {
        let dx = b.x as f32 + b.width as f32 * 0.5 - mid.0;
        let dy = b.y as f32 + b.height as f32 * 0.5 - mid.1;
        dx * dx + dy * dy
    };

    // Stable: ties keep row-major order
    buckets.sort_by(|a, b| dist_sq(a).total_cmp(&dist_sq(b)));
}

/// Trace every pixel of `bucket`, row by row.
pub fn render_bucket(
    bucket: &Bucket,
    camera: &Camera,
    world: &World,
    config: &RenderConfig,
    frame: u32,
) -> Vec<Color> {
    (bucket.y..bucket.y + bucket.height)
        .flat_map(|y| (bucket.x..bucket.x + bucket.width).map(move |x| (x, y)))
        .map(|(x, y)| render_pixel(camera, world, x, y, config, frame))
        .collect()
}

/// A finished tile: its pixels in row-major order.
#[derive(Debug, Clone)]
pub struct BucketResult {
    pub bucket: Bucket,
    pub pixels: Vec<Color>,
}

impl BucketResult {
    pub fn new(bucket: Bucket, pixels: Vec<Color>) -> Self {
        Self { bucket, pixels }
    }

    /// Copy the bucket's pixels into their place in `image`.
    pub fn write_to(&self, image: &mut ImageBuffer) {
        let b = &self.bucket;
        for (row, chunk) in self.pixels.chunks(b.width as usize).enumerate() {
            for (col, color) in chunk.iter().enumerate() {
                image.set(b.x + col as u32, b.y + row as u32, *color);
            }
        }
    }
}

/// Render the whole image with buckets spread across the rayon thread pool.
///
/// The world is shared read-only between workers. Every pixel seeds its own
/// sampler, so the result matches [`render`](crate::render) exactly.
pub fn render_parallel(
    camera: &Camera,
    world: &World,
    config: &RenderConfig,
    bucket_size: u32,
    frame: u32,
) -> ImageBuffer {
    let buckets = generate_buckets(config.width, config.height, bucket_size);
    log::debug!(
        "Rendering {} buckets of up to {}px on {} threads",
        buckets.len(),
        bucket_size,
        rayon::current_num_threads()
    );

    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| BucketResult::new(*bucket, render_bucket(bucket, camera, world, config, frame)))
        .collect();

    let mut image = ImageBuffer::new(config.width, config.height);
    for result in &results {
        result.write_to(&mut image);
    }
    image
}
