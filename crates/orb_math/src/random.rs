//! Deterministic random sampling for ray tracing.
//!
//! A 32-bit xorshift generator plus the distributions the shading code needs
//! (unit disk, unit ball, unit sphere surface). The generator is a plain
//! value owned by the caller and passed by `&mut` into every sampling call;
//! there is no thread-local or global state, so the same seed and the same
//! call sequence always reproduce the same image.

use glam::Vec3;
use rand::RngCore;
use std::f32::consts::PI;

/// 2^24, the number of distinct values `next_f32` can return.
const FLOAT_SCALE: f32 = 16_777_216.0;

/// Xorshift PRNG with a single 32-bit word of state.
///
/// The seed must be non-zero: zero is a fixed point of the shift-xor
/// sequence and would produce zeros forever. This is not checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    /// Create a generator from a non-zero seed.
    #[inline]
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Current state word.
    #[inline]
    pub fn state(&self) -> u32 {
        self.state
    }

    #[inline]
    fn advance(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 15;
        self.state = x;
        x
    }

    /// Draw the next 32 random bits (the new state).
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        self.advance()
    }

    /// Uniform float in [0, 1) built from the low 24 bits of a draw.
    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        (self.advance() & 0x00FF_FFFF) as f32 / FLOAT_SCALE
    }

    /// Uniform point inside the unit disk on the z = 0 plane.
    ///
    /// Rejection sampling; takes about 1.27 tries on average.
    pub fn in_unit_disk(&mut self) -> Vec3 {
        loop {
            let p = 2.0 * Vec3::new(self.next_f32(), self.next_f32(), 0.0) - Vec3::new(1.0, 1.0, 0.0);
            if p.length_squared() < 1.0 {
                return p;
            }
        }
    }

    /// Uniform point inside the unit ball (rejection sampling).
    pub fn in_unit_sphere(&mut self) -> Vec3 {
        loop {
            let p = 2.0 * Vec3::new(self.next_f32(), self.next_f32(), self.next_f32()) - Vec3::ONE;
            if p.length_squared() < 1.0 {
                return p;
            }
        }
    }

    /// Uniform point on the surface of the unit sphere.
    pub fn unit_vector(&mut self) -> Vec3 {
        let z = self.next_f32() * 2.0 - 1.0;
        let a = self.next_f32() * 2.0 * PI;
        let r = (1.0 - z * z).sqrt();
        let (sin_a, cos_a) = a.sin_cos();
        Vec3::new(r * sin_a, r * cos_a, z)
    }
}

/// Lets `rand` distributions draw from the same stream.
impl RngCore for XorShift32 {
    fn next_u32(&mut self) -> u32 {
        self.advance()
    }

    fn next_u64(&mut self) -> u64 {
        let lo = u64::from(self.advance());
        let hi = u64::from(self.advance());
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.advance().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Stand-in for a zero hash, which would be a dead seed.
const ZERO_SEED_REPLACEMENT: u32 = 0x9E37_79B9;

/// Murmur3 32-bit finalizer; a bijection on `u32`.
#[inline]
fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85EB_CA6B);
    h ^= h >> 13;
    h = h.wrapping_mul(0xC2B2_AE35);
    h ^= h >> 16;
    h
}

/// Derive the seed for pixel `(x, y)` of an image `width` pixels wide.
///
/// Within one frame every pixel of an image with fewer than 2^32 pixels gets
/// its own seed: the pixel index goes through a bijective hash keyed by the
/// frame. A hash of zero is replaced by a fixed non-zero constant.
#[inline]
pub fn pixel_seed(x: u32, y: u32, width: u32, frame: u32) -> u32 {
    let index = y.wrapping_mul(width).wrapping_add(x);
    match fmix32(index ^ fmix32(frame)) {
        0 => ZERO_SEED_REPLACEMENT,
        h => h,
    }
}
