//! Seeded Perlin and Worley noise plus the fractal combiner used to bake cloud detail.
#![forbid(unsafe_code)]

mod fractal;
mod hash;
pub mod perlin;
pub mod worley;

pub use fractal::fractal;
pub use hash::{fnv1a3, xorshift32};
pub use perlin::Perlin;
pub use worley::{DistanceMetric, Worley, WorleyF1};

/// A pure scalar field over 3D space. Implementors are immutable and shareable
/// across bake workers.
pub trait NoiseField: Send + Sync {
    fn sample(&self, x: f64, y: f64, z: f64) -> f64;

    /// Octave sum of this field, see [`fractal`].
    fn fractal(&self, x: f64, y: f64, z: f64, octaves: u32) -> f64 {
        fractal(x, y, z, octaves, |x, y, z| self.sample(x, y, z))
    }
}
