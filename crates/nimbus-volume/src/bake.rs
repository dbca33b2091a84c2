//! Offline detail-volume baking.
//!
//! Every voxel is an independent function of its grid coordinate, so z-slices
//! are handed to rayon and written straight into disjoint parts of the output.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use nimbus_noise::{NoiseField, Perlin, WorleyF1};
use rayon::prelude::*;

use crate::DETAIL_SIZE;
use crate::error::BakeError;
use crate::volume::{CHANNELS, DetailVolume};

/// How one channel of a voxel is computed. `frequency` scales grid
/// coordinates as `coord * frequency / size`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ChannelRecipe {
    /// Midpoint-biased Perlin fractal blended with a Worley fractal.
    Shape {
        frequency: f64,
        perlin_octaves: u32,
        worley_octaves: u32,
    },
    /// Inverted Worley fractal, `255 - 255 * worley`.
    Erosion { frequency: f64, worley_octaves: u32 },
}

impl ChannelRecipe {
    #[inline]
    fn frequency(&self) -> f64 {
        match *self {
            ChannelRecipe::Shape { frequency, .. } | ChannelRecipe::Erosion { frequency, .. } => {
                frequency
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct VolumeRecipe {
    pub size: usize,
    pub seed: u32,
    pub channels: [ChannelRecipe; CHANNELS],
}

impl VolumeRecipe {
    /// Low-frequency shape in channel 0, erosion at 16/24/32 in channels 1..=3.
    pub fn detail(size: usize, seed: u32) -> Self {
        Self {
            size,
            seed,
            channels: [
                ChannelRecipe::Shape {
                    frequency: 8.0,
                    perlin_octaves: 4,
                    worley_octaves: 2,
                },
                ChannelRecipe::Erosion {
                    frequency: 16.0,
                    worley_octaves: 2,
                },
                ChannelRecipe::Erosion {
                    frequency: 24.0,
                    worley_octaves: 2,
                },
                ChannelRecipe::Erosion {
                    frequency: 32.0,
                    worley_octaves: 2,
                },
            ],
        }
    }

    /// Erosion-only companion with frequencies 8/16/24/32.
    pub fn companion(size: usize, seed: u32) -> Self {
        let erosion = |frequency| ChannelRecipe::Erosion {
            frequency,
            worley_octaves: 2,
        };
        Self {
            size,
            seed,
            channels: [erosion(8.0), erosion(16.0), erosion(24.0), erosion(32.0)],
        }
    }
}

impl Default for VolumeRecipe {
    fn default() -> Self {
        Self::detail(DETAIL_SIZE, nimbus_noise::perlin::DEFAULT_SEED)
    }
}

/// Shared generators for one bake; immutable so workers borrow them freely.
struct Generators {
    perlin: Perlin,
    worley: WorleyF1,
}

impl Generators {
    fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
            worley: WorleyF1::euclidean(seed),
        }
    }

    fn channel(&self, recipe: &ChannelRecipe, size: usize, x: usize, y: usize, z: usize) -> u8 {
        let f = recipe.frequency();
        let s = size as f64;
        let (px, py, pz) = (x as f64 * f / s, y as f64 * f / s, z as f64 * f / s);
        let value = match *recipe {
            ChannelRecipe::Shape {
                perlin_octaves,
                worley_octaves,
                ..
            } => {
                let n = 0.5 + self.perlin.fractal(px, py, pz, perlin_octaves);
                let w = self.worley.fractal(px, py, pz, worley_octaves);
                255.0 * (n + w) / 2.0
            }
            ChannelRecipe::Erosion { worley_octaves, .. } => {
                255.0 - 255.0 * self.worley.fractal(px, py, pz, worley_octaves)
            }
        };
        quantize(value)
    }
}

/// Clamp to [0,255] and truncate toward zero.
#[inline]
pub fn quantize(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, 255.0) as u8
}

/// Bakes every voxel of `recipe`. A zero edge length is rejected up front.
pub fn bake(recipe: &VolumeRecipe) -> Result<DetailVolume, BakeError> {
    let size = recipe.size;
    if size == 0 {
        return Err(BakeError::EmptyVolume);
    }
    let slice_len = size * size * CHANNELS;
    let generators = Generators::new(recipe.seed);
    let done = AtomicUsize::new(0);
    let t0 = Instant::now();

    log::info!(
        target: "bake",
        "baking {size}^3 volume (seed {}, {} worker threads)",
        recipe.seed,
        rayon::current_num_threads()
    );

    let mut data = vec![0u8; DetailVolume::byte_len(size)];
    data.par_chunks_mut(slice_len)
        .enumerate()
        .for_each(|(z, slice)| {
            for y in 0..size {
                for x in 0..size {
                    let base = (y * size + x) * CHANNELS;
                    for (c, ch) in recipe.channels.iter().enumerate() {
                        slice[base + c] = generators.channel(ch, size, x, y, z);
                    }
                }
            }
            let n = done.fetch_add(1, Ordering::Relaxed) + 1;
            log::debug!(target: "bake", "slice z={z} done ({n}/{size})");
        });

    log::info!(
        target: "bake",
        "baked {} bytes in {} ms",
        data.len(),
        t0.elapsed().as_millis()
    );

    Ok(DetailVolume::from_parts(size, data))
}
