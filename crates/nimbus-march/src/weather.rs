//! Weather map: a 2D RGBA control texture.
//!
//! Channels: r = coverage, g = secondary coverage, b = cloud-top height factor,
//! a = density multiplier.

use fastnoise_lite::{FastNoiseLite, NoiseType};
use nimbus_volume::MalformedResourceError;

use crate::texture::{Sampler2D, WrapMode, bilinear};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WeatherSample {
    pub coverage: f32,
    pub secondary: f32,
    pub top: f32,
    pub density: f32,
}

impl From<[f32; 4]> for WeatherSample {
    #[inline]
    fn from(c: [f32; 4]) -> Self {
        Self {
            coverage: c[0],
            secondary: c[1],
            top: c[2],
            density: c[3],
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WeatherTexture {
    width: usize,
    height: usize,
    data: Vec<u8>,
    wrap: WrapMode,
}

impl WeatherTexture {
    /// Wraps tightly packed RGBA8 rows; the buffer must be exactly `width·height·4` bytes.
    pub fn from_rgba8(
        width: usize,
        height: usize,
        data: Vec<u8>,
    ) -> Result<Self, MalformedResourceError> {
        let expected = width * height * 4;
        if data.len() != expected || expected == 0 {
            return Err(MalformedResourceError {
                resource: "weather map",
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
            wrap: WrapMode::Repeat,
        })
    }

    /// A single-texel map with the same value everywhere.
    pub fn uniform(texel: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            data: texel.to_vec(),
            wrap: WrapMode::Repeat,
        }
    }

    pub fn with_wrap(mut self, wrap: WrapMode) -> Self {
        self.wrap = wrap;
        self
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn texel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * self.width + x) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    #[inline]
    pub fn weather(&self, u: f32, v: f32) -> WeatherSample {
        WeatherSample::from(self.sample(u, v))
    }

    /// Synthesizes a square weather map from OpenSimplex2 noise, one generator per channel.
    pub fn procedural(size: usize, seed: i32) -> Self {
        let size = size.max(1);
        let make = |salt: i32, freq: f32| {
            let mut n = FastNoiseLite::with_seed(seed ^ salt);
            n.set_noise_type(Some(NoiseType::OpenSimplex2));
            n.set_frequency(Some(freq));
            n
        };
        let coverage = make(0x05EE_D001, 4.0);
        let secondary = make(0x0BAD_CAFE, 7.0);
        let top = make(0x1203_5F31, 2.5);
        let density = make(0x7ACE_0FF1, 3.0);

        let unit = |n: &FastNoiseLite, x: f32, y: f32| fbm2(n, x, y, 3) * 0.5 + 0.5;
        let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;

        let mut data = Vec::with_capacity(size * size * 4);
        for row in 0..size {
            for col in 0..size {
                let x = (col as f32 + 0.5) / size as f32;
                let y = (row as f32 + 0.5) / size as f32;
                // Sharpen coverage so there is clear sky between cells.
                let c = ((unit(&coverage, x, y) - 0.35) / 0.4).clamp(0.0, 1.0);
                data.extend_from_slice(&[
                    to_u8(c),
                    to_u8(unit(&secondary, x, y)),
                    to_u8(0.3 + 0.7 * unit(&top, x, y)),
                    to_u8(0.35 + 0.65 * unit(&density, x, y)),
                ]);
            }
        }
        log::debug!(target: "weather", "generated {size}x{size} procedural weather map (seed {seed})");
        Self {
            width: size,
            height: size,
            data,
            wrap: WrapMode::Repeat,
        }
    }
}

impl Sampler2D for WeatherTexture {
    #[inline]
    fn sample(&self, u: f32, v: f32) -> [f32; 4] {
        bilinear(u, v, self.width, self.height, self.wrap, |x, y| self.texel(x, y))
    }
}

fn fbm2(noise: &FastNoiseLite, x: f32, y: f32, octaves: u32) -> f32 {
    let mut amp = 1.0_f32;
    let mut freq = 1.0_f32;
    let mut sum = 0.0_f32;
    let mut max_amp = 0.0_f32;
    for _ in 0..octaves.max(1) {
        sum += noise.get_noise_2d(x * freq, y * freq) * amp;
        max_amp += amp;
        amp *= 0.5;
        freq *= 2.0;
    }
    sum / max_amp
}
