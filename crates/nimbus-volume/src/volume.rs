use crate::error::MalformedResourceError;

pub const CHANNELS: usize = 4;

/// Immutable cubic grid of RGBA8 voxels.
///
/// Layout is channel-interleaved with x varying fastest, then y, then z:
/// `((z * size + y) * size + x) * 4 + channel`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetailVolume {
    size: usize,
    data: Vec<u8>,
}

impl DetailVolume {
    #[inline]
    pub const fn byte_len(size: usize) -> usize {
        size * size * size * CHANNELS
    }

    /// Wraps a raw buffer, rejecting any length other than `size³·4`.
    pub fn from_bytes(size: usize, data: Vec<u8>) -> Result<Self, MalformedResourceError> {
        let expected = Self::byte_len(size);
        if data.len() != expected || size == 0 {
            return Err(MalformedResourceError {
                resource: "detail volume",
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { size, data })
    }

    pub(crate) fn from_parts(size: usize, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), Self::byte_len(size));
        Self { size, data }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        ((z * self.size + y) * self.size + x) * CHANNELS
    }

    #[inline]
    pub fn voxel(&self, x: usize, y: usize, z: usize) -> [u8; CHANNELS] {
        let i = self.idx(x, y, z);
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Per-channel (min, max, mean).
    pub fn channel_stats(&self) -> [(u8, u8, f64); CHANNELS] {
        let mut min = [u8::MAX; CHANNELS];
        let mut max = [0u8; CHANNELS];
        let mut sum = [0u64; CHANNELS];
        for texel in self.data.chunks_exact(CHANNELS) {
            for c in 0..CHANNELS {
                min[c] = min[c].min(texel[c]);
                max[c] = max[c].max(texel[c]);
                sum[c] += u64::from(texel[c]);
            }
        }
        let voxels = (self.data.len() / CHANNELS) as f64;
        std::array::from_fn(|c| (min[c], max[c], sum[c] as f64 / voxels))
    }
}
