//! Texture-style lookups with normalized coordinates, wrap modes and linear filtering.
//!
//! Texel centers sit at `(i + 0.5) / n`, matching GPU sampling, so a CPU render
//! lines up with what a shader would see for the same data.

use std::sync::Arc;

use nimbus_geom::Vec3;
use nimbus_volume::DetailVolume;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum WrapMode {
    #[default]
    Repeat,
    MirroredRepeat,
    ClampToEdge,
}

impl WrapMode {
    /// Maps any integer texel index into `0..n`.
    #[inline]
    pub fn wrap(self, i: i64, n: usize) -> usize {
        let n = n as i64;
        let w = match self {
            WrapMode::Repeat => i.rem_euclid(n),
            WrapMode::MirroredRepeat => {
                let m = i.rem_euclid(2 * n);
                if m >= n { 2 * n - 1 - m } else { m }
            }
            WrapMode::ClampToEdge => i.clamp(0, n - 1),
        };
        w as usize
    }
}

/// A 2D lookup returning four channels in [0,1].
pub trait Sampler2D: Send + Sync {
    fn sample(&self, u: f32, v: f32) -> [f32; 4];
}

/// A 3D lookup returning four channels in [0,1].
pub trait Sampler3D: Send + Sync {
    fn sample(&self, p: Vec3) -> [f32; 4];
}

impl<T: Sampler2D + ?Sized> Sampler2D for Arc<T> {
    #[inline]
    fn sample(&self, u: f32, v: f32) -> [f32; 4] {
        (**self).sample(u, v)
    }
}

impl<T: Sampler3D + ?Sized> Sampler3D for Arc<T> {
    #[inline]
    fn sample(&self, p: Vec3) -> [f32; 4] {
        (**self).sample(p)
    }
}

// Lower texel index and blend weight along one axis. The index is folded
// into one wrap period (or just outside the edge for clamping) while still a
// float, so huge coordinates never reach the integer cast.
#[inline]
fn linear_coord(t: f32, n: usize, wrap: WrapMode) -> (i64, f32) {
    let x = t * n as f32 - 0.5;
    let x = if x.is_finite() { x } else { 0.0 };
    let i = x.floor();
    let frac = (x - i).clamp(0.0, 1.0);
    let i = match wrap {
        WrapMode::ClampToEdge => i.clamp(-1.0, n as f32),
        WrapMode::Repeat | WrapMode::MirroredRepeat => i.rem_euclid(2.0 * n as f32),
    };
    (i as i64, frac)
}

#[inline]
fn lerp4(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
    std::array::from_fn(|c| a[c] + (b[c] - a[c]) * t)
}

#[inline]
fn unorm(texel: [u8; 4]) -> [f32; 4] {
    texel.map(|v| f32::from(v) / 255.0)
}

/// Bilinear fetch over a `width × height` grid of RGBA8 texels.
pub(crate) fn bilinear<F>(u: f32, v: f32, width: usize, height: usize, wrap: WrapMode, fetch: F) -> [f32; 4]
where
    F: Fn(usize, usize) -> [u8; 4],
{
    let (x0, tx) = linear_coord(u, width, wrap);
    let (y0, ty) = linear_coord(v, height, wrap);
    let xa = wrap.wrap(x0, width);
    let xb = wrap.wrap(x0 + 1, width);
    let ya = wrap.wrap(y0, height);
    let yb = wrap.wrap(y0 + 1, height);
    let top = lerp4(unorm(fetch(xa, ya)), unorm(fetch(xb, ya)), tx);
    let bottom = lerp4(unorm(fetch(xa, yb)), unorm(fetch(xb, yb)), tx);
    lerp4(top, bottom, ty)
}

/// Trilinear sampler over a baked [`DetailVolume`], mirrored-repeat by default.
#[derive(Clone, Debug)]
pub struct VolumeTexture {
    volume: Arc<DetailVolume>,
    wrap: WrapMode,
}

impl VolumeTexture {
    pub fn new(volume: Arc<DetailVolume>) -> Self {
        Self {
            volume,
            wrap: WrapMode::MirroredRepeat,
        }
    }
}

impl Sampler3D for VolumeTexture {
    fn sample(&self, p: Vec3) -> [f32; 4] {
        let n = self.volume.size();
        let (x0, tx) = linear_coord(p.x, n, self.wrap);
        let (y0, ty) = linear_coord(p.y, n, self.wrap);
        let (z0, tz) = linear_coord(p.z, n, self.wrap);
        let xs = [self.wrap.wrap(x0, n), self.wrap.wrap(x0 + 1, n)];
        let ys = [self.wrap.wrap(y0, n), self.wrap.wrap(y0 + 1, n)];
        let zs = [self.wrap.wrap(z0, n), self.wrap.wrap(z0 + 1, n)];
        let at = |ix: usize, iy: usize, iz: usize| unorm(self.volume.voxel(xs[ix], ys[iy], zs[iz]));

        let c00 = lerp4(at(0, 0, 0), at(1, 0, 0), tx);
        let c10 = lerp4(at(0, 1, 0), at(1, 1, 0), tx);
        let c01 = lerp4(at(0, 0, 1), at(1, 0, 1), tx);
        let c11 = lerp4(at(0, 1, 1), at(1, 1, 1), tx);
        let c0 = lerp4(c00, c10, ty);
        let c1 = lerp4(c01, c11, ty);
        lerp4(c0, c1, tz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_volume(n: usize) -> Arc<DetailVolume> {
        let mut data = Vec::with_capacity(DetailVolume::byte_len(n));
        for _z in 0..n {
            for _y in 0..n {
                for x in 0..n {
                    let v = (x * 255 / (n - 1)) as u8;
                    data.extend_from_slice(&[v, 255 - v, 0, 255]);
                }
            }
        }
        Arc::new(DetailVolume::from_bytes(n, data).unwrap())
    }

    #[test]
    fn wrap_modes() {
        assert_eq!(WrapMode::Repeat.wrap(-1, 4), 3);
        assert_eq!(WrapMode::Repeat.wrap(9, 4), 1);
        assert_eq!(WrapMode::MirroredRepeat.wrap(-1, 4), 0);
        assert_eq!(WrapMode::MirroredRepeat.wrap(4, 4), 3);
        assert_eq!(WrapMode::MirroredRepeat.wrap(5, 4), 2);
        assert_eq!(WrapMode::MirroredRepeat.wrap(8, 4), 0);
        assert_eq!(WrapMode::ClampToEdge.wrap(-7, 4), 0);
        assert_eq!(WrapMode::ClampToEdge.wrap(7, 4), 3);
    }

    #[test]
    fn texel_centers_return_exact_values() {
        let tex = VolumeTexture::new(ramp_volume(4));
        // center of texel x=1 is 1.5/4
        let s = tex.sample(Vec3::new(1.5 / 4.0, 0.5 / 4.0, 0.5 / 4.0));
        assert!((s[0] - 85.0 / 255.0).abs() < 1e-5);
        assert!((s[1] - 170.0 / 255.0).abs() < 1e-5);
        assert!((s[3] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn midway_between_texels_blends() {
        let tex = VolumeTexture::new(ramp_volume(4));
        let s = tex.sample(Vec3::new(2.0 / 4.0, 0.5 / 4.0, 0.5 / 4.0));
        assert!((s[0] - 127.5 / 255.0).abs() < 1e-5);
    }

    #[test]
    fn mirrored_volume_is_symmetric_across_tile_edge() {
        let tex = VolumeTexture::new(ramp_volume(4));
        let a = tex.sample(Vec3::new(0.9, 0.3, 0.3));
        let b = tex.sample(Vec3::new(1.1, 0.3, 0.3));
        for c in 0..4 {
            assert!((a[c] - b[c]).abs() < 1e-5);
        }
    }

    #[test]
    fn huge_coordinates_stay_in_range() {
        let tex = VolumeTexture::new(ramp_volume(4));
        for p in [
            Vec3::new(1e20, 0.5, 0.5),
            Vec3::new(-1e20, 3e19, f32::MAX),
            Vec3::new(f32::MIN, f32::INFINITY, f32::NAN),
        ] {
            let s = tex.sample(p);
            assert!(s.iter().all(|c| (0.0..=1.0).contains(c)), "{p:?} -> {s:?}");
        }
        let fetch = |x: usize, y: usize| [(x * 60) as u8, (y * 60) as u8, 0, 255];
        for wrap in [WrapMode::Repeat, WrapMode::MirroredRepeat, WrapMode::ClampToEdge] {
            let s = bilinear(1e30, -1e30, 3, 2, wrap, fetch);
            assert!(s.iter().all(|c| (0.0..=1.0).contains(c)));
        }
    }

    #[test]
    fn repeat_is_periodic() {
        let fetch = |x: usize, _y: usize| [(x * 50) as u8, 0, 0, 0];
        let a = bilinear(0.3, 0.5, 4, 1, WrapMode::Repeat, fetch);
        let b = bilinear(7.3, 0.5, 4, 1, WrapMode::Repeat, fetch);
        assert!((a[0] - b[0]).abs() < 1e-4);
    }

    #[test]
    fn bilinear_clamp_holds_edge() {
        let fetch = |x: usize, _y: usize| [(x * 100) as u8, 0, 0, 0];
        let s = bilinear(-3.0, 0.5, 3, 2, WrapMode::ClampToEdge, fetch);
        assert_eq!(s[0], 0.0);
        let s = bilinear(5.0, 0.5, 3, 2, WrapMode::ClampToEdge, fetch);
        assert!((s[0] - 200.0 / 255.0).abs() < 1e-6);
    }
}
