//! Cellular (Worley) noise: distances to the three nearest feature points.

use crate::NoiseField;
use crate::hash::{fnv1a3, xorshift32};

pub const DEFAULT_SEED: u32 = 3000;

// Cumulative Poisson(~4) thresholds over u32 for 1..=9 feature points per cell.
const POINT_COUNT_THRESHOLDS: [u32; 8] = [
    393_325_350,
    1_022_645_910,
    1_861_739_990,
    2_700_834_071,
    3_372_109_335,
    3_819_626_178,
    4_075_350_088,
    4_203_212_043,
];

const UNSET: f64 = 9_999_999.0;
const INV_2_32: f64 = 1.0 / 4_294_967_296.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DistanceMetric {
    /// Squared Euclidean distance.
    Euclidean,
    Manhattan,
}

impl DistanceMetric {
    #[inline]
    pub fn distance(self, a: [f64; 3], b: [f64; 3]) -> f64 {
        let d = [a[0] - b[0], a[1] - b[1], a[2] - b[2]];
        match self {
            DistanceMetric::Euclidean => d[0] * d[0] + d[1] * d[1] + d[2] * d[2],
            DistanceMetric::Manhattan => d[0].abs() + d[1].abs() + d[2].abs(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Worley {
    seed: u32,
}

impl Default for Worley {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl Worley {
    pub const fn new(seed: u32) -> Self {
        Self { seed }
    }

    /// Nearest three distances, ascending, each clamped to [0,1].
    pub fn noise(&self, p: [f64; 3], metric: DistanceMetric) -> [f64; 3] {
        self.noise_with(p, |a, b| metric.distance(a, b))
    }

    /// Same as [`Worley::noise`] with a caller-supplied distance function.
    pub fn noise_with<F>(&self, p: [f64; 3], distance: F) -> [f64; 3]
    where
        F: Fn([f64; 3], [f64; 3]) -> f64,
    {
        let base = [
            p[0].floor() as i32,
            p[1].floor() as i32,
            p[2].floor() as i32,
        ];
        let mut nearest = [UNSET; 3];

        for i in -1..=1 {
            for j in -1..=1 {
                for k in -1..=1 {
                    let cell = [base[0] + i, base[1] + j, base[2] + k];
                    self.for_each_feature_point(cell, |fp| {
                        insert_nearest(&mut nearest, distance(p, fp));
                    });
                }
            }
        }

        nearest.map(|d| d.clamp(0.0, 1.0))
    }

    /// Nearest squared-Euclidean distance.
    #[inline]
    pub fn euclidean(&self, x: f64, y: f64, z: f64) -> f64 {
        self.noise([x, y, z], DistanceMetric::Euclidean)[0]
    }

    /// Nearest Manhattan distance.
    #[inline]
    pub fn manhattan(&self, x: f64, y: f64, z: f64) -> f64 {
        self.noise([x, y, z], DistanceMetric::Manhattan)[0]
    }

    /// Feature points of one lattice cell in world space. Same seed and cell
    /// always produce the same points in the same order.
    pub fn feature_points(&self, cell: [i32; 3]) -> Vec<[f64; 3]> {
        let mut out = Vec::with_capacity(9);
        self.for_each_feature_point(cell, |fp| out.push(fp));
        out
    }

    fn for_each_feature_point(&self, cell: [i32; 3], mut f: impl FnMut([f64; 3])) {
        let mut rng = xorshift32(fnv1a3(
            (cell[0] as u32).wrapping_add(self.seed),
            cell[1] as u32,
            cell[2] as u32,
        ));
        let count = point_count(rng);
        for _ in 0..count {
            rng = xorshift32(rng);
            let ox = f64::from(rng) * INV_2_32;
            rng = xorshift32(rng);
            let oy = f64::from(rng) * INV_2_32;
            rng = xorshift32(rng);
            let oz = f64::from(rng) * INV_2_32;
            f([
                ox + f64::from(cell[0]),
                oy + f64::from(cell[1]),
                oz + f64::from(cell[2]),
            ]);
        }
    }
}

#[inline]
fn point_count(value: u32) -> usize {
    POINT_COUNT_THRESHOLDS
        .iter()
        .position(|&t| value < t)
        .map_or(9, |i| i + 1)
}

// Keeps the three smallest values seen so far, ascending.
#[inline]
fn insert_nearest(nearest: &mut [f64; 3], value: f64) {
    for i in (0..nearest.len()).rev() {
        if value > nearest[i] {
            break;
        }
        let displaced = nearest[i];
        nearest[i] = value;
        if i + 1 < nearest.len() {
            nearest[i + 1] = displaced;
        }
    }
}

/// Nearest-distance Worley as a [`NoiseField`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorleyF1 {
    pub worley: Worley,
    pub metric: DistanceMetric,
}

impl WorleyF1 {
    pub const fn euclidean(seed: u32) -> Self {
        Self {
            worley: Worley::new(seed),
            metric: DistanceMetric::Euclidean,
        }
    }
}

impl NoiseField for WorleyF1 {
    #[inline]
    fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        self.worley.noise([x, y, z], self.metric)[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_count_buckets() {
        assert_eq!(point_count(0), 1);
        assert_eq!(point_count(393_325_349), 1);
        assert_eq!(point_count(393_325_350), 2);
        assert_eq!(point_count(2_598_622_203), 4);
        assert_eq!(point_count(4_203_212_042), 8);
        assert_eq!(point_count(u32::MAX), 9);
    }

    #[test]
    fn insert_keeps_three_smallest() {
        let mut n = [UNSET; 3];
        for v in [0.5, 0.2, 0.9, 0.1, 0.3] {
            insert_nearest(&mut n, v);
        }
        assert_eq!(n, [0.1, 0.2, 0.3]);
    }

    #[test]
    fn feature_points_stay_in_cell() {
        let w = Worley::new(3000);
        for cell in [[0, 0, 0], [-3, 7, 2], [100, -100, 5]] {
            let pts = w.feature_points(cell);
            assert!((1..=9).contains(&pts.len()));
            for p in pts {
                for axis in 0..3 {
                    let lo = f64::from(cell[axis]);
                    assert!(p[axis] >= lo && p[axis] < lo + 1.0);
                }
            }
        }
        assert_eq!(w.feature_points([0, 0, 0]).len(), 4);
    }

    #[test]
    fn golden_values_seed_3000() {
        let w = Worley::new(3000);
        assert_eq!(
            w.noise([0.5, 0.25, 0.75], DistanceMetric::Euclidean),
            [0.2997571595785789, 0.37398032880836624, 0.41288050552615396]
        );
        assert_eq!(
            w.noise([0.5, 0.25, 0.75], DistanceMetric::Manhattan),
            [0.7659551529213786, 0.8552034818567336, 0.9369260456878692]
        );
        assert_eq!(
            w.noise([3.2, -1.7, 10.9], DistanceMetric::Euclidean),
            [0.13202283961265404, 0.18887805349345438, 0.32474676547075115]
        );
        assert_eq!(w.manhattan(3.2, -1.7, 10.9), 0.5090069402009247);
    }

    #[test]
    fn custom_metric_matches_enum() {
        let w = Worley::new(11);
        let p = [1.25, 4.5, -2.75];
        let custom = w.noise_with(p, |a, b| DistanceMetric::Manhattan.distance(a, b));
        assert_eq!(custom, w.noise(p, DistanceMetric::Manhattan));
    }
}
