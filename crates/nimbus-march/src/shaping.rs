//! Remap-and-clamp curves that shape cloud density by height.

use crate::weather::WeatherSample;

/// Bottom of the cloud layer that fades in from zero.
pub const BASE_FADE: f32 = 0.07;
/// Added to the weather map's top channel to get the fade-out height.
pub const TOP_OFFSET: f32 = 0.12;

/// Linear remap of `v` from `[lo, hi]` to `[ln, hn]`, unclamped.
///
/// A degenerate input range acts as a step at `lo`: `ln` below it, `hn` at or above.
#[inline]
pub fn remap(v: f32, lo: f32, hi: f32, ln: f32, hn: f32) -> f32 {
    if hi == lo {
        return if v < lo { ln } else { hn };
    }
    ln + (v - lo) * (hn - ln) / (hi - lo)
}

#[inline]
pub fn saturate(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

/// Round the cloud base over the bottom 7% and fade out toward the
/// weather-driven top.
#[inline]
pub fn height_alter(ph: f32, map: &WeatherSample) -> f32 {
    let base = saturate(remap(ph, 0.0, BASE_FADE, 0.0, 1.0));
    let stop = saturate(map.top + TOP_OFFSET);
    base * saturate(remap(ph, stop * 0.2, stop, 1.0, 0.0))
}

/// One multiplicative step of the density-alteration curve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DensityStage {
    /// Suppress density in the lowest 20% of the layer.
    BaseRamp,
    /// Suppress density in the top 10% of the layer.
    TopRamp,
    /// Scale by the weather map density channel and the global density.
    Weather,
    /// Scale by the weather map density channel alone, ignoring global density.
    WeatherMap,
}

impl DensityStage {
    pub const DEFAULT_ORDER: [DensityStage; 3] = [
        DensityStage::BaseRamp,
        DensityStage::TopRamp,
        DensityStage::Weather,
    ];

    #[inline]
    fn factor(self, ph: f32, map: &WeatherSample, global_density: f32) -> f32 {
        match self {
            DensityStage::BaseRamp => saturate(remap(ph, 0.0, 0.2, 0.0, 1.0)),
            DensityStage::TopRamp => saturate(remap(ph, 0.9, 1.0, 1.0, 0.0)),
            DensityStage::Weather => global_density * map.density * 2.0,
            DensityStage::WeatherMap => map.density * 2.0,
        }
    }
}

/// Density grows with height fraction `ph`, then each stage multiplies in turn.
#[inline]
pub fn density_alter(
    ph: f32,
    map: &WeatherSample,
    global_density: f32,
    stages: &[DensityStage],
) -> f32 {
    stages
        .iter()
        .fold(ph, |acc, stage| acc * stage.factor(ph, map, global_density))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(top: f32, density: f32) -> WeatherSample {
        WeatherSample {
            coverage: 1.0,
            secondary: 0.0,
            top,
            density,
        }
    }

    #[test]
    fn remap_basic_and_inverted() {
        assert_eq!(remap(0.5, 0.0, 1.0, 0.0, 10.0), 5.0);
        assert!((remap(0.95, 0.9, 1.0, 1.0, 0.0) - 0.5).abs() < 1e-5);
        assert_eq!(remap(2.0, 0.0, 1.0, 0.0, 1.0), 2.0);
    }

    #[test]
    fn remap_degenerate_range_is_a_step() {
        assert_eq!(remap(0.2, 0.5, 0.5, 0.0, 1.0), 0.0);
        assert_eq!(remap(0.5, 0.5, 0.5, 0.0, 1.0), 1.0);
        assert_eq!(remap(0.9, 0.5, 0.5, 3.0, -3.0), -3.0);
        assert!(remap(0.0, 0.0, 0.0, 1.0, 0.0).is_finite());
    }

    #[test]
    fn height_alter_base_boundaries() {
        // Top well above so only the base ramp matters.
        let m = map(1.0, 1.0);
        assert_eq!(height_alter(0.0, &m), 0.0);
        assert!((height_alter(BASE_FADE, &m) - 1.0).abs() < 1e-6);
        assert!((height_alter(0.035, &m) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn height_alter_fades_toward_top() {
        let m = map(0.38, 1.0);
        // stop = 0.5, fade from 0.1 to 0.5
        assert!((height_alter(0.3, &m) - 0.5).abs() < 1e-5);
        assert_eq!(height_alter(0.55, &m), 0.0);
        assert_eq!(height_alter(0.8, &m), 0.0);
    }

    #[test]
    fn zero_top_channel_still_has_a_layer() {
        let m = map(0.0, 1.0);
        assert!(height_alter(0.05, &m) > 0.0);
    }

    #[test]
    fn density_alter_default_pipeline() {
        let m = map(1.0, 0.5);
        let stages = DensityStage::DEFAULT_ORDER;
        assert_eq!(density_alter(0.0, &m, 1.0, &stages), 0.0);
        assert_eq!(density_alter(1.0, &m, 1.0, &stages), 0.0);
        // ph=0.5: 0.5 * 1 * 1 * (1 * 0.5 * 2)
        assert!((density_alter(0.5, &m, 1.0, &stages) - 0.5).abs() < 1e-6);
        assert!((density_alter(0.1, &m, 0.2, &stages) - 0.1 * 0.5 * 0.2).abs() < 1e-6);
    }

    #[test]
    fn stage_order_is_configurable() {
        let m = map(1.0, 0.7);
        let a = density_alter(0.93, &m, 0.3, &DensityStage::DEFAULT_ORDER);
        let b = density_alter(
            0.93,
            &m,
            0.3,
            &[DensityStage::BaseRamp, DensityStage::Weather, DensityStage::TopRamp],
        );
        assert!((a - b).abs() < 1e-6);
        // Dropping the weather stage ignores global density entirely.
        let c = density_alter(0.5, &m, 0.01, &[DensityStage::BaseRamp, DensityStage::TopRamp]);
        assert_eq!(c, 0.5);
    }

    #[test]
    fn weather_map_stage_ignores_global_density() {
        let m = map(1.0, 0.25);
        let stages = [
            DensityStage::BaseRamp,
            DensityStage::TopRamp,
            DensityStage::WeatherMap,
        ];
        let lo = density_alter(0.5, &m, 0.01, &stages);
        let hi = density_alter(0.5, &m, 1.0, &stages);
        assert_eq!(lo, hi);
        // 0.5 * 1 * 1 * (0.25 * 2)
        assert!((lo - 0.25).abs() < 1e-6);
    }
}
