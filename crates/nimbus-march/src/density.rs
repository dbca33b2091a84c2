//! World-space cloud density: weather map + detail volume + height curves.

use nimbus_geom::{Aabb, Vec3};

use crate::march::DensityField;
pub use crate::shaping::DensityStage;
use crate::shaping::{density_alter, height_alter, remap, saturate};
use crate::texture::{Sampler2D, Sampler3D};
use crate::weather::WeatherSample;

#[derive(Clone, Debug, PartialEq)]
pub struct CloudParams {
    /// Global coverage in [0,1]; 0 clears the sky.
    pub coverage: f32,
    /// Global density multiplier in (0,1].
    pub density: f32,
    /// Only used when shading opacity into a color.
    pub light_absorption: f32,
    /// World-to-texture scale for detail volume lookups.
    pub detail_scale: f32,
    pub stages: Vec<DensityStage>,
}

impl Default for CloudParams {
    fn default() -> Self {
        Self {
            coverage: 1.0,
            density: 0.2,
            light_absorption: 1.0,
            detail_scale: 1.5,
            stages: DensityStage::DEFAULT_ORDER.to_vec(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Wind {
    pub direction: Vec3,
    pub speed: f32,
    pub animate: bool,
}

impl Default for Wind {
    fn default() -> Self {
        Self {
            direction: Vec3::new(1.0, 0.0, 0.0),
            speed: 0.1,
            animate: false,
        }
    }
}

impl Wind {
    /// Texture-space displacement after `time` seconds. Zero when not animated.
    #[inline]
    pub fn offset(&self, time: f32) -> Vec3 {
        if !self.animate || !time.is_finite() {
            return Vec3::ZERO;
        }
        let dir = self.direction.normalized();
        if !dir.is_finite() {
            return Vec3::ZERO;
        }
        dir * (self.speed * time)
    }
}

/// Everything the density function reads. Immutable and shared across render threads.
pub struct CloudScene<W, V> {
    pub region: Aabb,
    pub weather: W,
    pub volume: V,
    pub params: CloudParams,
    pub wind: Wind,
    pub time: f32,
}

impl<W: Sampler2D, V: Sampler3D> CloudScene<W, V> {
    pub fn new(region: Aabb, weather: W, volume: V, params: CloudParams) -> Self {
        Self {
            region,
            weather,
            volume,
            params,
            wind: Wind::default(),
            time: 0.0,
        }
    }

    pub fn with_wind(mut self, wind: Wind, time: f32) -> Self {
        self.wind = wind;
        self.time = time;
        self
    }

    /// Local cloud density in [0,1] at world point `p`.
    pub fn density(&self, p: Vec3) -> f32 {
        if !self.region.contains_strict(p) {
            return 0.0;
        }
        let unit = self.region.unit(p);
        let ph = unit.y;
        let wind = self.wind.offset(self.time);

        let map = WeatherSample::from(self.weather.sample(unit.x + wind.x, unit.z + wind.z));
        let params = &self.params;

        let ha = height_alter(ph, &map);
        let da = density_alter(ph, &map, params.density, &params.stages);

        let sn = self.volume.sample((p + wind) * params.detail_scale);
        let low = 0.625 * sn[1] + 0.25 * sn[2] + 0.125 * sn[3] - 1.0;
        let shape = remap(sn[0], low, 1.0, 0.0, 1.0);

        let wm = map
            .coverage
            .max(saturate(params.coverage - 0.5) * map.secondary * 2.0);

        let base = saturate(remap(shape * ha, 1.0 - params.coverage * wm, 1.0, 0.0, 1.0));
        saturate(base * da)
    }
}

impl<W: Sampler2D, V: Sampler3D> DensityField for CloudScene<W, V> {
    #[inline]
    fn density(&self, p: Vec3) -> f32 {
        CloudScene::density(self, p)
    }
}
