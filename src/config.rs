use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::Path;

use nimbus_geom::{Aabb, Vec3};
use nimbus_march::{CloudParams, DensityStage, FrameSpec, MarchConfig, Wind, WrapMode};
use nimbus_volume::{COMPANION_SIZE, DETAIL_SIZE};

/// A config value outside the range the pipeline can work with.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid [{section}] {key} = {value}: expected {expected}")]
pub struct ConfigError {
    pub section: &'static str,
    pub key: &'static str,
    pub value: f64,
    pub expected: &'static str,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NimbusConfig {
    #[serde(default)]
    pub bake: Bake,
    #[serde(default)]
    pub clouds: Clouds,
    #[serde(default)]
    pub region: Region,
    #[serde(default)]
    pub wind: WindConfig,
    #[serde(default)]
    pub march: March,
    #[serde(default)]
    pub render: Render,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Bake {
    #[serde(default = "default_seed")]
    pub seed: u32,
    #[serde(default = "default_size")]
    pub size: usize,
    #[serde(default = "default_companion_size")]
    pub companion_size: usize,
}
fn default_seed() -> u32 {
    3000
}
fn default_size() -> usize {
    DETAIL_SIZE
}
fn default_companion_size() -> usize {
    COMPANION_SIZE
}
impl Default for Bake {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            size: default_size(),
            companion_size: default_companion_size(),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    BaseRamp,
    TopRamp,
    Weather,
    WeatherMap,
}

impl From<Stage> for DensityStage {
    fn from(s: Stage) -> Self {
        match s {
            Stage::BaseRamp => DensityStage::BaseRamp,
            Stage::TopRamp => DensityStage::TopRamp,
            Stage::Weather => DensityStage::Weather,
            Stage::WeatherMap => DensityStage::WeatherMap,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Wrap {
    #[default]
    Repeat,
    MirroredRepeat,
    ClampToEdge,
}

impl From<Wrap> for WrapMode {
    fn from(w: Wrap) -> Self {
        match w {
            Wrap::Repeat => WrapMode::Repeat,
            Wrap::MirroredRepeat => WrapMode::MirroredRepeat,
            Wrap::ClampToEdge => WrapMode::ClampToEdge,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Clouds {
    #[serde(default = "default_coverage")]
    pub coverage: f32,
    #[serde(default = "default_density")]
    pub density: f32,
    #[serde(default = "default_light_absorption")]
    pub light_absorption: f32,
    #[serde(default = "default_detail_scale")]
    pub detail_scale: f32,
    #[serde(default = "default_density_stages")]
    pub density_stages: Vec<Stage>,
    #[serde(default)]
    pub weather_wrap: Wrap,
}
fn default_coverage() -> f32 {
    1.0
}
fn default_density() -> f32 {
    0.2
}
fn default_light_absorption() -> f32 {
    1.0
}
fn default_detail_scale() -> f32 {
    1.5
}
fn default_density_stages() -> Vec<Stage> {
    vec![Stage::BaseRamp, Stage::TopRamp, Stage::Weather]
}
impl Default for Clouds {
    fn default() -> Self {
        Self {
            coverage: default_coverage(),
            density: default_density(),
            light_absorption: default_light_absorption(),
            detail_scale: default_detail_scale(),
            density_stages: default_density_stages(),
            weather_wrap: Wrap::default(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Region {
    #[serde(default = "default_region_min")]
    pub min: [f32; 3],
    #[serde(default = "default_region_max")]
    pub max: [f32; 3],
}
fn default_region_min() -> [f32; 3] {
    [-5.0, 0.0, -5.0]
}
fn default_region_max() -> [f32; 3] {
    [5.0, 1.0, 5.0]
}
impl Default for Region {
    fn default() -> Self {
        Self {
            min: default_region_min(),
            max: default_region_max(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct WindConfig {
    #[serde(default = "default_wind_direction")]
    pub direction: [f32; 3],
    #[serde(default = "default_wind_speed")]
    pub speed: f32,
    #[serde(default)]
    pub animate: bool,
}
fn default_wind_direction() -> [f32; 3] {
    [1.0, 0.0, 0.0]
}
fn default_wind_speed() -> f32 {
    0.1
}
impl Default for WindConfig {
    fn default() -> Self {
        Self {
            direction: default_wind_direction(),
            speed: default_wind_speed(),
            animate: false,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct March {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    #[serde(default = "default_interval")]
    pub interval: f32,
    #[serde(default = "default_inside_step_divisor")]
    pub inside_step_divisor: f32,
    #[serde(default = "default_opacity_divisor")]
    pub opacity_divisor: f32,
}
fn default_max_iterations() -> u32 {
    256
}
fn default_interval() -> f32 {
    0.005
}
fn default_inside_step_divisor() -> f32 {
    4.0
}
fn default_opacity_divisor() -> f32 {
    5.0
}
impl Default for March {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            interval: default_interval(),
            inside_step_divisor: default_inside_step_divisor(),
            opacity_divisor: default_opacity_divisor(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Render {
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default = "default_height")]
    pub height: usize,
    #[serde(default = "default_camera")]
    pub camera: [f32; 3],
    #[serde(default)]
    pub time: f32,
}
fn default_width() -> usize {
    320
}
fn default_height() -> usize {
    180
}
fn default_camera() -> [f32; 3] {
    [0.0, 0.0, 2.0]
}
impl Default for Render {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            camera: default_camera(),
            time: 0.0,
        }
    }
}

impl NimbusConfig {
    pub fn cloud_params(&self) -> CloudParams {
        CloudParams {
            coverage: self.clouds.coverage,
            density: self.clouds.density,
            light_absorption: self.clouds.light_absorption,
            detail_scale: self.clouds.detail_scale,
            stages: self
                .clouds
                .density_stages
                .iter()
                .copied()
                .map(DensityStage::from)
                .collect(),
        }
    }

    pub fn weather_wrap(&self) -> WrapMode {
        self.clouds.weather_wrap.into()
    }

    /// Rejects values that would make a bake unreadable or a march degenerate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let b = &self.bake;
        check(b.size >= 1, "bake", "size", b.size as f64, "at least 1")?;
        check(b.companion_size >= 1, "bake", "companion_size", b.companion_size as f64, "at least 1")?;

        let c = &self.clouds;
        check((0.0..=1.0).contains(&c.coverage), "clouds", "coverage", c.coverage.into(), "in [0, 1]")?;
        check(c.density > 0.0 && c.density <= 1.0, "clouds", "density", c.density.into(), "in (0, 1]")?;
        check(
            c.light_absorption.is_finite() && c.light_absorption >= 0.0,
            "clouds",
            "light_absorption",
            c.light_absorption.into(),
            "finite and >= 0",
        )?;
        positive(c.detail_scale, "clouds", "detail_scale")?;

        for axis in 0..3 {
            let (lo, hi) = (self.region.min[axis], self.region.max[axis]);
            check(lo.is_finite(), "region", "min", lo.into(), "finite")?;
            check(hi.is_finite() && hi >= lo, "region", "max", hi.into(), "finite and >= min")?;
            check(self.wind.direction[axis].is_finite(), "wind", "direction", self.wind.direction[axis].into(), "finite")?;
            check(self.render.camera[axis].is_finite(), "render", "camera", self.render.camera[axis].into(), "finite")?;
        }
        check(self.wind.speed.is_finite(), "wind", "speed", self.wind.speed.into(), "finite")?;

        let m = &self.march;
        positive(m.interval, "march", "interval")?;
        positive(m.inside_step_divisor, "march", "inside_step_divisor")?;
        positive(m.opacity_divisor, "march", "opacity_divisor")?;

        let r = &self.render;
        check(r.width >= 1, "render", "width", r.width as f64, "at least 1")?;
        check(r.height >= 1, "render", "height", r.height as f64, "at least 1")?;
        check(r.time.is_finite(), "render", "time", r.time.into(), "finite")?;
        Ok(())
    }

    pub fn region(&self) -> Aabb {
        Aabb::new(
            Vec3::from_array(self.region.min),
            Vec3::from_array(self.region.max),
        )
    }

    pub fn wind(&self) -> Wind {
        Wind {
            direction: Vec3::from_array(self.wind.direction),
            speed: self.wind.speed,
            animate: self.wind.animate,
        }
    }

    pub fn march(&self) -> MarchConfig {
        MarchConfig {
            max_iterations: self.march.max_iterations,
            interval: self.march.interval,
            inside_step_divisor: self.march.inside_step_divisor,
            opacity_divisor: self.march.opacity_divisor,
        }
    }

    pub fn frame(&self) -> FrameSpec {
        FrameSpec {
            width: self.render.width,
            height: self.render.height,
            camera: Vec3::from_array(self.render.camera),
        }
    }
}

fn check(
    ok: bool,
    section: &'static str,
    key: &'static str,
    value: f64,
    expected: &'static str,
) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError {
            section,
            key,
            value,
            expected,
        })
    }
}

fn positive(v: f32, section: &'static str, key: &'static str) -> Result<(), ConfigError> {
    check(v.is_finite() && v > 0.0, section, key, v.into(), "finite and > 0")
}

pub fn load_config_from_path(path: &Path) -> Result<NimbusConfig, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    let cfg: NimbusConfig = toml::from_str(&s)?;
    cfg.validate()?;
    Ok(cfg)
}

/// Reads `path` when it exists; a missing file yields defaults. Parse errors still fail.
pub fn load_or_default(path: Option<&Path>) -> Result<NimbusConfig, Box<dyn Error>> {
    match path {
        Some(p) if p.exists() => {
            let cfg = load_config_from_path(p)?;
            log::info!(target: "config", "loaded {}", p.display());
            Ok(cfg)
        }
        Some(p) => {
            log::warn!(target: "config", "{} not found; using defaults", p.display());
            Ok(NimbusConfig::default())
        }
        None => Ok(NimbusConfig::default()),
    }
}
