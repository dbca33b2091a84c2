use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use nimbus_march::{CloudScene, Raymarcher, VolumeTexture, WeatherTexture, render_frame};
use nimbus_volume::{VolumeRecipe, bake as bake_volume, load_volume, save_volume};

use crate::config::NimbusConfig;

/// Size of the weather map synthesized when `render` is not given one.
const FALLBACK_WEATHER_SIZE: usize = 256;

pub fn bake(cfg: &NimbusConfig, out: &Path, companion: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let detail = bake_volume(&VolumeRecipe::detail(cfg.bake.size, cfg.bake.seed))?;
    save_volume(out, &detail)?;

    if let Some(path) = companion {
        let small = bake_volume(&VolumeRecipe::companion(cfg.bake.companion_size, cfg.bake.seed))?;
        save_volume(path, &small)?;
    }
    Ok(())
}

pub fn weather(out: &Path, size: usize, seed: u32) -> Result<(), Box<dyn Error>> {
    let map = WeatherTexture::procedural(size, seed as i32);
    write_rgba_png(out, map.as_bytes(), map.width(), map.height())?;
    log::info!(target: "weather", "wrote {}x{} weather map to {}", map.width(), map.height(), out.display());
    Ok(())
}

pub fn load_weather_png(path: &Path) -> Result<WeatherTexture, Box<dyn Error>> {
    let img = image::open(path)?.to_rgba8();
    let (w, h) = img.dimensions();
    Ok(WeatherTexture::from_rgba8(w as usize, h as usize, img.into_raw())?)
}

pub fn render(
    cfg: &NimbusConfig,
    volume: &Path,
    weather: Option<&Path>,
    out: &Path,
) -> Result<(), Box<dyn Error>> {
    let start = Instant::now();
    let detail = Arc::new(load_volume(volume, cfg.bake.size)?);
    let weather = match weather {
        Some(p) => load_weather_png(p)?,
        None => {
            log::warn!(target: "render", "no weather map given; generating one from seed {}", cfg.bake.seed);
            WeatherTexture::procedural(FALLBACK_WEATHER_SIZE, cfg.bake.seed as i32)
        }
    }
    .with_wrap(cfg.weather_wrap());

    let params = cfg.cloud_params();
    let light_absorption = params.light_absorption;
    let spec = cfg.frame();
    let scene = CloudScene::new(cfg.region(), weather, VolumeTexture::new(detail), params)
        .with_wind(cfg.wind(), cfg.render.time);
    let marcher = Raymarcher::new(cfg.march());

    let image = render_frame(&spec, scene.region, &scene, &marcher);
    log::info!(target: "render", "mean opacity {:.4}", image.mean());
    write_rgba_png(out, &image.to_rgba8(light_absorption), spec.width, spec.height)?;
    log::info!(target: "render", "wrote {} in {:.2?}", out.display(), start.elapsed());
    Ok(())
}

pub fn inspect(volume: &Path, size: usize) -> Result<(), Box<dyn Error>> {
    let v = load_volume(volume, size)?;
    println!("{}: {size}^3 voxels, {} bytes", volume.display(), v.as_bytes().len());
    for (name, (min, max, mean)) in ["r", "g", "b", "a"].iter().zip(v.channel_stats()) {
        println!("  {name}: min {min:3} max {max:3} mean {mean:7.2}");
    }
    Ok(())
}

fn write_rgba_png(path: &Path, data: &[u8], width: usize, height: usize) -> Result<(), Box<dyn Error>> {
    image::save_buffer(
        path,
        data,
        u32::try_from(width)?,
        u32::try_from(height)?,
        image::ColorType::Rgba8,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("nimbus-cli-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn small_config() -> NimbusConfig {
        let mut cfg = NimbusConfig::default();
        cfg.bake.size = 8;
        cfg.bake.companion_size = 4;
        cfg.render.width = 8;
        cfg.render.height = 6;
        cfg
    }

    #[test]
    fn weather_png_round_trips() {
        let dir = scratch_dir("weather");
        let path = dir.join("weather.png");
        weather(&path, 16, 5).unwrap();
        let loaded = load_weather_png(&path).unwrap();
        assert_eq!(loaded, WeatherTexture::procedural(16, 5));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn bake_then_render_then_inspect() {
        let dir = scratch_dir("pipeline");
        let cfg = small_config();
        let vol = dir.join("detail.bin");
        let comp = dir.join("companion.bin");
        bake(&cfg, &vol, Some(&comp)).unwrap();
        assert_eq!(fs::metadata(&vol).unwrap().len(), 8 * 8 * 8 * 4);
        assert_eq!(fs::metadata(&comp).unwrap().len(), 4 * 4 * 4 * 4);

        let out = dir.join("frame.png");
        render(&cfg, &vol, None, &out).unwrap();
        let img = image::open(&out).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (8, 6));

        inspect(&vol, 8).unwrap();
        assert!(inspect(&vol, 16).is_err());

        let mut sized = cfg.clone();
        sized.bake.size = 16;
        assert!(render(&sized, &vol, None, &out).is_err());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn zero_size_bake_writes_nothing() {
        let dir = scratch_dir("empty");
        let mut cfg = small_config();
        cfg.bake.size = 0;
        let vol = dir.join("detail.bin");
        assert!(bake(&cfg, &vol, None).is_err());
        assert!(!vol.exists());
        fs::remove_dir_all(&dir).unwrap();
    }
}
