#![forbid(unsafe_code)]

mod commands;
mod config;

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "nimbus", version, about = "Bake cloud noise volumes and raymarch cloud frames")]
struct Cli {
    /// TOML config; missing files fall back to defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Bake the 4-channel detail noise volume
    Bake {
        #[arg(long)]
        out: PathBuf,
        #[arg(long)]
        size: Option<usize>,
        #[arg(long)]
        seed: Option<u32>,
        /// Also bake the low-resolution erosion companion volume here
        #[arg(long)]
        companion: Option<PathBuf>,
    },
    /// Generate a procedural weather map PNG
    Weather {
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value_t = 256)]
        size: usize,
        #[arg(long)]
        seed: Option<u32>,
    },
    /// Raymarch one frame to a PNG
    Render {
        #[arg(long)]
        volume: PathBuf,
        #[arg(long)]
        weather: Option<PathBuf>,
        #[arg(long)]
        out: PathBuf,
        /// Edge length the volume was baked with
        #[arg(long)]
        size: Option<usize>,
        #[arg(long)]
        width: Option<usize>,
        #[arg(long)]
        height: Option<usize>,
        #[arg(long)]
        time: Option<f32>,
    },
    /// Print per-channel statistics of a baked volume
    Inspect {
        #[arg(long)]
        volume: PathBuf,
        #[arg(long)]
        size: Option<usize>,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let mut cfg = config::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Command::Bake {
            out,
            size,
            seed,
            companion,
        } => {
            if let Some(size) = size {
                cfg.bake.size = size;
            }
            if let Some(seed) = seed {
                cfg.bake.seed = seed;
            }
            cfg.validate()?;
            commands::bake(&cfg, &out, companion.as_deref())
        }
        Command::Weather { out, size, seed } => {
            commands::weather(&out, size, seed.unwrap_or(cfg.bake.seed))
        }
        Command::Render {
            volume,
            weather,
            out,
            size,
            width,
            height,
            time,
        } => {
            if let Some(size) = size {
                cfg.bake.size = size;
            }
            if let Some(w) = width {
                cfg.render.width = w;
            }
            if let Some(h) = height {
                cfg.render.height = h;
            }
            if let Some(t) = time {
                cfg.render.time = t;
            }
            cfg.validate()?;
            commands::render(&cfg, &volume, weather.as_deref(), &out)
        }
        Command::Inspect { volume, size } => {
            commands::inspect(&volume, size.unwrap_or(cfg.bake.size))
        }
    }
}
