//! Cloud density sampling and CPU raymarching over a weather map and detail volume.
#![forbid(unsafe_code)]

pub mod density;
pub mod frame;
pub mod march;
pub mod shaping;
pub mod texture;
pub mod weather;

pub use density::{CloudParams, CloudScene, DensityStage, Wind};
pub use frame::{FrameSpec, OpacityImage, pixel_ray, render_frame};
pub use march::{DensityField, MarchConfig, MarchOutcome, RayState, Raymarcher, Steps};
pub use texture::{Sampler2D, Sampler3D, VolumeTexture, WrapMode};
pub use weather::{WeatherSample, WeatherTexture};
