//! Baked 4-channel detail volume: generation, storage layout, and persistence.
#![forbid(unsafe_code)]

pub mod bake;
mod error;
pub mod persist;
mod volume;

pub use bake::{ChannelRecipe, VolumeRecipe, bake};
pub use error::{BakeError, LoadError, MalformedResourceError, PersistenceError};
pub use persist::{load_volume, save_volume};
pub use volume::{CHANNELS, DetailVolume};

/// Edge length of the main detail volume.
pub const DETAIL_SIZE: usize = 128;
/// Edge length of the high-frequency companion volume.
pub const COMPANION_SIZE: usize = 32;
