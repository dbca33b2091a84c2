//! Headerless volume files: `size³·4` bytes, dimensions agreed out of band.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{LoadError, PersistenceError};
use crate::volume::DetailVolume;

/// Writes `volume` to `path` atomically: bytes go to a sibling temp file which
/// is synced and then renamed over the target.
pub fn save_volume(path: &Path, volume: &DetailVolume) -> Result<(), PersistenceError> {
    let tmp = temp_path(path);
    let fail = |source| PersistenceError {
        path: path.to_path_buf(),
        source,
    };

    if let Err(source) = write_synced(&tmp, volume.as_bytes()) {
        let _ = fs::remove_file(&tmp);
        return Err(fail(source));
    }
    if let Err(source) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(fail(source));
    }
    log::info!(
        target: "persist",
        "wrote {} ({} bytes, {}^3)",
        path.display(),
        volume.as_bytes().len(),
        volume.size()
    );
    Ok(())
}

/// Reads a volume of edge `size`, failing fast if the file length disagrees.
pub fn load_volume(path: &Path, size: usize) -> Result<DetailVolume, LoadError> {
    let data = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let volume = DetailVolume::from_bytes(size, data)?;
    log::debug!(target: "persist", "loaded {} ({size}^3)", path.display());
    Ok(volume)
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut f = File::create(path)?;
    f.write_all(bytes)?;
    f.sync_all()
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_else(|| "volume".as_ref()));
    name.push(format!(".{}.tmp", std::process::id()));
    path.with_file_name(name)
}
