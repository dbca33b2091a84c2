use std::io;
use std::path::PathBuf;

/// Writing a baked volume failed. The previously published file, if any, is untouched.
#[derive(Debug, thiserror::Error)]
#[error("failed to persist {}: {source}", path.display())]
pub struct PersistenceError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// A resource had the wrong size for the dimensions the consumer expects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed {resource}: expected {expected} bytes, found {actual}")]
pub struct MalformedResourceError {
    pub resource: &'static str,
    pub expected: usize,
    pub actual: usize,
}

/// A recipe that cannot produce a loadable volume.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BakeError {
    #[error("volume edge length must be at least 1")]
    EmptyVolume,
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Malformed(#[from] MalformedResourceError),
}
