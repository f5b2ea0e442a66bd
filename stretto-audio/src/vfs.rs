//! Virtual filesystem the engine reads staged tracks from

use thiserror::Error;

/// Errors from the engine's virtual filesystem
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VfsError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    #[error("Filesystem is read-only")]
    ReadOnly,
    #[error("Filesystem error: {0}")]
    Other(String),
}

/// Outcome of an unlink request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Removed,
    /// Nothing was stored at the path. Not an error.
    NotFound,
}

/// Minimal filesystem surface the engine exposes for staging data
pub trait VirtualFs {
    /// Store `bytes` at `path`, replacing anything already there
    fn write_file(&mut self, path: &str, bytes: &[u8]) -> Result<(), VfsError>;

    /// Remove the file at `path`
    ///
    /// A missing file yields `Ok(Removal::NotFound)` so callers can clear a
    /// slot before overwriting without special-casing the first write.
    fn unlink(&mut self, path: &str) -> Result<Removal, VfsError>;
}
