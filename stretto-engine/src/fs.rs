//! In-memory filesystem for staged track data

use std::collections::HashMap;
use std::sync::Arc;

use stretto_audio::{Removal, VfsError, VirtualFs};

/// Flat path → bytes store
#[derive(Debug, Default)]
pub struct MemoryFs {
    files: HashMap<String, Arc<[u8]>>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self, path: &str) -> Option<Arc<[u8]>> {
        self.files.get(path).cloned()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn check(path: &str) -> Result<(), VfsError> {
        if path.starts_with('/') && path.len() > 1 && !path.ends_with('/') {
            Ok(())
        } else {
            Err(VfsError::InvalidPath(path.to_string()))
        }
    }
}

impl VirtualFs for MemoryFs {
    fn write_file(&mut self, path: &str, bytes: &[u8]) -> Result<(), VfsError> {
        Self::check(path)?;
        self.files.insert(path.to_string(), Arc::from(bytes));
        Ok(())
    }

    fn unlink(&mut self, path: &str) -> Result<Removal, VfsError> {
        Self::check(path)?;
        Ok(match self.files.remove(path) {
            Some(_) => Removal::Removed,
            None => Removal::NotFound,
        })
    }
}
