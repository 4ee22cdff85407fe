//! Plaintext tree pass-through interface
//!
//! Provides read-only access to the source directory of a reverse mount.
//! Exclusion is applied by [`super::ReverseFs`], not here.

use crate::error::{Error, Result};
use std::ffi::OsString;
use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};

/// Directory entry from the plaintext tree
#[derive(Debug, Clone)]
pub struct LowerDirEntry {
    pub name: OsString,
    pub file_type: fs::FileType,
}

/// Pass-through interface to the plaintext source tree
#[derive(Debug, Clone)]
pub struct LowerLayer {
    /// Root path of the plaintext tree
    root: PathBuf,
}

impl LowerLayer {
    /// Create a new lower layer interface
    pub fn new(root: PathBuf) -> Result<Self> {
        if !root.is_dir() {
            return Err(Error::PathNotFound(root.to_string_lossy().to_string()));
        }
        Ok(Self { root })
    }

    /// Get the root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a root-relative path to an absolute path in the source tree
    pub fn resolve(&self, path: &str) -> PathBuf {
        let relative = path.trim_start_matches('/');
        if relative.is_empty() {
            self.root.clone()
        } else {
            self.root.join(relative)
        }
    }

    /// Get metadata for a path without following symlinks
    pub fn metadata(&self, path: &str) -> Result<Metadata> {
        let resolved = self.resolve(path);
        fs::symlink_metadata(&resolved).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::PathNotFound(path.to_string())
            } else {
                Error::Io(e)
            }
        })
    }

    /// Read directory entries
    pub fn readdir(&self, path: &str) -> Result<Vec<LowerDirEntry>> {
        let resolved = self.resolve(path);
        let mut entries = Vec::new();

        for entry in fs::read_dir(&resolved)? {
            let entry = entry?;
            entries.push(LowerDirEntry {
                name: entry.file_name(),
                file_type: entry.file_type()?,
            });
        }

        Ok(entries)
    }
}
