//! Reverse filesystem root
//!
//! Owns the exclusion state of a single reverse mount. Everything here is
//! built once before the mount starts serving and is read-only afterwards,
//! so `&ReverseFs` can be shared freely between request handlers.

use std::fs::Metadata;
use std::sync::Arc;
use tracing::{info, trace};

use super::excluder::{build_excluder, PathMatcher};
use super::lower::{LowerDirEntry, LowerLayer};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::names::{ReservedName, ReservedNames};

/// Reverse-mode filesystem root
pub struct ReverseFs {
    /// Plaintext source tree
    lower: LowerLayer,
    /// Compiled exclusion matcher, `None` when exclusion is disabled
    excluder: Option<Arc<dyn PathMatcher>>,
    /// Files that always pass on the cipher side
    reserved: ReservedNames,
}

impl ReverseFs {
    /// Create a reverse filesystem from configuration.
    ///
    /// Fails on a missing source tree, an unreadable exclude file or an
    /// invalid pattern. No partially configured filesystem is ever returned.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let lower = LowerLayer::new(config.source_dir.clone())?;
        let excluder = build_excluder(&config.exclude)?;

        info!(
            "Reverse filesystem ready on {} (exclusion {})",
            lower.root().display(),
            if excluder.is_some() { "enabled" } else { "disabled" }
        );

        Ok(Self {
            lower,
            excluder,
            reserved: ReservedNames::default(),
        })
    }

    /// Create a reverse filesystem with an explicit matcher
    pub fn with_excluder(
        lower: LowerLayer,
        excluder: Option<Arc<dyn PathMatcher>>,
        reserved: ReservedNames,
    ) -> Self {
        Self {
            lower,
            excluder,
            reserved,
        }
    }

    /// Whether an exclusion matcher is configured
    pub fn has_excluder(&self) -> bool {
        self.excluder.is_some()
    }

    /// Check a plaintext-space path against the exclusion rules.
    ///
    /// The path is passed to the matcher unchanged. No filesystem access.
    pub fn is_excluded_plain(&self, path: &str) -> bool {
        let Some(excluder) = &self.excluder else {
            return false;
        };
        let excluded = excluder.matches_path(path);
        trace!("is_excluded_plain({:?}) = {}", path, excluded);
        excluded
    }

    /// Check a cipher-space path against the exclusion rules.
    ///
    /// Reserved infrastructure files are never excluded and never reach the
    /// matcher. The second value tells the caller which reserved file, if
    /// any, the path names.
    pub fn is_excluded_cipher(&self, path: &str) -> (bool, Option<ReservedName>) {
        if let Some(reserved) = self.reserved.classify(path) {
            trace!("is_excluded_cipher({:?}): reserved {:?}", path, reserved);
            return (false, Some(reserved));
        }
        (self.is_excluded_plain(path), None)
    }

    /// Look up a plaintext path, hiding excluded entries.
    pub fn lookup_plain(&self, path: &str) -> Result<Metadata> {
        if self.is_excluded_plain(path) {
            return Err(Error::PathNotFound(path.to_string()));
        }
        self.lower.metadata(path)
    }

    /// List a plaintext directory without its excluded entries.
    pub fn readdir_plain(&self, dir: &str) -> Result<Vec<LowerDirEntry>> {
        if self.is_excluded_plain(dir) {
            return Err(Error::PathNotFound(dir.to_string()));
        }

        let dir = dir.trim_matches('/');
        let mut entries = self.lower.readdir(dir)?;
        entries.retain(|entry| {
            let name = entry.name.to_string_lossy();
            let child = if dir.is_empty() {
                name.into_owned()
            } else {
                format!("{}/{}", dir, name)
            };
            !self.is_excluded_plain(&child)
        });
        Ok(entries)
    }
}
