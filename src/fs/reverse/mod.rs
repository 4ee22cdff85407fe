//! Reverse-mode filesystem module
//!
//! Presents a plaintext source tree as an encrypted view. This module holds
//! the exclusion layer that decides which entries the view contains:
//! - Pattern aggregation from exclude paths, wildcards and exclude files
//! - Compilation into a shared, read-only matcher
//! - Plain-space and cipher-space exclusion decisions

mod excluder;
mod filesystem;
mod lower;

pub use excluder::{build_excluder, exclusion_patterns, GlobExcluder, PathMatcher};
pub use filesystem::ReverseFs;
pub use lower::{LowerDirEntry, LowerLayer};
