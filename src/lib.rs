//! revcryptfs - Path exclusion for reverse-mode encrypted overlays
//!
//! A reverse mount presents a plaintext directory as an encrypted view. This
//! library decides which entries of that view are visible, based on
//! gitignore-style exclusion patterns, while always passing the reserved
//! infrastructure files of the cipher side.

pub mod config;
pub mod error;
pub mod fs;
pub mod names;

pub use config::Config;
pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, ExcludeConfig};
    pub use crate::error::{Error, Result};
    pub use crate::fs::reverse::{PathMatcher, ReverseFs};
    pub use crate::names::{ReservedName, ReservedNames};
}
