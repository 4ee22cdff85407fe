//! Filesystem implementation
//!
//! Filesystem-side state of a mount, independent of FUSE request dispatch.

pub mod reverse;

pub use reverse::ReverseFs;
