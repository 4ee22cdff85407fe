//! Reserved infrastructure filenames
//!
//! These files are synthesized by the name-encryption layer in the cipher
//! view and must never be hidden by exclusion rules.

/// Name of the translated configuration file at the root of the cipher view
pub const CONF_DEFAULT_NAME: &str = "revcryptfs.conf";

/// Name of the per-directory IV marker file
pub const DIRIV_FILENAME: &str = "revcryptfs.diriv";

/// Which reserved file a cipher path refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservedName {
    /// Translated configuration file (tree root only)
    TranslatedConfig,
    /// Directory IV marker (any directory)
    DirIv,
}

/// Set of filenames exempt from exclusion on the cipher side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedNames {
    config: String,
    diriv: String,
}

impl ReservedNames {
    pub fn new(config: impl Into<String>, diriv: impl Into<String>) -> Self {
        Self {
            config: config.into(),
            diriv: diriv.into(),
        }
    }

    /// Classify a cipher-space path relative to the tree root.
    ///
    /// The config file only exists at the root, so it is compared against the
    /// whole path. The IV marker lives in every directory and is compared
    /// against the last component.
    pub fn classify(&self, cipher_path: &str) -> Option<ReservedName> {
        let path = cipher_path.trim_start_matches('/');
        if path == self.config {
            return Some(ReservedName::TranslatedConfig);
        }
        let base = path.rsplit('/').next().unwrap_or(path);
        if base == self.diriv {
            return Some(ReservedName::DirIv);
        }
        None
    }
}

impl Default for ReservedNames {
    fn default() -> Self {
        Self::new(CONF_DEFAULT_NAME, DIRIV_FILENAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_root_names() {
        let names = ReservedNames::default();
        assert_eq!(
            names.classify(CONF_DEFAULT_NAME),
            Some(ReservedName::TranslatedConfig)
        );
        assert_eq!(names.classify(DIRIV_FILENAME), Some(ReservedName::DirIv));
        assert_eq!(names.classify("/revcryptfs.diriv"), Some(ReservedName::DirIv));
    }

    #[test]
    fn test_diriv_in_subdirectory() {
        let names = ReservedNames::default();
        assert_eq!(
            names.classify("a/b/revcryptfs.diriv"),
            Some(ReservedName::DirIv)
        );
        // The translated config only exists at the root
        assert_eq!(names.classify("a/revcryptfs.conf"), None);
    }

    #[test]
    fn test_ordinary_names() {
        let names = ReservedNames::default();
        assert_eq!(names.classify(""), None);
        assert_eq!(names.classify("revcryptfs.diriv.bak"), None);
        assert_eq!(names.classify("dir/file"), None);
    }

    #[test]
    fn test_custom_names() {
        let names = ReservedNames::new("other.conf", "other.diriv");
        assert_eq!(
            names.classify("other.conf"),
            Some(ReservedName::TranslatedConfig)
        );
        assert_eq!(names.classify(CONF_DEFAULT_NAME), None);
    }
}
