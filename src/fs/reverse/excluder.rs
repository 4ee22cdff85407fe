//! Exclusion pattern aggregation and compilation
//!
//! Patterns come from three configuration inputs and are compiled into a
//! single read-only matcher:
//! - explicit paths, anchored to the tree root
//! - wildcard patterns, matched at any depth
//! - exclude files, one pattern per line

use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::ExcludeConfig;
use crate::error::{Error, Result};

/// Decides whether a root-relative, slash-separated path is excluded.
///
/// Implementations are shared between all request handlers and must not
/// perform I/O.
pub trait PathMatcher: Send + Sync {
    fn matches_path(&self, path: &str) -> bool;
}

/// Collect raw exclusion patterns in configuration order.
///
/// Explicit paths get a leading `/` so they only match at the root. Wildcard
/// patterns and exclude-file lines are kept verbatim, including the empty
/// string after a file's final newline.
pub fn exclusion_patterns(config: &ExcludeConfig) -> Result<Vec<String>> {
    let mut patterns = Vec::with_capacity(config.exclude.len() + config.exclude_wildcard.len());

    for path in &config.exclude {
        if path.starts_with('/') {
            patterns.push(path.clone());
        } else {
            patterns.push(format!("/{}", path));
        }
    }

    patterns.extend(config.exclude_wildcard.iter().cloned());

    for file in &config.exclude_from {
        let content = std::fs::read_to_string(file).map_err(|source| Error::PatternFile {
            path: file.clone(),
            source,
        })?;
        let before = patterns.len();
        patterns.extend(content.split('\n').map(str::to_string));
        debug!(
            "Read {} exclude lines from {}",
            patterns.len() - before,
            file.display()
        );
    }

    Ok(patterns)
}

/// Build the excluder for a mount.
///
/// Returns `None` when no pattern was configured, which disables exclusion
/// entirely.
pub fn build_excluder(config: &ExcludeConfig) -> Result<Option<Arc<dyn PathMatcher>>> {
    let patterns = exclusion_patterns(config)?;
    if patterns.is_empty() {
        debug!("No exclude patterns configured");
        return Ok(None);
    }

    let excluder = GlobExcluder::compile(&patterns)?;
    info!(
        "Exclusion enabled with {} patterns ({} lines)",
        excluder.len(),
        patterns.len()
    );
    Ok(Some(Arc::new(excluder)))
}

/// gitignore-style matcher compiled into a single [`GlobSet`].
///
/// `*` never crosses a `/`. A leading `/` anchors a pattern to the root,
/// anything else may match at any depth. A match on a directory also covers
/// everything below it. There is no negation: every pattern only adds.
#[derive(Debug, Clone)]
pub struct GlobExcluder {
    set: GlobSet,
    rules: usize,
}

impl GlobExcluder {
    /// Compile raw patterns. Blank lines are skipped.
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        let mut rules = 0;

        for raw in patterns {
            let raw = raw.as_ref();
            let Some((anchored, body)) = normalize_pattern(raw)? else {
                continue;
            };
            let body = escape_braces(body);

            let base = if anchored || body == "**" || body.starts_with("**/") {
                body
            } else {
                format!("**/{}", body)
            };
            builder.add(build_glob(raw, &base)?);

            if base != "**" && !base.ends_with("/**") {
                builder.add(build_glob(raw, &format!("{}/**", base))?);
            }
            rules += 1;
        }

        let set = builder.build().map_err(|e| Error::InvalidPattern {
            pattern: patterns
                .iter()
                .map(|p| p.as_ref())
                .collect::<Vec<&str>>()
                .join(", "),
            reason: e.to_string(),
        })?;

        Ok(Self { set, rules })
    }

    /// Number of compiled (non-blank) patterns
    pub fn len(&self) -> usize {
        self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules == 0
    }
}

impl PathMatcher for GlobExcluder {
    fn matches_path(&self, path: &str) -> bool {
        self.set.is_match(path.trim_start_matches('/'))
    }
}

/// Split a raw pattern into (anchored, body). `None` for blank lines.
fn normalize_pattern(raw: &str) -> Result<Option<(bool, &str)>> {
    let trimmed = raw.trim_end();
    if trimmed.trim_start().is_empty() {
        return Ok(None);
    }

    let anchored = trimmed.starts_with('/');
    let body = trimmed.trim_start_matches('/').trim_end_matches('/');
    if body.is_empty() {
        return Err(Error::InvalidPattern {
            pattern: raw.to_string(),
            reason: "pattern would exclude the tree root".to_string(),
        });
    }

    Ok(Some((anchored, body)))
}

/// Make `{` and `}` literal. gitignore has no alternation, globset does.
///
/// Braces inside a character class or after a backslash are left alone.
fn escape_braces(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut class_start: Option<usize> = None;
    let mut escaped = false;

    for c in body.chars() {
        if escaped {
            out.push(c);
            escaped = false;
            continue;
        }
        match (c, class_start) {
            ('\\', _) => {
                out.push(c);
                escaped = true;
            }
            ('[', None) => {
                out.push(c);
                class_start = Some(out.len());
            }
            // `[!]...]` and `[^]...]`: negation does not start the class body
            ('!' | '^', Some(start)) if out.len() == start => {
                out.push(c);
                class_start = Some(out.len());
            }
            // A `]` right after the opening bracket is a member, not the end
            (']', Some(start)) if out.len() > start => {
                out.push(c);
                class_start = None;
            }
            ('{', None) => out.push_str("[{]"),
            ('}', None) => out.push_str("[}]"),
            _ => out.push(c),
        }
    }

    out
}

fn build_glob(raw: &str, glob: &str) -> Result<Glob> {
    GlobBuilder::new(glob)
        .literal_separator(true)
        .build()
        .map_err(|e| Error::InvalidPattern {
            pattern: raw.to_string(),
            reason: e.kind().to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    fn pattern_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_no_patterns_no_excluder() {
        let excluder = build_excluder(&ExcludeConfig::default()).unwrap();
        assert!(excluder.is_none());
    }

    #[test]
    fn test_exclude_paths_are_anchored() {
        let config = ExcludeConfig {
            exclude: vec!["file1".into(), "dir1/file2.txt".into()],
            exclude_wildcard: vec!["*~".into(), "build/*.o".into()],
            exclude_from: Vec::new(),
        };

        let patterns = exclusion_patterns(&config).unwrap();
        assert_eq!(patterns, vec!["/file1", "/dir1/file2.txt", "*~", "build/*.o"]);
    }

    #[test]
    fn test_already_anchored_path_kept() {
        let config = ExcludeConfig {
            exclude: vec!["/abs".into()],
            ..Default::default()
        };
        assert_eq!(exclusion_patterns(&config).unwrap(), vec!["/abs"]);
    }

    #[test]
    fn test_patterns_from_files() {
        let file1 = pattern_file("file1.1\nfile1.2\n");
        let file2 = pattern_file("file2.1\nfile2.2\n");

        let config = ExcludeConfig {
            exclude: Vec::new(),
            exclude_wildcard: vec!["cmdline1".into()],
            exclude_from: vec![file1.path().to_path_buf(), file2.path().to_path_buf()],
        };

        // The final newline of each file leaves an empty entry behind
        let patterns = exclusion_patterns(&config).unwrap();
        assert_eq!(
            patterns,
            vec!["cmdline1", "file1.1", "file1.2", "", "file2.1", "file2.2", ""]
        );

        let excluder = GlobExcluder::compile(&patterns).unwrap();
        assert_eq!(excluder.len(), 5);
        assert!(!excluder.matches_path(""));
        assert!(excluder.matches_path("file2.2"));
    }

    #[test]
    fn test_unreadable_pattern_file() {
        let config = ExcludeConfig {
            exclude_from: vec![PathBuf::from("/nonexistent/revcryptfs/excludes")],
            ..Default::default()
        };

        match exclusion_patterns(&config) {
            Err(Error::PatternFile { path, .. }) => {
                assert_eq!(path, PathBuf::from("/nonexistent/revcryptfs/excludes"))
            }
            other => panic!("expected PatternFile error, got {:?}", other.map(|_| ())),
        }
        assert!(build_excluder(&config).is_err());
    }

    #[test]
    fn test_blank_only_is_compiled_but_matches_nothing() {
        let file = pattern_file("\n");
        let config = ExcludeConfig {
            exclude_from: vec![file.path().to_path_buf()],
            ..Default::default()
        };

        let excluder = build_excluder(&config).unwrap().expect("excluder is configured");
        assert!(!excluder.matches_path("anything"));
        assert!(!excluder.matches_path(""));
    }

    #[test]
    fn test_anchored_matches_only_at_root() {
        let excluder = GlobExcluder::compile(&["/file1"]).unwrap();
        assert!(excluder.matches_path("file1"));
        assert!(excluder.matches_path("/file1"));
        assert!(!excluder.matches_path("dir/file1"));
        assert!(!excluder.matches_path("file10"));
    }

    #[test]
    fn test_unanchored_matches_any_depth() {
        let excluder = GlobExcluder::compile(&["*~", "build/*.o"]).unwrap();
        assert!(excluder.matches_path("notes.txt~"));
        assert!(excluder.matches_path("a/b/notes.txt~"));
        assert!(excluder.matches_path("build/main.o"));
        assert!(excluder.matches_path("src/build/main.o"));
        assert!(!excluder.matches_path("build/sub/main.o"));
        assert!(!excluder.matches_path("notes.txt"));
    }

    #[test]
    fn test_directory_match_covers_descendants() {
        let excluder = GlobExcluder::compile(&["/dir1", "cache/"]).unwrap();
        assert!(excluder.matches_path("dir1"));
        assert!(excluder.matches_path("dir1/sub/file.txt"));
        assert!(excluder.matches_path("x/cache/blob"));
        assert!(!excluder.matches_path("dir10/file.txt"));
    }

    #[test]
    fn test_star_matches_everything() {
        let excluder = GlobExcluder::compile(&["*"]).unwrap();
        assert!(excluder.matches_path("a"));
        assert!(excluder.matches_path("a/b/c"));
    }

    #[test]
    fn test_no_negation() {
        let excluder = GlobExcluder::compile(&["*.log", "!keep.log"]).unwrap();
        assert!(excluder.matches_path("keep.log"));
        assert!(excluder.matches_path("!keep.log"));
    }

    #[test]
    fn test_crlf_and_trailing_whitespace() {
        let excluder = GlobExcluder::compile(&["secret\r", "tmp  "]).unwrap();
        assert!(excluder.matches_path("secret"));
        assert!(excluder.matches_path("a/tmp"));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = GlobExcluder::compile(&["ok", "[abc"]).unwrap_err();
        match err {
            Error::InvalidPattern { pattern, .. } => assert_eq!(pattern, "[abc"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_braces_are_literal() {
        let excluder = GlobExcluder::compile(&["report{draft"]).unwrap();
        assert!(excluder.matches_path("report{draft"));
        assert!(excluder.matches_path("docs/report{draft"));

        let excluder = GlobExcluder::compile(&["{secret,keep}.txt"]).unwrap();
        assert!(excluder.matches_path("{secret,keep}.txt"));
        assert!(!excluder.matches_path("keep.txt"));
        assert!(!excluder.matches_path("secret.txt"));

        let excluder = GlobExcluder::compile(&["/a}b*"]).unwrap();
        assert!(excluder.matches_path("a}b.log"));
        assert!(!excluder.matches_path("sub/a}b.log"));
    }

    #[test]
    fn test_braces_inside_class_untouched() {
        let excluder = GlobExcluder::compile(&["x[{}]y", "[]{]z"]).unwrap();
        assert!(excluder.matches_path("x{y"));
        assert!(excluder.matches_path("x}y"));
        assert!(excluder.matches_path("]z"));
        assert!(excluder.matches_path("{z"));
        assert!(!excluder.matches_path("xy"));
    }

    #[test]
    fn test_blank_lines_compile_to_empty_excluder() {
        let excluder = GlobExcluder::compile(&["", "  ", "\r"]).unwrap();
        assert!(excluder.is_empty());
        assert_eq!(excluder.len(), 0);
        assert!(!excluder.matches_path("a"));
    }

    #[test]
    fn test_root_only_pattern_rejected() {
        assert!(matches!(
            GlobExcluder::compile(&["/"]),
            Err(Error::InvalidPattern { .. })
        ));
    }
}
