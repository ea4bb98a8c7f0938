//! Glob expansion for requested file lists
//!
//! File entries are either literal paths or glob patterns relative to the
//! project base directory:
//!
//! ```toml
//! files = [
//!     "docs/openapi.json",   # literal, used as-is
//!     "src/**/*.java",       # every .java file below src/
//!     "config/app-?.yaml",   # single-character wildcard
//! ]
//! ```
//!
//! `*` never crosses a path separator, `**` matches any number of directories,
//! `?` matches one character and `[...]` one character from the set.
//!
//! "Any number" includes zero: `src/**/*.java` matches `src/App.java` as well
//! as `src/main/App.java`. Matchers that require at least one directory for
//! `**/` (such as Java's `PathMatcher`) do not match the former.
//!
//! Expansion walks every regular file below the base directory and matches its
//! path relative to that directory. The order of the returned paths follows the
//! directory walk and is not guaranteed to be stable.

use glob::{MatchOptions, Pattern};
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Characters that turn a file entry into a glob pattern
const PATTERN_CHARS: [char; 3] = ['*', '?', '['];

/// Standard glob semantics: `*` and `?` stop at path separators
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Callback receiving warnings about patterns that could not be expanded
pub type WarningHandler = Box<dyn Fn(&str) + Send + Sync>;

/// Glob pattern expander
///
/// Warnings (missing base directory, malformed pattern) are delivered to a
/// handler instead of being returned as errors. The default handler logs them
/// through `tracing`.
pub struct GlobMatcher {
    on_warning: WarningHandler,
}

impl GlobMatcher {
    /// Create a matcher that logs warnings with `tracing::warn!`
    #[must_use]
    pub fn new() -> Self {
        Self::with_warning_handler(|message| tracing::warn!("{}", message))
    }

    /// Create a matcher that sends warnings to `handler`
    ///
    /// # Examples
    ///
    /// ```
    /// use precommit_config::GlobMatcher;
    /// use std::path::Path;
    /// use std::sync::{Arc, Mutex};
    ///
    /// let warnings = Arc::new(Mutex::new(Vec::new()));
    /// let sink = Arc::clone(&warnings);
    /// let matcher = GlobMatcher::with_warning_handler(move |msg| {
    ///     sink.lock().unwrap().push(msg.to_string());
    /// });
    ///
    /// let files = matcher.expand("*.json", Path::new("/definitely/not/here"));
    /// assert!(files.is_empty());
    /// assert_eq!(warnings.lock().unwrap().len(), 1);
    /// ```
    pub fn with_warning_handler<F>(handler: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        Self {
            on_warning: Box::new(handler),
        }
    }

    /// Check if the given path contains glob pattern characters
    #[must_use]
    pub fn is_pattern(path: &str) -> bool {
        path.contains(PATTERN_CHARS)
    }

    /// Expand `pattern` relative to `base_dir` into absolute file paths
    ///
    /// Returns an empty list when nothing matches. When the pattern is
    /// malformed or the walk cannot start (e.g. `base_dir` does not exist) the
    /// list is empty as well and a warning is reported. Entries that cannot be
    /// read during the walk are skipped.
    #[must_use]
    pub fn expand(&self, pattern: &str, base_dir: &Path) -> Vec<PathBuf> {
        let compiled = match Pattern::new(pattern) {
            Ok(compiled) => compiled,
            Err(e) => {
                self.warn(pattern, &e);
                return Vec::new();
            }
        };

        let base = std::path::absolute(base_dir).unwrap_or_else(|_| base_dir.to_path_buf());
        if let Err(e) = std::fs::metadata(&base) {
            self.warn(pattern, &e);
            return Vec::new();
        }

        let matched: Vec<PathBuf> = WalkDir::new(&base)
            .follow_links(false)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                entry
                    .path()
                    .strip_prefix(&base)
                    .is_ok_and(|relative| compiled.matches_path_with(relative, MATCH_OPTIONS))
            })
            .map(walkdir::DirEntry::into_path)
            .collect();

        tracing::debug!(
            "Glob pattern '{}' matched {} file(s) under {}",
            pattern,
            matched.len(),
            base.display()
        );

        matched
    }

    fn warn(&self, pattern: &str, cause: &dyn fmt::Display) {
        (self.on_warning)(&format!(
            "Failed to expand glob pattern: {pattern} - {cause}"
        ));
    }
}

impl Default for GlobMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GlobMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobMatcher").finish_non_exhaustive()
    }
}
