//! Resolution of requested file entries into paths

use precommit_config::GlobMatcher;
use std::path::{Path, PathBuf};

/// Requested files split into those that exist and those that do not
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResolvedFiles {
    /// Files to pass to the tool, in request order
    pub existing: Vec<PathBuf>,
    /// Literal entries that do not exist on disk
    pub missing: Vec<PathBuf>,
}

/// Resolve file entries relative to `base_dir`
///
/// Literal entries are joined to `base_dir` and kept in the order given.
/// Glob entries are expanded in place; matches of a single pattern are sorted
/// so the command line is stable between runs.
pub fn resolve(entries: &[String], base_dir: &Path, matcher: &GlobMatcher) -> ResolvedFiles {
    let mut resolved = ResolvedFiles::default();

    for entry in entries {
        if GlobMatcher::is_pattern(entry) {
            let mut matched = matcher.expand(entry, base_dir);
            if matched.is_empty() {
                tracing::warn!("No files match pattern: {}", entry);
            }
            matched.sort();
            resolved.existing.extend(matched);
        } else {
            let path = base_dir.join(entry);
            if path.exists() {
                resolved.existing.push(path);
            } else {
                resolved.missing.push(path);
            }
        }
    }

    resolved
}
