use std::path::{Path, PathBuf};

use crate::pattern::PatternSet;

/// What to scan and what counts as a match.
///
/// Built once, then shared read-only by every worker for the whole traversal.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    root:         PathBuf,
    include_dirs: bool,
    patterns:     PatternSet,
}

impl SearchConfig {
    pub fn new(root: impl Into<PathBuf>, patterns: PatternSet, include_dirs: bool) -> Self {
        Self {
            root: root.into(),
            include_dirs,
            patterns,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directories are matched and reported too.
    pub fn include_dirs(&self) -> bool {
        self.include_dirs
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }
}
