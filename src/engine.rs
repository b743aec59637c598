use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

use rayon::Scope;
use tracing::{debug, info, trace, warn};

use crate::config::SearchConfig;
use crate::error::FanscanError;
use crate::sink::SinkHandle;
use crate::stats::Statistics;
use crate::traits::{Enumerator, Matcher};

// ---------------------------------------------------------------------------
// TraversalEngine
// ---------------------------------------------------------------------------

/// Recursive, concurrent directory walk.
///
/// One task per directory. Each task enumerates its directory, counts and
/// matches every entry, pushes matches into the sink, and spawns a sibling
/// task for every subdirectory it finds. All tasks live in a single rayon
/// scope, so [`run`](Self::run) returns only after every directory under the
/// root has been fully processed.
///
/// Nothing is shared mutably except [`Statistics`] (atomics) and the sink
/// (a channel). Listing failures are contained to the directory that hit them.
pub struct TraversalEngine<'a> {
    config:     &'a SearchConfig,
    enumerator: &'a dyn Enumerator,
    matcher:    &'a dyn Matcher,
    stats:      &'a Statistics,
    sink:       &'a SinkHandle,
    errors:     Option<&'a Mutex<Vec<FanscanError>>>,
}

impl<'a> TraversalEngine<'a> {
    /// Matches with the config's own patterns.
    pub fn new(
        config: &'a SearchConfig,
        enumerator: &'a dyn Enumerator,
        stats: &'a Statistics,
        sink: &'a SinkHandle,
    ) -> Self {
        Self {
            config,
            enumerator,
            matcher: config.patterns(),
            stats,
            sink,
            errors: None,
        }
    }

    /// Use a different predicate than the config's patterns.
    pub fn with_matcher(mut self, matcher: &'a dyn Matcher) -> Self {
        self.matcher = matcher;
        self
    }

    /// Keep the error for every skipped directory.
    pub fn collect_errors(mut self, errors: &'a Mutex<Vec<FanscanError>>) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Walk everything under the configured root.
    ///
    /// Runs on whichever rayon pool is current; wrap in
    /// [`ThreadPool::install`](rayon::ThreadPool::install) to pick one.
    /// Blocks until the whole fan-out has joined, so the statistics are exact
    /// once this returns. Never fails: unreadable directories are skipped.
    pub fn run(&self) {
        let root = self.config.root();
        let start = Instant::now();
        info!(
            root = %root.display(),
            threads = rayon::current_num_threads(),
            include_dirs = self.config.include_dirs(),
            "starting traversal"
        );

        rayon::scope(|s| self.visit(s, root.to_path_buf()));

        let snap = self.stats.snapshot();
        info!(
            files = snap.files_scanned,
            dirs = snap.directories_scanned,
            bytes = snap.total_bytes_scanned,
            matches = snap.match_count,
            skipped = snap.directories_skipped,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "traversal joined"
        );
    }

    fn visit<'s>(&'s self, scope: &Scope<'s>, dir: PathBuf) {
        let entries = match self.enumerator.enumerate(&dir) {
            Ok(entries) => entries,
            Err(err) => {
                self.skip(&dir, err);
                return;
            }
        };

        for item in entries {
            let entry = match item {
                Ok(e) => e,
                Err(err) => {
                    trace!(dir = %dir.display(), error = %err, "skipping unreadable entry");
                    continue;
                }
            };

            if entry.is_pseudo_dir() {
                continue;
            }

            if entry.is_dir() {
                self.stats.record_dir();
                let child = dir.join(entry.os_name());
                if self.config.include_dirs() && self.matcher.is_match(&child.to_string_lossy()) {
                    self.stats.record_dir_match();
                    self.sink.enqueue(child.clone());
                }
                scope.spawn(move |s| self.visit(s, child));
            } else {
                self.stats.record_file(entry.size);
                if let Some(path) = self.matched_path(&dir, entry.os_name(), &entry.name) {
                    self.stats.record_match(entry.size);
                    self.sink.enqueue(path);
                }
            }
        }
    }

    /// Leaf name normally, full path once directories are matched too. The
    /// path is only built when it is needed, always from the raw OS name.
    fn matched_path(&self, dir: &Path, os_name: &OsStr, name: &str) -> Option<PathBuf> {
        if self.config.include_dirs() {
            let path = dir.join(os_name);
            self.matcher.is_match(&path.to_string_lossy()).then_some(path)
        } else {
            self.matcher.is_match(name).then(|| dir.join(os_name))
        }
    }

    fn skip(&self, dir: &Path, err: FanscanError) {
        self.stats.record_skipped();
        if err.is_expected_skip() {
            debug!(path = %dir.display(), error = %err, "skipping directory");
        } else {
            warn!(path = %dir.display(), error = %err, "failed to list directory, skipping");
        }
        if let Some(errors) = self.errors {
            if let Ok(mut errs) = errors.lock() {
                errs.push(err);
            }
        }
    }
}
