use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Instant;

use tracing::debug;

use crate::config::SearchConfig;
use crate::engine::TraversalEngine;
use crate::error::FanscanError;
use crate::fs::FsEnumerator;
use crate::pattern::PatternSet;
use crate::results::{Results, ScanTiming};
use crate::sink::{ResultSink, SinkOptions, DEFAULT_BATCH_SIZE};
use crate::stats::Statistics;
use crate::traits::Enumerator;

// ---------------------------------------------------------------------------
// SearchBuilder
// ---------------------------------------------------------------------------

/// Entry point for configuring and executing a fanscan search.
///
/// Created via [`fanscan::search()`](crate::search). Configure with chained
/// builder methods, then call [`run()`](SearchBuilder::run) to execute.
///
/// # Example
///
/// ```rust,ignore
/// let results = fanscan::search()
///     .root("/var/log")
///     .pattern("*.log")
///     .pattern("*.gz")
///     .threads(8)
///     .output(std::io::stdout())
///     .run()?;
/// ```
pub struct SearchBuilder {
    root:           PathBuf,
    patterns:       Vec<String>,
    regex:          bool,
    include_dirs:   bool,
    threads:        usize,
    batch_size:     usize,
    queue_capacity: Option<usize>,
    output:         Option<Box<dyn Write + Send>>,
    enumerator:     Option<Box<dyn Enumerator>>,
    collect_paths:  bool,
    collect_errors: bool,
}

impl Default for SearchBuilder {
    fn default() -> Self {
        Self {
            root:           PathBuf::from("."),
            patterns:       Vec::new(),
            regex:          false,
            include_dirs:   false,
            threads:        num_cpus(),
            batch_size:     DEFAULT_BATCH_SIZE,
            queue_capacity: None,
            output:         None,
            enumerator:     None,
            collect_paths:  false,
            collect_errors: false,
        }
    }
}

impl SearchBuilder {
    // ── What to scan ──────────────────────────────────────────────────────

    /// Directory to start from. Defaults to the current directory.
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Replace the filesystem with any other [`Enumerator`].
    ///
    /// The root is then passed to the enumerator as-is, without checking
    /// that it exists on disk.
    pub fn enumerator(mut self, e: impl Enumerator + 'static) -> Self {
        self.enumerator = Some(Box::new(e));
        self
    }

    // ── What matches ──────────────────────────────────────────────────────

    /// Add one pattern. Patterns are OR-ed in the order they were added.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    /// Add several patterns at once.
    pub fn patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patterns.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Treat patterns as regular expressions instead of wildcards.
    pub fn regex(mut self, yes: bool) -> Self {
        self.regex = yes;
        self
    }

    /// Report matching directories as well, matching full paths instead of
    /// leaf names for both files and directories.
    pub fn include_dirs(mut self, yes: bool) -> Self {
        self.include_dirs = yes;
        self
    }

    // ── Options ───────────────────────────────────────────────────────────

    /// Number of threads to use for parallel traversal.
    ///
    /// Defaults to the number of logical CPU cores.
    pub fn threads(mut self, n: usize) -> Self {
        self.threads = n;
        self
    }

    /// Matched paths per bulk write to the output.
    pub fn batch_size(mut self, n: usize) -> Self {
        self.batch_size = n;
        self
    }

    /// Bound the match queue. Workers wait when `n` matches are pending.
    /// Unbounded by default.
    pub fn queue_capacity(mut self, n: usize) -> Self {
        self.queue_capacity = Some(n);
        self
    }

    /// Write every match, one path per line, to `out`.
    pub fn output(mut self, out: impl Write + Send + 'static) -> Self {
        self.output = Some(Box::new(out));
        self
    }

    /// Collect matched paths into [`Results::paths`].
    ///
    /// Disabled by default to avoid allocation overhead when paths aren't needed.
    pub fn collect_paths(mut self, yes: bool) -> Self {
        self.collect_paths = yes;
        self
    }

    /// Collect the error for every skipped directory into [`Results::errors`].
    ///
    /// Disabled by default; skipped directories are always counted in
    /// [`StatsSnapshot::directories_skipped`](crate::StatsSnapshot::directories_skipped).
    pub fn collect_errors(mut self, yes: bool) -> Self {
        self.collect_errors = yes;
        self
    }

    // ── Execute ───────────────────────────────────────────────────────────

    /// Execute the search and return results.
    ///
    /// Blocks until the traversal has joined and the sink has written its
    /// last batch.
    ///
    /// # Errors
    ///
    /// Configuration errors (bad pattern, no patterns, zero threads or batch
    /// size, root not a directory) are returned before any directory is
    /// opened. Thread pool and output failures are also fatal. Directories
    /// that can't be listed are never an error; they are skipped and counted.
    pub fn run(self) -> Result<Results, FanscanError> {
        if self.threads == 0 {
            return Err(FanscanError::InvalidThreadCount(0));
        }
        if self.batch_size == 0 {
            return Err(FanscanError::InvalidBatchSize(0));
        }

        let patterns = PatternSet::compile(&self.patterns, self.regex)?;

        let enumerator: Box<dyn Enumerator> = match self.enumerator {
            Some(e) => e,
            None => {
                if !self.root.is_dir() {
                    return Err(FanscanError::InvalidSource(self.root));
                }
                Box::new(FsEnumerator)
            }
        };

        let config = SearchConfig::new(self.root, patterns, self.include_dirs);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .thread_name(|i| format!("fanscan-{i}"))
            .build()
            .map_err(|e| FanscanError::ThreadPool(e.to_string()))?;

        let sink = ResultSink::start(
            self.output,
            SinkOptions {
                batch_size: self.batch_size,
                capacity: self.queue_capacity,
                collect_paths: self.collect_paths,
                ..SinkOptions::default()
            },
        )?;

        let stats = Statistics::new();
        let errors = Mutex::new(Vec::new());
        let start = Instant::now();

        // Producers must be fully joined and their handle gone before the
        // sink is told to drain.
        {
            let handle = sink.handle();
            let mut engine = TraversalEngine::new(&config, enumerator.as_ref(), &stats, &handle);
            if self.collect_errors {
                engine = engine.collect_errors(&errors);
            }
            pool.install(|| engine.run());
        }

        let summary = sink.request_drain_and_stop().await_stopped()?;
        let stats = stats.snapshot();
        debug!(lines = summary.lines_written, batches = summary.batches_written, "search complete");

        Ok(Results {
            stats,
            paths: summary.paths,
            lines_written: summary.lines_written,
            errors: errors.into_inner().unwrap_or_default(),
            timing: ScanTiming::compute(stats.entries(), start.elapsed()),
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Get the logical CPU count, with a safe fallback.
///
/// This is the default for [`SearchBuilder::threads`].
pub fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
