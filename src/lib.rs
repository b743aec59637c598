//! # fanscan
//!
//! Concurrent, recursive filename scanner.
//!
//! fanscan walks a directory tree with one task per directory on a
//! work-stealing pool, matches every name against wildcard or regex patterns,
//! keeps lock-free counters (files, directories, bytes, matches), and streams
//! matched paths through a single batching writer so console output never
//! slows the walk down.
//!
//! The lifecycle is always the same: the traversal runs until every directory
//! has been processed, only then is the output sink told to drain, and only
//! after it has stopped are the final statistics read.
//!
//! # Quick Start
//!
//! ```rust
//! use std::fs;
//!
//! let dir = tempfile::tempdir().unwrap();
//! fs::write(dir.path().join("a.log"), "alpha").unwrap();
//! fs::write(dir.path().join("b.txt"), "beta").unwrap();
//! fs::create_dir(dir.path().join("sub")).unwrap();
//! fs::write(dir.path().join("sub").join("c.LOG"), "gamma").unwrap();
//!
//! let results = fanscan::search()
//!     .root(dir.path())
//!     .pattern("*.log")
//!     .collect_paths(true)
//!     .run()
//!     .unwrap();
//!
//! assert_eq!(results.stats.match_count, 2);
//! assert_eq!(results.stats.files_scanned, 3);
//! assert_eq!(results.stats.directories_scanned, 1);
//! println!("Scanned {} entries in {:.3}s",
//!     results.stats.entries(),
//!     results.timing.duration.as_secs_f64()
//! );
//! ```
//!
//! # Custom Enumerators and Matchers
//!
//! Implement [`Enumerator`] to scan anything shaped like a directory tree, and
//! [`Matcher`] to replace pattern matching when driving
//! [`TraversalEngine`] directly:
//!
//! ```rust
//! use std::path::Path;
//! use fanscan::{Entry, EntryIter, Enumerator, FanscanError};
//!
//! struct Virtual;
//!
//! impl Enumerator for Virtual {
//!     fn enumerate(&self, dir: &Path) -> Result<EntryIter<'_>, FanscanError> {
//!         let entries = if dir == Path::new("/v") {
//!             vec![Entry::file("report.pdf", 2048), Entry::dir("old")]
//!         } else {
//!             vec![Entry::file("report-2019.pdf", 1024)]
//!         };
//!         Ok(Box::new(entries.into_iter().map(Ok::<_, FanscanError>)))
//!     }
//! }
//!
//! let results = fanscan::search()
//!     .root("/v")
//!     .enumerator(Virtual)
//!     .pattern("report*.pdf")
//!     .run()
//!     .unwrap();
//!
//! assert_eq!(results.stats.match_count, 2);
//! assert_eq!(results.stats.match_bytes_total, 3072);
//! ```

#![forbid(unsafe_code)]

pub mod engine;
pub mod sink;

mod builder;
mod config;
mod entry;
mod error;
mod fs;
mod pattern;
mod results;
mod stats;
mod traits;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use builder::{num_cpus, SearchBuilder};
pub use config::SearchConfig;
pub use engine::TraversalEngine;
pub use entry::{Entry, EntryKind};
pub use error::FanscanError;
pub use fs::FsEnumerator;
pub use pattern::{Pattern, PatternSet, PatternSyntax};
pub use results::{Results, ScanTiming};
pub use sink::{DrainingSink, ResultSink, SinkHandle, SinkOptions, SinkSummary};
pub use stats::{Statistics, StatsSnapshot};
pub use traits::{EntryIter, Enumerator, Matcher};

// ── Entry point ───────────────────────────────────────────────────────────────

/// Create a new [`SearchBuilder`] to configure and run a search.
///
/// # Example
///
/// ```rust
/// let dir = tempfile::tempdir().unwrap();
/// std::fs::write(dir.path().join("invoice.txt"), "x").unwrap();
/// std::fs::write(dir.path().join("report.txt"), "y").unwrap();
///
/// let results = fanscan::search()
///     .root(dir.path())
///     .pattern("inv*")
///     .run()
///     .unwrap();
///
/// assert_eq!(results.stats.match_count, 1);
/// ```
pub fn search() -> SearchBuilder {
    SearchBuilder::default()
}
