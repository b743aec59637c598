use std::path::PathBuf;
use std::time::Duration;

use crate::error::FanscanError;
use crate::stats::StatsSnapshot;

/// The output of a completed scan.
///
/// `paths` and `errors` are both opt-in and disabled by default to avoid
/// allocation overhead in the common case. Enable them on the builder:
/// `.collect_paths(true)` and `.collect_errors(true)`.
#[derive(Debug)]
pub struct Results {
    /// Final counters, taken after the traversal joined and the sink drained.
    pub stats: StatsSnapshot,

    /// Matched paths in the order the sink drained them. Order across
    /// directories is not meaningful.
    /// Only populated if `.collect_paths(true)` was set on the builder.
    pub paths: Vec<PathBuf>,

    /// Matches that went through the sink. Always equals `stats.match_count`.
    pub lines_written: u64,

    /// One error per skipped directory (permission denied, path too long, ...).
    /// Only populated if `.collect_errors(true)` was set on the builder.
    pub errors: Vec<FanscanError>,

    /// Scan timing.
    pub timing: ScanTiming,
}

/// Wall-clock figures for a completed scan.
#[derive(Debug, Clone, Copy)]
pub struct ScanTiming {
    /// From the start of the traversal until the sink stopped.
    pub duration: Duration,

    /// Total entries scanned per second. Convenience field, equal to
    /// `(files + dirs) / duration.as_secs_f64()`, clamped to 0 on
    /// zero-duration runs.
    pub entries_per_sec: u64,
}

impl ScanTiming {
    /// Compute `entries_per_sec` from the entry count and duration.
    pub(crate) fn compute(entries: u64, duration: Duration) -> Self {
        let eps = if duration.as_secs_f64() > 0.0 {
            (entries as f64 / duration.as_secs_f64()) as u64
        } else {
            0
        };
        Self {
            duration,
            entries_per_sec: eps,
        }
    }
}
