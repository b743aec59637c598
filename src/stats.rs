use std::sync::atomic::{AtomicU64, Ordering};

/// Scan counters shared by every worker.
///
/// Each counter is an independent `AtomicU64` updated with relaxed ordering:
/// no lost updates, but no ordering between counters either. Only a
/// [`snapshot`](Statistics::snapshot) taken after the traversal has joined is
/// exact.
#[derive(Debug, Default)]
pub struct Statistics {
    files_scanned:       AtomicU64,
    directories_scanned: AtomicU64,
    total_bytes_scanned: AtomicU64,
    match_count:         AtomicU64,
    match_bytes_total:   AtomicU64,
    directories_skipped: AtomicU64,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// A non-directory entry was seen.
    pub fn record_file(&self, size: u64) {
        self.files_scanned.fetch_add(1, Ordering::Relaxed);
        self.total_bytes_scanned.fetch_add(size, Ordering::Relaxed);
    }

    /// A subdirectory was seen.
    pub fn record_dir(&self) {
        self.directories_scanned.fetch_add(1, Ordering::Relaxed);
    }

    /// A file matched.
    pub fn record_match(&self, size: u64) {
        self.match_count.fetch_add(1, Ordering::Relaxed);
        self.match_bytes_total.fetch_add(size, Ordering::Relaxed);
    }

    /// A directory matched. Directories carry no bytes.
    pub fn record_dir_match(&self) {
        self.match_count.fetch_add(1, Ordering::Relaxed);
    }

    /// A directory could not be enumerated and its subtree was skipped.
    pub fn record_skipped(&self) {
        self.directories_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            files_scanned:       self.files_scanned.load(Ordering::Relaxed),
            directories_scanned: self.directories_scanned.load(Ordering::Relaxed),
            total_bytes_scanned: self.total_bytes_scanned.load(Ordering::Relaxed),
            match_count:         self.match_count.load(Ordering::Relaxed),
            match_bytes_total:   self.match_bytes_total.load(Ordering::Relaxed),
            directories_skipped: self.directories_skipped.load(Ordering::Relaxed),
        }
    }
}

/// Plain-value copy of [`Statistics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Non-directory entries seen (files, symlinks, special files).
    pub files_scanned: u64,

    /// Subdirectories seen. The root itself is not counted.
    pub directories_scanned: u64,

    /// Sum of the sizes of every scanned file.
    pub total_bytes_scanned: u64,

    /// Files, plus directories when they are matched too.
    pub match_count: u64,

    /// Sum of the sizes of matched files only.
    pub match_bytes_total: u64,

    /// Directories whose listing failed; nothing beneath them was counted.
    pub directories_skipped: u64,
}

impl StatsSnapshot {
    /// Files plus directories.
    pub fn entries(&self) -> u64 {
        self.files_scanned + self.directories_scanned
    }
}
