use std::fs::{self, DirEntry, ReadDir};
use std::io;
use std::path::{Path, PathBuf};

use crate::entry::{Entry, EntryKind};
use crate::error::FanscanError;
use crate::traits::{EntryIter, Enumerator};

/// Lists directories with `std::fs::read_dir`.
///
/// Lazy: entries are pulled from the OS one at a time, so huge directories
/// are never buffered whole. Symlinks are reported as
/// [`EntryKind::Symlink`] and never followed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsEnumerator;

impl Enumerator for FsEnumerator {
    fn enumerate(&self, dir: &Path) -> Result<EntryIter<'_>, FanscanError> {
        let read_dir = fs::read_dir(dir).map_err(|e| classify(dir, e))?;
        Ok(Box::new(FsEntries {
            dir: dir.to_path_buf(),
            inner: read_dir,
        }))
    }
}

struct FsEntries {
    dir:   PathBuf,
    inner: ReadDir,
}

impl Iterator for FsEntries {
    type Item = Result<Entry, FanscanError>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.inner.next()?;
        Some(
            item.map_err(|e| classify(&self.dir, e))
                .map(to_entry),
        )
    }
}

fn to_entry(de: DirEntry) -> Entry {
    // file_type() comes from the directory listing on most platforms and does
    // not follow symlinks.
    let kind = match de.file_type() {
        Ok(ft) if ft.is_dir()     => EntryKind::Dir,
        Ok(ft) if ft.is_file()    => EntryKind::File,
        Ok(ft) if ft.is_symlink() => EntryKind::Symlink,
        Ok(_)                     => EntryKind::Other,
        Err(_)                    => EntryKind::Other,
    };

    let size = if kind == EntryKind::Dir {
        0
    } else {
        // A file that vanished or can't be stat'ed still counts, with no bytes
        de.metadata().map(|m| m.len()).unwrap_or(0)
    };

    Entry::new(de.file_name(), kind, size)
}

/// Map an OS error on `path` to the error kinds the engine distinguishes.
pub(crate) fn classify(path: &Path, err: io::Error) -> FanscanError {
    let path = path.to_path_buf();
    if is_name_too_long(&err) {
        return FanscanError::PathTooLong(path);
    }
    match err.kind() {
        io::ErrorKind::PermissionDenied => FanscanError::PermissionDenied(path),
        io::ErrorKind::NotFound         => FanscanError::NotFound(path),
        _                               => FanscanError::Io { path, source: err },
    }
}

#[cfg(unix)]
fn is_name_too_long(err: &io::Error) -> bool {
    err.raw_os_error() == Some(libc::ENAMETOOLONG)
}

#[cfg(windows)]
fn is_name_too_long(err: &io::Error) -> bool {
    const ERROR_FILENAME_EXCED_RANGE: i32 = 206;
    err.raw_os_error() == Some(ERROR_FILENAME_EXCED_RANGE)
}

#[cfg(not(any(unix, windows)))]
fn is_name_too_long(_err: &io::Error) -> bool {
    false
}
