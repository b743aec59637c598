use std::ffi::{OsStr, OsString};

/// A single item yielded by an [`Enumerator`](crate::traits::Enumerator) for one directory.
///
/// Transient: consumed once by the engine and then dropped. The full path is
/// not stored; the engine joins `os_name` onto the directory it asked about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The leaf component as the OS reported it. Paths are built from this.
    pub os_name: OsString,

    /// `os_name` decoded for matching and display. Invalid UTF-8 becomes U+FFFD.
    pub name: String,

    /// What kind of entry this is.
    pub kind: EntryKind,

    /// Size in bytes. Only meaningful when `kind` is not [`EntryKind::Dir`].
    pub size: u64,
}

impl Entry {
    /// An entry named exactly `os_name`, which need not be valid UTF-8.
    pub fn new(os_name: impl Into<OsString>, kind: EntryKind, size: u64) -> Self {
        let os_name = os_name.into();
        let name = os_name.to_string_lossy().into_owned();
        Self {
            os_name,
            name,
            kind,
            size,
        }
    }

    /// A regular file entry.
    pub fn file(name: impl Into<String>, size: u64) -> Self {
        Self::new(name.into(), EntryKind::File, size)
    }

    /// A directory entry.
    pub fn dir(name: impl Into<String>) -> Self {
        Self::new(name.into(), EntryKind::Dir, 0)
    }

    pub fn os_name(&self) -> &OsStr {
        &self.os_name
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }

    /// `.` or `..`. Some enumerators yield them; the engine never descends into them.
    pub fn is_pseudo_dir(&self) -> bool {
        self.os_name == "." || self.os_name == ".."
    }
}

/// The kind of an enumerated entry.
///
/// Only [`EntryKind::Dir`] is recursed into. Everything else counts as a file
/// for statistics and matching; symlinks are never followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file.
    File,

    /// A directory.
    Dir,

    /// A symbolic link.
    Symlink,

    /// Anything else (device files, pipes, sockets, etc.).
    Other,
}
