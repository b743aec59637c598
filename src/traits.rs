use std::path::Path;

use crate::entry::Entry;
use crate::error::FanscanError;

/// Lazy sequence of entries for one directory.
pub type EntryIter<'a> = Box<dyn Iterator<Item = Result<Entry, FanscanError>> + Send + 'a>;

/// Lists the immediate children of one directory.
///
/// Implement this to scan something other than the local filesystem, or to
/// wrap a platform-specific listing call. [`FsEnumerator`](crate::FsEnumerator)
/// is the default.
///
/// # Thread Safety
///
/// `Send + Sync` are required: one enumerator is shared by every worker and
/// called concurrently for different directories.
///
/// # Error Handling
///
/// Return `Err` from `enumerate` when the directory cannot be opened at all.
/// The engine skips that subtree and keeps going. An `Err` yielded mid-iteration
/// skips only that one entry.
///
/// Iterators should stay lazy where the platform allows it, so a directory
/// with millions of children is never held in memory at once.
///
/// # Example
///
/// ```rust
/// use std::path::Path;
/// use fanscan::{Entry, EntryIter, Enumerator, FanscanError};
///
/// struct Flat(Vec<(&'static str, u64)>);
///
/// impl Enumerator for Flat {
///     fn enumerate(&self, dir: &Path) -> Result<EntryIter<'_>, FanscanError> {
///         if dir != Path::new("/") {
///             return Err(FanscanError::NotFound(dir.to_path_buf()));
///         }
///         Ok(Box::new(self.0.iter().map(|(name, size)| Ok::<_, FanscanError>(Entry::file(*name, *size)))))
///     }
/// }
/// ```
pub trait Enumerator: Send + Sync {
    /// Open `dir` and yield its children, excluding nothing.
    fn enumerate(&self, dir: &Path) -> Result<EntryIter<'_>, FanscanError>;
}

/// Decides whether a candidate name is a match.
///
/// The engine hands over either the leaf name or the full path, depending on
/// whether directories are being matched too.
///
/// # Thread Safety
///
/// `Send + Sync` are required: matchers are shared across threads and called
/// concurrently on different entries.
///
/// # Example
///
/// ```rust
/// use fanscan::Matcher;
///
/// struct Suffix(&'static str);
///
/// impl Matcher for Suffix {
///     fn is_match(&self, candidate: &str) -> bool {
///         candidate.ends_with(self.0)
///     }
/// }
///
/// assert!(Suffix(".rs").is_match("main.rs"));
/// ```
pub trait Matcher: Send + Sync {
    /// Returns `true` if this candidate should be reported.
    fn is_match(&self, candidate: &str) -> bool;
}
