use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FanscanError {
    // Configuration
    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("no patterns given")]
    NoPatterns,

    #[error("invalid thread count")]
    InvalidThreadCount(usize),

    #[error("invalid batch size")]
    InvalidBatchSize(usize),

    #[error("not a readable directory: {0}")]
    InvalidSource(PathBuf),

    // Traversal
    #[error("permission denied")]
    PermissionDenied(PathBuf),

    #[error("path too long")]
    PathTooLong(PathBuf),

    #[error("path not found")]
    NotFound(PathBuf),

    #[error("IO error")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Runtime
    #[error("thread pool failure: {0}")]
    ThreadPool(String),

    #[error("output write failed")]
    Output(#[source] std::io::Error),

    #[error("result sink consumer panicked")]
    SinkPanicked,
}

impl FanscanError {
    /// The path this error occurred at, if applicable.
    /// Callers use this to present "Skipped: <path>" without pattern matching on variants.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::PermissionDenied(p)
            | Self::PathTooLong(p)
            | Self::NotFound(p)
            | Self::InvalidSource(p)
            | Self::Io { path: p, .. } => Some(p),
            _ => None,
        }
    }

    /// Whether the scan keeps going after this error.
    ///
    /// Everything that can go wrong while enumerating a single directory is
    /// recoverable: that subtree is skipped and its siblings carry on.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied(_) | Self::PathTooLong(_) | Self::NotFound(_) | Self::Io { .. }
        )
    }

    /// Whether this error was raised before any I/O happened.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidPattern { .. }
                | Self::NoPatterns
                | Self::InvalidThreadCount(_)
                | Self::InvalidBatchSize(_)
                | Self::InvalidSource(_)
        )
    }

    /// Expected skips that don't deserve more than a debug line: the
    /// platform refused access or the path outgrew what it can address.
    pub(crate) fn is_expected_skip(&self) -> bool {
        matches!(self, Self::PermissionDenied(_) | Self::PathTooLong(_))
    }
}
