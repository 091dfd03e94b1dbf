/// Failures of a root scan.
///
/// These never escape the scanner: each one is turned into a single
/// synthetic error entry so that one bad root is never fatal to the
/// caller.
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("folder not found: {0}")]
    RootNotFound(String),

    #[error("not a folder: {0}")]
    RootNotADirectory(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("cannot read {path}: {source}")]
    GenericScanFailure {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl ScanError {
    /// Classify an I/O error raised while opening or listing `path`.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        let shown = path.display().to_string();
        match err.kind() {
            io::ErrorKind::NotFound => Self::RootNotFound(shown),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(shown),
            _ => Self::GenericScanFailure {
                path: shown,
                source: err,
            },
        }
    }
}
