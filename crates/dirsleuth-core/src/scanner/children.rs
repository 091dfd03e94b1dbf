/// One-level enumeration of the scan root.
///
/// Lists the direct children of the root with just enough metadata to
/// classify them. Subfolders are not entered here; their sizes come from
/// [`super::sizing`].
use super::error::ScanError;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// Names skipped outright at the root: recycle bins, volume metadata and
/// the thumbnail cache.
pub const SYSTEM_RESERVED_NAMES: [&str; 4] = [
    "$RECYCLE.BIN",
    "System Volume Information",
    "RECYCLER",
    "Thumbs.db",
];

#[inline]
pub fn is_system_reserved(name: &str) -> bool {
    SYSTEM_RESERVED_NAMES.contains(&name)
}

/// What a child turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildKind {
    Folder,
    File {
        size: u64,
        /// Birth time, or the modification time where there is none.
        created: Option<SystemTime>,
        modified: Option<SystemTime>,
    },
}

/// A direct child of the root, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChild {
    pub name: String,
    pub path: PathBuf,
    pub kind: ChildKind,
}

/// Validate `root` and list its direct children.
///
/// Symlinks are followed for the children themselves (a link to a folder
/// is listed as a folder). Children that vanish or cannot be stat'ed
/// between listing and inspection are skipped, as are sockets, FIFOs and
/// other special files.
pub fn read_children(root: &Path) -> Result<Vec<RawChild>, ScanError> {
    let meta = fs::metadata(root).map_err(|e| ScanError::from_io(root, e))?;
    if !meta.is_dir() {
        return Err(ScanError::RootNotADirectory(root.display().to_string()));
    }

    let listing = fs::read_dir(root).map_err(|e| ScanError::from_io(root, e))?;
    let mut children = Vec::new();

    for item in listing {
        let item = item.map_err(|e| ScanError::from_io(root, e))?;
        let name = item.file_name().to_string_lossy().into_owned();
        if is_system_reserved(&name) {
            continue;
        }

        let path = item.path();
        let meta = match fs::metadata(&path) {
            Ok(m) => m,
            Err(err) => {
                debug!("Skipping {}: {err}", path.display());
                continue;
            }
        };

        let kind = if meta.is_dir() {
            ChildKind::Folder
        } else if meta.is_file() {
            let modified = meta.modified().ok();
            ChildKind::File {
                size: meta.len(),
                created: meta.created().ok().or(modified),
                modified,
            }
        } else {
            debug!("Skipping special file {}", path.display());
            continue;
        };

        children.push(RawChild { name, path, kind });
    }

    Ok(children)
}
