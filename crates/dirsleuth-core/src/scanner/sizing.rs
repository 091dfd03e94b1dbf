/// Recursive folder sizing with `jwalk`.
///
/// A folder's size is the sum of the sizes of every regular file beneath
/// it. Unreadable subdirectories and files that vanish mid-walk contribute
/// zero and are otherwise ignored. Symlinks are never followed, so a link
/// cycle cannot loop and nothing is counted twice.
use super::cache::SizeCache;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Entries visited between two cancellation checks.
const CANCEL_CHECK_INTERVAL: u64 = 1_000;

#[derive(Debug, Clone, Default)]
pub struct FolderSizer {
    parallel: bool,
    cache: Option<Arc<SizeCache>>,
}

impl FolderSizer {
    pub fn new(parallel: bool, cache: Option<Arc<SizeCache>>) -> Self {
        Self { parallel, cache }
    }

    pub fn cache(&self) -> Option<&Arc<SizeCache>> {
        self.cache.as_ref()
    }

    /// Total bytes under `dir`, or `None` if `cancel` was raised mid-walk.
    pub fn size_of(&self, dir: &Path, cancel: &AtomicBool) -> Option<u64> {
        let modified = self
            .cache
            .as_ref()
            .and_then(|_| fs::metadata(dir).and_then(|m| m.modified()).ok());

        if let (Some(cache), Some(mtime)) = (&self.cache, modified) {
            if let Some(size) = cache.get(dir, mtime) {
                debug!("Size cache hit for {}", dir.display());
                return Some(size);
            }
        }

        let size = self.walk(dir, cancel)?;

        if let (Some(cache), Some(mtime)) = (&self.cache, modified) {
            cache.insert(dir.to_path_buf(), mtime, size);
        }
        Some(size)
    }

    fn walk(&self, dir: &Path, cancel: &AtomicBool) -> Option<u64> {
        let parallelism = if self.parallel {
            jwalk::Parallelism::RayonNewPool(num_cpus::get())
        } else {
            jwalk::Parallelism::Serial
        };
        let walker = jwalk::WalkDir::new(dir)
            .skip_hidden(false)
            .follow_links(false)
            .parallelism(parallelism);

        let mut total: u64 = 0;
        let mut visited: u64 = 0;
        let mut skipped: u64 = 0;

        for entry_result in walker {
            visited += 1;
            if visited % CANCEL_CHECK_INTERVAL == 0 && cancel.load(Ordering::Relaxed) {
                return None;
            }

            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    skipped += 1;
                    debug!("Skipping unreadable entry under {}: {err}", dir.display());
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            match fs::symlink_metadata(entry.path()) {
                Ok(meta) => total += meta.len(),
                Err(err) => {
                    skipped += 1;
                    debug!("Cannot stat {}: {err}", entry.path().display());
                }
            }
        }

        // A cancel raised after the last check still wins.
        if cancel.load(Ordering::Relaxed) {
            return None;
        }

        if skipped > 0 {
            debug!("{} entries skipped while sizing {}", skipped, dir.display());
        }
        Some(total)
    }
}
