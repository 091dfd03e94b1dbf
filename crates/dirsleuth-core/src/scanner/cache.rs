/// Folder-size memo keyed by path and modification time.
///
/// A folder's mtime changes when entries are added, removed or renamed
/// directly inside it, so a hit means the direct listing is unchanged.
/// Growth of a file deeper down is not reflected in the folder's mtime;
/// callers that need exact sizes after such edits should `clear()` the
/// cache or leave memoization off.
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

#[derive(Debug, Clone, Copy)]
struct CachedSize {
    modified: SystemTime,
    size: u64,
}

#[derive(Debug, Default)]
pub struct SizeCache {
    entries: Mutex<HashMap<PathBuf, CachedSize>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SizeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached size of `path` if it was stored with the same mtime.
    /// A stale record is dropped.
    pub fn get(&self, path: &Path, modified: SystemTime) -> Option<u64> {
        let mut entries = self.entries.lock();
        match entries.get(path) {
            Some(cached) if cached.modified == modified => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(cached.size)
            }
            Some(_) => {
                entries.remove(path);
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn insert(&self, path: PathBuf, modified: SystemTime, size: u64) {
        self.entries.lock().insert(path, CachedSize { modified, size });
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// (hits, misses) since creation.
    pub fn stats(&self) -> (u64, u64) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }
}
