/// Scanner module: one-level directory scans with recursive folder sizing.
///
/// A scan lists the direct children of a root, classifies each file by
/// extension, sizes each subfolder recursively, runs every entry through
/// the filter pipeline and returns an ordered [`ScanReport`].
///
/// Three entry points share one code path:
/// - [`Scanner::scan`] blocks and always returns a report.
/// - [`Scanner::start`] runs on a background thread and streams
///   [`ScanProgress`] messages; it can be cancelled between children and
///   during folder sizing.
/// - [`Scanner::scan_batch`] scans several roots in parallel with rayon.
///
/// A root that is missing, not a folder or unreadable yields a report with
/// exactly one error entry instead of an `Err`.
pub mod cache;
pub mod children;
pub mod error;
pub mod progress;
pub mod sizing;

use crate::analysis::{Category, CategoryTable, ScanReport};
use crate::config::ScanSettings;
use crate::filter::FilterPipeline;
use crate::model::{extension_of, Entry, FilterCriteria};
use cache::SizeCache;
use children::{read_children, ChildKind};
use progress::ScanProgress;
use sizing::FolderSizer;

use chrono::{DateTime, Local};
use crossbeam_channel::{Receiver, Sender};
use rayon::prelude::*;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Maximum number of progress messages that may queue up in the channel.
///
/// Intermediate updates are dropped when the channel is full; the final
/// `Complete` or `Cancelled` message is always delivered.
pub const PROGRESS_CHANNEL_CAPACITY: usize = 4_096;

/// How folder sizes are computed. Never changes the result.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub parallel_sizing: bool,
    /// Shared memo of folder sizes; `None` disables memoization.
    pub size_cache: Option<Arc<SizeCache>>,
}

impl ScanOptions {
    pub fn from_settings(settings: &ScanSettings) -> Self {
        Self {
            parallel_sizing: settings.parallel_sizing,
            size_cache: settings
                .memoize_folder_sizes
                .then(|| Arc::new(SizeCache::new())),
        }
    }
}

/// One root plus the criteria to apply to it.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub root: PathBuf,
    pub criteria: FilterCriteria,
}

impl ScanRequest {
    pub fn new(root: impl Into<PathBuf>, criteria: FilterCriteria) -> Self {
        Self {
            root: root.into(),
            criteria,
        }
    }
}

/// Cheap to clone; clones share the category table and size cache.
#[derive(Debug, Clone)]
pub struct Scanner {
    table: Arc<CategoryTable>,
    sizer: FolderSizer,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(Arc::new(CategoryTable::builtin().clone()), ScanOptions::default())
    }
}

impl Scanner {
    pub fn new(table: Arc<CategoryTable>, options: ScanOptions) -> Self {
        Self {
            table,
            sizer: FolderSizer::new(options.parallel_sizing, options.size_cache),
        }
    }

    pub fn from_config(config: &crate::AnalyzerConfig) -> Self {
        Self::new(
            Arc::new(config.categories.clone()),
            ScanOptions::from_settings(&config.scan),
        )
    }

    pub fn table(&self) -> &CategoryTable {
        &self.table
    }

    pub fn size_cache(&self) -> Option<&Arc<SizeCache>> {
        self.sizer.cache()
    }

    /// Scan `root` to completion.
    pub fn scan(&self, root: &Path, criteria: &FilterCriteria) -> ScanReport {
        let never = AtomicBool::new(false);
        match self.scan_with_control(root, criteria, &never, |_, _, _| {}) {
            Some(report) => report,
            // `scan_with_control` only yields `None` after observing the
            // flag set, and `never` is local and never set.
            None => unreachable!("uncancellable scan was cancelled"),
        }
    }

    /// Scan `root`, calling `on_child(done, total, path)` before each
    /// direct child. Returns `None` if and only if `cancel` was seen set;
    /// a failed root still yields `Some` with a single error entry.
    pub fn scan_with_control<F>(
        &self,
        root: &Path,
        criteria: &FilterCriteria,
        cancel: &AtomicBool,
        mut on_child: F,
    ) -> Option<ScanReport>
    where
        F: FnMut(usize, usize, &Path),
    {
        let root_shown = display_root(root);
        debug!("Scanning {root_shown} with {criteria}");

        let children = match read_children(root) {
            Ok(children) => children,
            Err(err) => {
                warn!("Scan of {root_shown} failed: {err}");
                let entry = Entry::error(err.to_string(), root_shown.clone());
                return Some(ScanReport::new(root_shown, criteria.clone(), vec![entry]));
            }
        };

        let pipeline = FilterPipeline::new(criteria);
        let total = children.len();
        let mut entries = Vec::with_capacity(total);

        for (done, child) in children.into_iter().enumerate() {
            if cancel.load(Ordering::Relaxed) {
                return None;
            }
            on_child(done, total, &child.path);
            let full_path = child.path.to_string_lossy().into_owned();

            match child.kind {
                ChildKind::Folder => {
                    // Folder admission never depends on size; rejected
                    // folders are not walked.
                    let mut entry = Entry::folder(child.name, full_path, 0);
                    if !pipeline.admits(&entry) {
                        continue;
                    }
                    entry.size_bytes = self.sizer.size_of(&child.path, cancel)?;
                    entries.push(entry);
                }
                ChildKind::File {
                    size,
                    created,
                    modified,
                } => {
                    let extension = extension_of(&child.name);
                    let category = extension
                        .as_deref()
                        .map_or(Category::Other, |ext| self.table.categorise(ext));
                    let entry = Entry::file(child.name, full_path, size, extension, category)
                        .with_times(
                            created.map(DateTime::<Local>::from),
                            modified.map(DateTime::<Local>::from),
                        );
                    if pipeline.admits(&entry) {
                        entries.push(entry);
                    }
                }
            }
        }

        Some(ScanReport::new(root_shown, criteria.clone(), entries))
    }

    /// Scan every request in parallel. Reports come back in request order.
    pub fn scan_batch(&self, requests: &[ScanRequest]) -> Vec<ScanReport> {
        info!("Scanning {} roots", requests.len());
        requests
            .par_iter()
            .map(|req| self.scan(&req.root, &req.criteria))
            .collect()
    }

    /// Start a scan on a background thread.
    pub fn start(&self, root: PathBuf, criteria: FilterCriteria) -> io::Result<ScanHandle> {
        let (progress_tx, progress_rx) =
            crossbeam_channel::bounded::<ScanProgress>(PROGRESS_CHANNEL_CAPACITY);
        let cancel_flag = Arc::new(AtomicBool::new(false));
        let cancel_clone = cancel_flag.clone();
        let scanner = self.clone();

        let thread = thread::Builder::new()
            .name("dirsleuth-scanner".into())
            .spawn(move || run_scan(&scanner, &root, &criteria, &cancel_clone, &progress_tx))?;

        Ok(ScanHandle {
            progress_rx,
            cancel_flag,
            _thread: Some(thread),
        })
    }
}

fn run_scan(
    scanner: &Scanner,
    root: &Path,
    criteria: &FilterCriteria,
    cancel: &AtomicBool,
    progress_tx: &Sender<ScanProgress>,
) {
    info!("Starting scan of {}", root.display());
    let start = Instant::now();

    let outcome = scanner.scan_with_control(root, criteria, cancel, |done, total, path| {
        let _ = progress_tx.try_send(ScanProgress::Update {
            children_done: done,
            children_total: total,
            current_path: path.to_string_lossy().into_owned(),
        });
    });

    let message = match outcome {
        Some(report) => {
            let duration = start.elapsed();
            info!(
                "Scan of {} complete: {} entries in {:.2?}",
                root.display(),
                report.entries.len(),
                duration
            );
            ScanProgress::Complete {
                report: Box::new(report),
                duration,
            }
        }
        None => {
            info!("Scan of {} cancelled", root.display());
            ScanProgress::Cancelled
        }
    };
    let _ = progress_tx.send(message);
}

fn display_root(root: &Path) -> String {
    root.to_string_lossy().into_owned()
}

/// Handle to a running or completed scan. Allows cancellation and
/// receiving progress updates.
pub struct ScanHandle {
    pub progress_rx: Receiver<ScanProgress>,
    cancel_flag: Arc<AtomicBool>,
    _thread: Option<thread::JoinHandle<()>>,
}

impl ScanHandle {
    /// Request the scan to stop as soon as possible.
    pub fn cancel(&self) {
        self.cancel_flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_flag.load(Ordering::Relaxed)
    }

    /// Drain progress until the scan ends. `on_update` sees every
    /// intermediate message. Returns `None` if the scan was cancelled.
    pub fn wait_with<F>(self, mut on_update: F) -> Option<ScanReport>
    where
        F: FnMut(&ScanProgress),
    {
        for message in self.progress_rx.iter() {
            match message {
                ScanProgress::Complete { report, .. } => return Some(*report),
                ScanProgress::Cancelled => return None,
                update => on_update(&update),
            }
        }
        // Sender dropped without a terminal message: the thread panicked.
        None
    }

    pub fn wait(self) -> Option<ScanReport> {
        self.wait_with(|_| {})
    }
}
