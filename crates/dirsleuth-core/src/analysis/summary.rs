/// Result aggregation: the final ordered entry sequence and its totals.
///
/// The ordering is a presentation contract every exporter relies on:
/// folders first, then files, each group by name ascending, with error
/// entries last.
use crate::analysis::file_types::{analyse_categories, CategoryStats};
use crate::analysis::top_files::top_entries;
use crate::model::{Entry, EntryKind, FilterCriteria};
use serde::Serialize;
use std::collections::HashSet;

/// Name and size of a notable file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRef {
    pub name: String,
    pub size_bytes: u64,
}

impl FileRef {
    fn of(entry: &Entry) -> Self {
        Self {
            name: entry.name.to_string(),
            size_bytes: entry.size_bytes,
        }
    }
}

/// Totals derived from an ordered entry sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanSummary {
    pub total_items: usize,
    pub file_count: usize,
    pub folder_count: usize,
    pub error_count: usize,

    /// Files plus folders. Error entries never contribute.
    pub total_size_bytes: u64,
    pub files_size_bytes: u64,
    pub folders_size_bytes: u64,

    pub largest_file: Option<FileRef>,
    pub smallest_file: Option<FileRef>,
    /// Mean size over files only (0 when there are none).
    pub average_file_size_bytes: u64,

    pub distinct_names: usize,
    /// Distinct extensions among files, files without one counted once.
    pub distinct_extensions: usize,
}

/// A finished, fully materialised scan result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanReport {
    /// The root as given by the caller.
    pub root: String,
    pub criteria: FilterCriteria,
    pub entries: Vec<Entry>,
    pub summary: ScanSummary,
}

impl ScanReport {
    /// Order `entries` and compute the summary.
    pub fn new(root: impl Into<String>, criteria: FilterCriteria, mut entries: Vec<Entry>) -> Self {
        order_entries(&mut entries);
        let summary = summarize(&entries);
        Self {
            root: root.into(),
            criteria,
            entries,
            summary,
        }
    }

    pub fn files(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| e.is_file())
    }

    pub fn folders(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| e.is_folder())
    }

    pub fn errors(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| e.is_error())
    }

    /// `true` when the scan of the root failed and the report holds only
    /// the synthetic error entry.
    pub fn is_failed(&self) -> bool {
        self.summary.error_count > 0
    }

    /// Per-category file statistics, largest category first.
    pub fn categories(&self) -> Vec<CategoryStats> {
        analyse_categories(&self.entries)
    }

    /// The `n` largest files and folders.
    pub fn top_items(&self, n: usize) -> Vec<&Entry> {
        top_entries(&self.entries, n)
    }
}

/// Sort into presentation order: folders, files, errors; by name within
/// each group.
pub fn order_entries(entries: &mut [Entry]) {
    entries.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.name.cmp(&b.name)));
}

/// Compute totals over an (ordered) entry sequence.
///
/// Ties for largest/smallest file go to the entry that comes first in
/// the sequence, so the result is deterministic.
pub fn summarize(entries: &[Entry]) -> ScanSummary {
    let mut summary = ScanSummary {
        total_items: entries.len(),
        ..ScanSummary::default()
    };

    let mut largest: Option<&Entry> = None;
    let mut smallest: Option<&Entry> = None;
    let mut names: HashSet<&str> = HashSet::with_capacity(entries.len());
    let mut extensions: HashSet<Option<&str>> = HashSet::new();

    for entry in entries {
        names.insert(entry.name.as_str());
        match entry.kind {
            EntryKind::Folder => {
                summary.folder_count += 1;
                summary.folders_size_bytes += entry.size_bytes;
            }
            EntryKind::File => {
                summary.file_count += 1;
                summary.files_size_bytes += entry.size_bytes;
                extensions.insert(entry.extension.as_deref());

                if largest.map_or(true, |l| entry.size_bytes > l.size_bytes) {
                    largest = Some(entry);
                }
                if smallest.map_or(true, |s| entry.size_bytes < s.size_bytes) {
                    smallest = Some(entry);
                }
            }
            EntryKind::Error => summary.error_count += 1,
        }
    }

    summary.total_size_bytes = summary.files_size_bytes + summary.folders_size_bytes;
    summary.largest_file = largest.map(FileRef::of);
    summary.smallest_file = smallest.map(FileRef::of);
    summary.average_file_size_bytes = if summary.file_count > 0 {
        summary.files_size_bytes / summary.file_count as u64
    } else {
        0
    };
    summary.distinct_names = names.len();
    summary.distinct_extensions = extensions.len();
    summary
}
