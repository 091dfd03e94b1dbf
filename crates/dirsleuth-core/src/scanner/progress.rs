/// Scan progress reporting: messages sent from the scan thread to the
/// front-end via a crossbeam channel.
use crate::analysis::ScanReport;
use std::time::Duration;

#[derive(Debug)]
pub enum ScanProgress {
    /// About to process the next direct child of the root.
    Update {
        children_done: usize,
        children_total: usize,
        current_path: String,
    },
    /// Scanning finished. Failed roots also finish here, with a report
    /// holding a single error entry.
    Complete {
        report: Box<ScanReport>,
        duration: Duration,
    },
    /// Cancelled before completion; no partial result is delivered.
    Cancelled,
}

impl ScanProgress {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Update { .. })
    }
}
