/// DirSleuth Core: scan, classify, filter and estimate.
///
/// This crate contains all business logic with zero UI dependencies.
/// Front-ends translate their own inputs into a [`FilterCriteria`] and
/// render the returned [`ScanReport`]; nothing in here knows about them.
///
/// # Modules
///
/// - [`model`]: Entries, filter criteria and size formatting.
/// - [`analysis`]: Classifier, savings estimator and result aggregation.
/// - [`filter`]: The compound type/size/date/search predicate.
/// - [`scanner`]: One-level directory scanning with recursive folder sizing.
/// - [`config`]: Category table, compression profile and scan options.
pub mod analysis;
pub mod config;
pub mod filter;
pub mod model;
pub mod scanner;

pub use analysis::{Category, CategoryTable, CompressionProfile, ScanReport, ScanSummary};
pub use config::AnalyzerConfig;
pub use model::{Entry, EntryKind, FilterCriteria};
pub use scanner::progress::ScanProgress;
pub use scanner::{ScanHandle, ScanOptions, ScanRequest, Scanner};
