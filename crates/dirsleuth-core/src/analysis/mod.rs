/// Analysis modules: classification, savings estimates and result totals.
pub mod file_types;
pub mod savings;
pub mod summary;
pub mod top_files;

pub use file_types::{
    analyse_categories, normalize_extension, Category, CategoryExtensions, CategoryStats,
    CategoryTable,
};
pub use savings::{
    AlgorithmRatio, CategoryProfile, CompressionProfile, OptimizationReport, SavingsEstimate,
    SavingsTable,
};
pub use summary::{order_entries, summarize, FileRef, ScanReport, ScanSummary};
pub use top_files::top_entries;
