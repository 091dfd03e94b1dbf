/// Data model for a DirSleuth scan.
///
/// Re-exports the entry type, the filter criteria and size helpers.
pub mod criteria;
pub mod entry;
pub mod size;

pub use criteria::{DateRange, FilterCriteria, SearchQuery, SizePreset, SizeRange};
pub use entry::{extension_of, CategoryLabel, Entry, EntryKind};
