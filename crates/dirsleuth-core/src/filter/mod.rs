/// The filter pipeline: admits or rejects one classified entry.
///
/// All four predicates are pure and ANDed. Files face every predicate;
/// folders only the name search, since their size is a derived aggregate
/// and they carry no extension or creation time of their own. Error
/// entries are always admitted: they replace the whole result and must
/// reach the caller whatever the filters say.
use crate::model::size::bytes_to_gb;
use crate::model::{Entry, EntryKind, FilterCriteria};

/// Evaluates one `FilterCriteria` against entries.
#[derive(Debug, Clone, Copy)]
pub struct FilterPipeline<'a> {
    criteria: &'a FilterCriteria,
}

impl<'a> FilterPipeline<'a> {
    pub fn new(criteria: &'a FilterCriteria) -> Self {
        Self { criteria }
    }

    pub fn criteria(&self) -> &'a FilterCriteria {
        self.criteria
    }

    /// Whether `entry` passes every active predicate.
    ///
    /// Cheap predicates run first; the result does not depend on order.
    pub fn admits(&self, entry: &Entry) -> bool {
        match entry.kind {
            EntryKind::Error => true,
            EntryKind::Folder => self.search_matches(entry),
            EntryKind::File => {
                self.type_matches(entry)
                    && self.size_matches(entry)
                    && self.search_matches(entry)
                    && self.date_matches(entry)
            }
        }
    }

    /// Folders always pass. Files pass when no type restriction is set or
    /// their extension is in the allowed set.
    pub fn type_matches(&self, entry: &Entry) -> bool {
        if entry.kind != EntryKind::File || self.criteria.type_extensions.is_empty() {
            return true;
        }
        entry
            .extension
            .as_deref()
            .is_some_and(|ext| self.criteria.type_extensions.contains(ext))
    }

    /// Inclusive GB range check, files only.
    pub fn size_matches(&self, entry: &Entry) -> bool {
        match (&self.criteria.size_range, entry.kind) {
            (Some(range), EntryKind::File) => range.contains_gb(bytes_to_gb(entry.size_bytes)),
            _ => true,
        }
    }

    /// Inclusive creation-time check, files only. A file whose creation
    /// time is unknown cannot be shown to fall inside the range and is
    /// rejected.
    pub fn date_matches(&self, entry: &Entry) -> bool {
        match (&self.criteria.date_range, entry.kind) {
            (Some(range), EntryKind::File) => entry
                .created
                .is_some_and(|created| range.contains(&created.naive_local())),
            _ => true,
        }
    }

    /// Name search; applies to files and folders alike.
    pub fn search_matches(&self, entry: &Entry) -> bool {
        self.criteria
            .search
            .as_ref()
            .map_or(true, |q| q.matches(&entry.name))
    }
}

/// Keep only the admitted entries.
pub fn apply(criteria: &FilterCriteria, entries: Vec<Entry>) -> Vec<Entry> {
    let pipeline = FilterPipeline::new(criteria);
    entries.into_iter().filter(|e| pipeline.admits(e)).collect()
}
