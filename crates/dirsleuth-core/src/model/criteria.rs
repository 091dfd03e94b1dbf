/// Filter criteria: the immutable, per-request query threaded through a scan.
///
/// A `FilterCriteria` is built once by a front-end from whatever inputs it
/// has (flags, form fields) and never mutated while a scan runs. Every
/// component is optional; an absent component admits everything.
use crate::analysis::file_types::{normalize_extension, Category, CategoryTable};
use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Placeholder text some front-ends show in an empty search box.
/// It is never treated as a real search term.
pub const SEARCH_PLACEHOLDER: &str = "Enter file or folder name...";

/// Date format accepted for textual date bounds.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Size bounds used when the caller's bounds cannot be parsed.
pub const DEFAULT_MIN_GB: f64 = 0.0;
pub const DEFAULT_MAX_GB: f64 = 1000.0;

/// Inclusive file-size range in (binary) gigabytes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SizeRange {
    pub min_gb: f64,
    pub max_gb: f64,
}

impl SizeRange {
    pub fn new(min_gb: f64, max_gb: f64) -> Self {
        Self { min_gb, max_gb }
    }

    /// Parse textual bounds. If either bound is malformed the whole range
    /// falls back to `[0, 1000]` GB instead of failing the request.
    pub fn parse_or_default(min: &str, max: &str) -> Self {
        match (parse_gb(min), parse_gb(max)) {
            (Some(min_gb), Some(max_gb)) => Self { min_gb, max_gb },
            _ => Self::default(),
        }
    }

    #[inline]
    pub fn contains_gb(&self, gb: f64) -> bool {
        self.min_gb <= gb && gb <= self.max_gb
    }
}

impl Default for SizeRange {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_GB, DEFAULT_MAX_GB)
    }
}

fn parse_gb(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Common size buckets offered as one-click presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizePreset {
    /// Under 1 MB.
    Small,
    /// 1 MB to 100 MB.
    Medium,
    /// 100 MB to 1 GB.
    Large,
    /// Over 1 GB.
    VeryLarge,
}

impl SizePreset {
    pub fn range(self) -> SizeRange {
        match self {
            Self::Small => SizeRange::new(0.0, 0.001),
            Self::Medium => SizeRange::new(0.001, 0.1),
            Self::Large => SizeRange::new(0.1, 1.0),
            Self::VeryLarge => SizeRange::new(1.0, 1000.0),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Small => "Small (<1MB)",
            Self::Medium => "Medium (1MB-100MB)",
            Self::Large => "Large (100MB-1GB)",
            Self::VeryLarge => "Very Large (>1GB)",
        }
    }
}

/// Inclusive creation-time range, in local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Whole-day range: from the start of `start` to the end of `end`.
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> Self {
        Self::new(start_of_day(start), end_of_day(end))
    }

    /// Parse `YYYY-MM-DD` bounds. If either bound is malformed the whole
    /// range falls back to 2020-01-01 ..= 2025-12-31.
    pub fn parse_or_default(start: &str, end: &str) -> Self {
        let parse = |s: &str| NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok();
        match (parse(start), parse(end)) {
            (Some(s), Some(e)) => Self::from_dates(s, e),
            _ => Self::default(),
        }
    }

    /// The last `days` days up to and including `today`.
    pub fn last_days(days: u32, today: NaiveDate) -> Self {
        let start = today - Duration::days(i64::from(days));
        Self::from_dates(start, today)
    }

    /// [`DateRange::last_days`] relative to the local calendar date.
    pub fn last_days_from_now(days: u32) -> Self {
        Self::last_days(days, Local::now().date_naive())
    }

    #[inline]
    pub fn contains(&self, instant: &NaiveDateTime) -> bool {
        self.start <= *instant && *instant <= self.end
    }
}

impl Default for DateRange {
    fn default() -> Self {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid calendar date");
        let end = NaiveDate::from_ymd_opt(2025, 12, 31).expect("valid calendar date");
        Self::from_dates(start, end)
    }
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_nano_opt(23, 59, 59, 999_999_999)
        .unwrap_or_else(|| start_of_day(date))
}

/// Name search against entry names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    pub term: String,
    pub case_sensitive: bool,
    pub exact_match: bool,
}

impl SearchQuery {
    /// Case-insensitive substring search.
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            case_sensitive: false,
            exact_match: false,
        }
    }

    pub fn case_sensitive(mut self, yes: bool) -> Self {
        self.case_sensitive = yes;
        self
    }

    pub fn exact_match(mut self, yes: bool) -> Self {
        self.exact_match = yes;
        self
    }

    /// The term with surrounding whitespace removed, or `None` when it is
    /// empty or the UI placeholder.
    pub fn effective_term(&self) -> Option<&str> {
        let term = self.term.trim();
        if term.is_empty() || term == SEARCH_PLACEHOLDER {
            None
        } else {
            Some(term)
        }
    }

    /// Whether `name` satisfies the query. A query without an effective
    /// term matches every name.
    pub fn matches(&self, name: &str) -> bool {
        let Some(term) = self.effective_term() else {
            return true;
        };

        if self.case_sensitive {
            compare(name, term, self.exact_match)
        } else {
            compare(&name.to_lowercase(), &term.to_lowercase(), self.exact_match)
        }
    }
}

#[inline]
fn compare(name: &str, term: &str, exact: bool) -> bool {
    if exact {
        name == term
    } else {
        name.contains(term)
    }
}

/// The compound query applied to every entry of a scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterCriteria {
    /// Allowed file extensions (lowercase, with leading dot). Empty means
    /// no type restriction.
    pub type_extensions: BTreeSet<String>,
    pub size_range: Option<SizeRange>,
    pub date_range: Option<DateRange>,
    pub search: Option<SearchQuery>,
}

impl FilterCriteria {
    /// Criteria that admit everything.
    pub fn none() -> Self {
        Self::default()
    }

    /// Restrict to the extensions of the selected categories plus any
    /// comma-separated custom extensions (`"pdf, .MP4"`). Custom entries
    /// are normalised and everything is de-duplicated.
    pub fn with_types(
        mut self,
        categories: &[Category],
        custom: &str,
        table: &CategoryTable,
    ) -> Self {
        self.type_extensions = type_extensions_from_selection(categories, custom, table);
        self
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.type_extensions = extensions
            .into_iter()
            .filter_map(|e| normalize_extension(e.as_ref()))
            .collect();
        self
    }

    pub fn with_size_range(mut self, range: SizeRange) -> Self {
        self.size_range = Some(range);
        self
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    pub fn with_search(mut self, search: SearchQuery) -> Self {
        self.search = Some(search);
        self
    }

    /// `true` when no component restricts anything.
    pub fn is_unrestricted(&self) -> bool {
        self.type_extensions.is_empty()
            && self.size_range.is_none()
            && self.date_range.is_none()
            && self
                .search
                .as_ref()
                .map_or(true, |s| s.effective_term().is_none())
    }
}

/// Expand a category selection plus custom extension text into one
/// normalised, de-duplicated extension set.
pub fn type_extensions_from_selection(
    categories: &[Category],
    custom: &str,
    table: &CategoryTable,
) -> BTreeSet<String> {
    let mut set = BTreeSet::new();
    for &category in categories {
        set.extend(table.extensions_of(category).iter().cloned());
    }
    set.extend(custom.split(',').filter_map(normalize_extension));
    set
}

/// One-line description of the active filters, e.g.
/// `Types: .doc, .pdf | Size: 0-1GB | Search: 'report'`.
impl fmt::Display for FilterCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();

        if !self.type_extensions.is_empty() {
            let shown: Vec<&str> = self
                .type_extensions
                .iter()
                .take(3)
                .map(String::as_str)
                .collect();
            let more = if self.type_extensions.len() > 3 { "..." } else { "" };
            parts.push(format!("Types: {}{more}", shown.join(", ")));
        }
        if let Some(size) = &self.size_range {
            parts.push(format!("Size: {}-{}GB", size.min_gb, size.max_gb));
        }
        if let Some(date) = &self.date_range {
            parts.push(format!(
                "Date: {} to {}",
                date.start.format(DATE_FORMAT),
                date.end.format(DATE_FORMAT)
            ));
        }
        if let Some(term) = self.search.as_ref().and_then(|s| s.effective_term()) {
            parts.push(format!("Search: '{term}'"));
        }

        if parts.is_empty() {
            f.write_str("No filters active")
        } else {
            f.write_str(&parts.join(" | "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn size_range_is_inclusive() {
        let r = SizeRange::new(1.0, 2.0);
        assert!(r.contains_gb(1.0));
        assert!(r.contains_gb(2.0));
        assert!(!r.contains_gb(2.000_1));
        assert!(!r.contains_gb(0.999));
    }

    #[test]
    fn malformed_size_bounds_fall_back() {
        assert_eq!(SizeRange::parse_or_default("abc", "5"), SizeRange::new(0.0, 1000.0));
        assert_eq!(SizeRange::parse_or_default("1", ""), SizeRange::new(0.0, 1000.0));
        assert_eq!(SizeRange::parse_or_default("nan", "1"), SizeRange::new(0.0, 1000.0));
        assert_eq!(SizeRange::parse_or_default(" 0.5 ", "2"), SizeRange::new(0.5, 2.0));
    }

    #[test]
    fn size_presets() {
        assert_eq!(SizePreset::Small.range(), SizeRange::new(0.0, 0.001));
        assert_eq!(SizePreset::VeryLarge.range(), SizeRange::new(1.0, 1000.0));
    }

    #[test]
    fn date_range_covers_whole_end_day() {
        let r = DateRange::parse_or_default("2024-01-01", "2024-01-31");
        assert!(r.contains(&date(2024, 1, 1).and_hms_opt(0, 0, 0).unwrap()));
        assert!(r.contains(&date(2024, 1, 31).and_hms_opt(23, 59, 59).unwrap()));
        assert!(!r.contains(&date(2024, 2, 1).and_hms_opt(0, 0, 0).unwrap()));
        assert!(!r.contains(&date(2023, 12, 31).and_hms_opt(23, 59, 59).unwrap()));
    }

    #[test]
    fn malformed_date_bounds_fall_back_to_wide_default() {
        let fallback = DateRange::parse_or_default("01/02/2024", "2024-13-45");
        assert_eq!(fallback, DateRange::from_dates(date(2020, 1, 1), date(2025, 12, 31)));
        assert_eq!(DateRange::parse_or_default("", "2024-01-01"), DateRange::default());
    }

    #[test]
    fn last_days_ends_today() {
        let r = DateRange::last_days(7, date(2024, 3, 10));
        assert_eq!(r.start.date(), date(2024, 3, 3));
        assert_eq!(r.end.date(), date(2024, 3, 10));
        assert!(r.contains(&date(2024, 3, 10).and_hms_opt(18, 0, 0).unwrap()));
    }

    #[test]
    fn search_substring_case_insensitive_by_default() {
        let q = SearchQuery::new("doc");
        assert!(q.matches("MyDocument.pdf"));
        assert!(!q.exact_match(true).matches("MyDocument.pdf"));
    }

    #[test]
    fn search_case_sensitive() {
        let q = SearchQuery::new("doc").case_sensitive(true);
        assert!(!q.matches("MyDocument.pdf"));
        assert!(q.matches("my-doc.txt"));
    }

    #[test]
    fn search_exact_ignores_case_unless_asked() {
        let q = SearchQuery::new("notes").exact_match(true);
        assert!(q.matches("Notes"));
        assert!(!q.clone().case_sensitive(true).matches("Notes"));
        assert!(!q.matches("Notes.txt"));
    }

    #[test]
    fn empty_or_placeholder_term_matches_everything() {
        assert!(SearchQuery::new("").matches("anything"));
        assert!(SearchQuery::new("   ").exact_match(true).matches("anything"));
        assert!(SearchQuery::new(SEARCH_PLACEHOLDER).matches("anything"));
    }

    #[test]
    fn custom_extensions_are_normalised_and_deduplicated() {
        let table = CategoryTable::builtin();
        let set =
            type_extensions_from_selection(&[Category::Documents], "pdf, .PDF,  mp4 ,,", table);
        assert!(set.contains(".pdf"));
        assert!(set.contains(".mp4"));
        assert!(set.contains(".docx"));
        assert_eq!(set.iter().filter(|e| *e == ".pdf").count(), 1);
        assert_eq!(set.len(), table.extensions_of(Category::Documents).len() + 1);
    }

    #[test]
    fn with_and_without_dot_are_identical() {
        let a = FilterCriteria::none().with_extensions(["pdf"]);
        let b = FilterCriteria::none().with_extensions([".pdf"]);
        assert_eq!(a, b);
    }

    #[test]
    fn describe_active_filters() {
        assert_eq!(FilterCriteria::none().to_string(), "No filters active");
        let c = FilterCriteria::none()
            .with_extensions(["pdf"])
            .with_size_range(SizeRange::new(0.0, 1.0))
            .with_search(SearchQuery::new("report"));
        assert_eq!(c.to_string(), "Types: .pdf | Size: 0-1GB | Search: 'report'");
        assert!(!c.is_unrestricted());
        assert!(FilterCriteria::none().with_search(SearchQuery::new("")).is_unrestricted());
    }
}
