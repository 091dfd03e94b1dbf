/// File type categorisation based on file extensions.
///
/// Maps extensions to broad categories (Documents, Images, Videos, ...)
/// through an ordered table and computes size/count totals per category.
/// The built-in table is process-wide and read-only; a config file may
/// supply a different one, which is then shared behind an `Arc`.
use crate::model::{Entry, EntryKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Broad file type categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Documents,
    Images,
    Videos,
    Audio,
    Archives,
    Code,
    Spreadsheets,
    Presentations,
    Other,
}

impl Category {
    /// Every category that can appear in a table, in built-in order.
    pub const TABLE_ORDER: [Category; 8] = [
        Self::Documents,
        Self::Images,
        Self::Videos,
        Self::Audio,
        Self::Archives,
        Self::Code,
        Self::Spreadsheets,
        Self::Presentations,
    ];

    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Documents => "Documents",
            Self::Images => "Images",
            Self::Videos => "Videos",
            Self::Audio => "Audio",
            Self::Archives => "Archives",
            Self::Code => "Code",
            Self::Spreadsheets => "Spreadsheets",
            Self::Presentations => "Presentations",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a category name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    /// Case-insensitive; accepts the singular "video" as well.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let category = match lower.as_str() {
            "documents" | "document" | "docs" => Self::Documents,
            "images" | "image" => Self::Images,
            "videos" | "video" => Self::Videos,
            "audio" => Self::Audio,
            "archives" | "archive" => Self::Archives,
            "code" => Self::Code,
            "spreadsheets" | "spreadsheet" => Self::Spreadsheets,
            "presentations" | "presentation" => Self::Presentations,
            "other" => Self::Other,
            _ => return Err(UnknownCategory(s.to_string())),
        };
        Ok(category)
    }
}

/// Normalise user-supplied extension text: trimmed, lowercase, with a
/// leading dot. `"PDF"` and `" .pdf "` both become `".pdf"`.
/// Empty input (or a lone dot) yields `None`.
pub fn normalize_extension(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "." {
        return None;
    }
    let lower = trimmed.to_lowercase();
    if lower.starts_with('.') {
        Some(lower)
    } else {
        Some(format!(".{lower}"))
    }
}

/// The extensions belonging to one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryExtensions {
    pub category: Category,
    pub extensions: Vec<String>,
}

/// Ordered category → extension-set table.
///
/// Lookup goes through a pre-built index; when two categories claim the
/// same extension the one listed first wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CategoryExtensions>", into = "Vec<CategoryExtensions>")]
pub struct CategoryTable {
    groups: Vec<CategoryExtensions>,
    index: HashMap<String, Category>,
}

/// Longest extension (including the dot) the index can hold.
const MAX_EXTENSION_LEN: usize = 17;

impl CategoryTable {
    /// Build a table from ordered groups. Extensions are normalised.
    pub fn new(groups: Vec<CategoryExtensions>) -> Self {
        let groups: Vec<CategoryExtensions> = groups
            .into_iter()
            .map(|g| CategoryExtensions {
                category: g.category,
                extensions: g
                    .extensions
                    .iter()
                    .filter_map(|e| normalize_extension(e))
                    .collect(),
            })
            .collect();

        let mut index = HashMap::with_capacity(groups.iter().map(|g| g.extensions.len()).sum());
        for group in &groups {
            for ext in &group.extensions {
                index.entry(ext.clone()).or_insert(group.category);
            }
        }

        Self { groups, index }
    }

    /// The built-in table, built once per process.
    pub fn builtin() -> &'static CategoryTable {
        static BUILTIN: OnceLock<CategoryTable> = OnceLock::new();
        BUILTIN.get_or_init(|| Self::new(builtin_groups()))
    }

    /// Categorise a file extension (with or without the leading dot).
    ///
    /// Zero-heap-allocation hot path: the extension is lowercased into a
    /// fixed-size stack buffer rather than a `String`. Extensions too long
    /// for the buffer are `Other`.
    pub fn categorise(&self, ext: &str) -> Category {
        let bytes = ext.as_bytes();
        let body = bytes.strip_prefix(b".").unwrap_or(bytes);
        if body.is_empty() || body.len() + 1 > MAX_EXTENSION_LEN {
            return Category::Other;
        }

        let mut lower = [0u8; MAX_EXTENSION_LEN];
        lower[0] = b'.';
        for (dest, &src) in lower[1..].iter_mut().zip(body.iter()) {
            *dest = src.to_ascii_lowercase();
        }
        let lower_str = match std::str::from_utf8(&lower[..body.len() + 1]) {
            Ok(s) => s,
            Err(_) => return Category::Other,
        };

        self.index.get(lower_str).copied().unwrap_or(Category::Other)
    }

    /// Extensions listed for `category` (empty if it has no group).
    pub fn extensions_of(&self, category: Category) -> &[String] {
        self.groups
            .iter()
            .find(|g| g.category == category)
            .map(|g| g.extensions.as_slice())
            .unwrap_or(&[])
    }

    /// Groups in table order.
    pub fn groups(&self) -> &[CategoryExtensions] {
        &self.groups
    }

    /// First extension claimed by more than one category, if any:
    /// `(extension, first owner, later owner)`.
    pub fn first_overlap(&self) -> Option<(String, Category, Category)> {
        for group in &self.groups {
            for ext in &group.extensions {
                if let Some(&owner) = self.index.get(ext) {
                    if owner != group.category {
                        return Some((ext.clone(), owner, group.category));
                    }
                }
            }
        }
        None
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::builtin().clone()
    }
}

impl From<Vec<CategoryExtensions>> for CategoryTable {
    fn from(groups: Vec<CategoryExtensions>) -> Self {
        Self::new(groups)
    }
}

impl From<CategoryTable> for Vec<CategoryExtensions> {
    fn from(table: CategoryTable) -> Self {
        table.groups
    }
}

fn builtin_groups() -> Vec<CategoryExtensions> {
    let group = |category, exts: &[&str]| CategoryExtensions {
        category,
        extensions: exts.iter().map(|e| e.to_string()).collect(),
    };
    vec![
        group(
            Category::Documents,
            &[".pdf", ".doc", ".docx", ".txt", ".rtf", ".odt", ".pages"],
        ),
        group(
            Category::Images,
            &[".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff", ".svg", ".webp"],
        ),
        group(
            Category::Videos,
            &[".mp4", ".avi", ".mkv", ".mov", ".wmv", ".flv", ".webm", ".m4v"],
        ),
        group(
            Category::Audio,
            &[".mp3", ".wav", ".flac", ".aac", ".ogg", ".wma", ".m4a"],
        ),
        group(
            Category::Archives,
            &[".zip", ".rar", ".7z", ".tar", ".gz", ".bz2", ".xz"],
        ),
        group(
            Category::Code,
            &[".py", ".js", ".html", ".css", ".java", ".cpp", ".c", ".php", ".sql"],
        ),
        group(
            Category::Spreadsheets,
            &[".xlsx", ".xls", ".csv", ".ods", ".numbers"],
        ),
        group(Category::Presentations, &[".pptx", ".ppt", ".odp", ".key"]),
    ]
}

/// Size and count totals for a single file category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryStats {
    pub category: Category,
    pub total_size: u64,
    pub file_count: u64,
}

/// Compute per-category size and count stats over the files of a result.
/// Folders and errors are skipped. Sorted by total size descending, then
/// by category for a stable order.
pub fn analyse_categories(entries: &[Entry]) -> Vec<CategoryStats> {
    let mut map: HashMap<Category, CategoryStats> = HashMap::with_capacity(9);

    for entry in entries {
        if entry.kind != EntryKind::File {
            continue;
        }
        let Some(category) = entry.category.category() else {
            continue;
        };

        let stats = map.entry(category).or_insert(CategoryStats {
            category,
            total_size: 0,
            file_count: 0,
        });
        stats.total_size += entry.size_bytes;
        stats.file_count += 1;
    }

    let mut results: Vec<CategoryStats> = map.into_values().collect();
    results.sort_by(|a, b| {
        b.total_size
            .cmp(&a.total_size)
            .then(a.category.cmp(&b.category))
    });
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── categorise ───────────────────────────────────────────────────────

    #[test]
    fn categorise_known_extensions() {
        let t = CategoryTable::builtin();
        for (ext, expected) in [
            (".pdf", Category::Documents),
            (".jpeg", Category::Images),
            (".mkv", Category::Videos),
            (".flac", Category::Audio),
            (".7z", Category::Archives),
            (".sql", Category::Code),
            (".csv", Category::Spreadsheets),
            (".key", Category::Presentations),
        ] {
            assert_eq!(t.categorise(ext), expected, "expected {expected} for {ext}");
        }
    }

    #[test]
    fn categorise_accepts_missing_dot() {
        assert_eq!(CategoryTable::builtin().categorise("mp4"), Category::Videos);
    }

    /// Extension matching must be case-insensitive so ".JPG" == ".jpg".
    #[test]
    fn categorise_case_insensitive() {
        let t = CategoryTable::builtin();
        assert_eq!(t.categorise(".JPG"), Category::Images);
        assert_eq!(t.categorise(".Docx"), Category::Documents);
        assert_eq!(t.categorise("ZIP"), Category::Archives);
    }

    #[test]
    fn categorise_unknown_extension_returns_other() {
        let t = CategoryTable::builtin();
        assert_eq!(t.categorise(".xyz"), Category::Other);
        assert_eq!(t.categorise(""), Category::Other);
        assert_eq!(t.categorise("."), Category::Other);
        assert_eq!(t.categorise(".averyveryverylongextension"), Category::Other);
    }

    #[test]
    fn builtin_table_has_no_overlaps() {
        assert_eq!(CategoryTable::builtin().first_overlap(), None);
    }

    #[test]
    fn first_listed_category_wins_on_overlap() {
        let t = CategoryTable::new(vec![
            CategoryExtensions {
                category: Category::Code,
                extensions: vec!["json".into()],
            },
            CategoryExtensions {
                category: Category::Documents,
                extensions: vec![".JSON".into()],
            },
        ]);
        assert_eq!(t.categorise(".json"), Category::Code);
        assert_eq!(
            t.first_overlap(),
            Some((".json".to_string(), Category::Code, Category::Documents))
        );
    }

    #[test]
    fn category_from_str() {
        assert_eq!("videos".parse::<Category>(), Ok(Category::Videos));
        assert_eq!("Video".parse::<Category>(), Ok(Category::Videos));
        assert_eq!(" DOCUMENTS ".parse::<Category>(), Ok(Category::Documents));
        assert!("music".parse::<Category>().is_err());
    }

    #[test]
    fn table_round_trips_through_json_as_list() {
        let json = serde_json::to_string(CategoryTable::builtin()).unwrap();
        assert!(json.starts_with('['));
        let back: CategoryTable = serde_json::from_str(&json).unwrap();
        assert_eq!(&back, CategoryTable::builtin());
    }

    // ── analyse_categories ───────────────────────────────────────────────

    #[test]
    fn analyse_aggregates_by_category_and_skips_folders() {
        let entries = vec![
            Entry::file("a.py", "/r/a.py", 100, Some(".py".into()), Category::Code),
            Entry::file("b.js", "/r/b.js", 100, Some(".js".into()), Category::Code),
            Entry::file("c.png", "/r/c.png", 50, Some(".png".into()), Category::Images),
            Entry::folder("src", "/r/src", 10_000),
        ];

        let stats = analyse_categories(&entries);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].category, Category::Code);
        assert_eq!(stats[0].total_size, 200);
        assert_eq!(stats[0].file_count, 2);
        assert_eq!(stats[1].category, Category::Images);
    }

    #[test]
    fn analyse_empty() {
        assert!(analyse_categories(&[]).is_empty());
    }
}
