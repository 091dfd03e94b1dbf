/// A single classified child of the scanned root.
///
/// Entries are created per scan request and discarded once the caller has
/// consumed the report. They are plain values: nothing here touches the
/// filesystem, so exporters can hold on to a report without it changing.
use crate::analysis::file_types::Category;
use chrono::{DateTime, Local};
use compact_str::CompactString;
use serde::{Serialize, Serializer};
use std::path::Path;

/// What an entry represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum EntryKind {
    /// A sub-directory of the root. Its size is the recursive sum of the
    /// files beneath it.
    Folder,
    /// A regular file directly under the root.
    File,
    /// A synthetic entry standing in for a failed scan of the root.
    Error,
}

impl EntryKind {
    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Folder => "Folder",
            Self::File => "File",
            Self::Error => "Error",
        }
    }
}

/// The category shown for an entry.
///
/// Files get whatever the category table says about their extension;
/// folders and errors bypass the table and always get a fixed label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryLabel {
    File(Category),
    Folder,
    Error,
}

impl CategoryLabel {
    pub fn label(self) -> &'static str {
        match self {
            Self::File(category) => category.label(),
            Self::Folder => "Folder",
            Self::Error => "Error",
        }
    }

    /// The file category, if this is a file label.
    pub fn category(self) -> Option<Category> {
        match self {
            Self::File(category) => Some(category),
            Self::Folder | Self::Error => None,
        }
    }
}

impl Serialize for CategoryLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Extension shown for folders in place of a real extension.
pub const FOLDER_EXTENSION_LABEL: &str = "<dir>";
/// Extension shown for error entries in place of a real extension.
pub const ERROR_EXTENSION_LABEL: &str = "<error>";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    /// Final path component only.
    pub name: CompactString,

    pub kind: EntryKind,

    /// For files their own length, for folders the recursive sum of the
    /// files beneath them, for errors always zero.
    pub size_bytes: u64,

    /// Lowercase extension including the leading dot (".pdf").
    /// `None` for folders, errors and files without an extension.
    pub extension: Option<CompactString>,

    pub category: CategoryLabel,

    /// Absolute path for display and export. Never parsed back.
    pub full_path: String,

    /// Creation time (files only). Falls back to the modification time on
    /// filesystems that do not record a birth time.
    pub created: Option<DateTime<Local>>,

    /// Last modification time (files only).
    pub modified: Option<DateTime<Local>>,
}

impl Entry {
    /// Create a file entry. Timestamps are attached with [`Entry::with_times`].
    pub fn file(
        name: impl Into<CompactString>,
        full_path: impl Into<String>,
        size_bytes: u64,
        extension: Option<CompactString>,
        category: Category,
    ) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
            size_bytes,
            extension,
            category: CategoryLabel::File(category),
            full_path: full_path.into(),
            created: None,
            modified: None,
        }
    }

    /// Create a folder entry with its aggregate size.
    pub fn folder(
        name: impl Into<CompactString>,
        full_path: impl Into<String>,
        size_bytes: u64,
    ) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Folder,
            size_bytes,
            extension: None,
            category: CategoryLabel::Folder,
            full_path: full_path.into(),
            created: None,
            modified: None,
        }
    }

    /// Create the synthetic entry that replaces a failed scan of `full_path`.
    pub fn error(message: impl AsRef<str>, full_path: impl Into<String>) -> Self {
        Self {
            name: CompactString::new(format!("Error: {}", message.as_ref())),
            kind: EntryKind::Error,
            size_bytes: 0,
            extension: None,
            category: CategoryLabel::Error,
            full_path: full_path.into(),
            created: None,
            modified: None,
        }
    }

    pub fn with_times(
        mut self,
        created: Option<DateTime<Local>>,
        modified: Option<DateTime<Local>>,
    ) -> Self {
        self.created = created;
        self.modified = modified;
        self
    }

    #[inline]
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    #[inline]
    pub fn is_folder(&self) -> bool {
        self.kind == EntryKind::Folder
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.kind == EntryKind::Error
    }

    /// The extension column as exporters show it: the real extension for
    /// files (empty if there is none), a fixed marker otherwise.
    pub fn extension_label(&self) -> &str {
        match self.kind {
            EntryKind::File => self.extension.as_deref().unwrap_or(""),
            EntryKind::Folder => FOLDER_EXTENSION_LABEL,
            EntryKind::Error => ERROR_EXTENSION_LABEL,
        }
    }
}

/// Extract the lowercase extension (with leading dot) from a file name.
///
/// Dot-files such as `.bashrc` and names ending in a bare dot have no
/// extension; only the last component counts (`a.tar.gz` -> `.gz`).
pub fn extension_of(name: &str) -> Option<CompactString> {
    let ext = Path::new(name).extension()?.to_str()?;
    if ext.is_empty() {
        return None;
    }
    let mut out = CompactString::with_capacity(ext.len() + 1);
    out.push('.');
    for ch in ext.chars() {
        out.extend(ch.to_lowercase());
    }
    Some(out)
}
