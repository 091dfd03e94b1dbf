/// Command-line arguments and their translation into `FilterCriteria`.
use anyhow::{bail, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand, ValueEnum};
use dirsleuth_core::analysis::Category;
use dirsleuth_core::model::criteria::DATE_FORMAT;
use dirsleuth_core::model::{DateRange, SearchQuery, SizePreset, SizeRange};
use dirsleuth_core::{CategoryTable, FilterCriteria};
use std::path::PathBuf;

/// Bounds used when only one side of a range is given.
const DEFAULT_SINCE: &str = "2020-01-01";
const DEFAULT_MIN_GB: &str = "0.0";
const DEFAULT_MAX_GB: &str = "1000.0";

#[derive(Debug, Parser)]
#[command(name = "dirsleuth")]
#[command(about = "Analyse a folder: sizes, file categories, filters and compression savings")]
#[command(version)]
pub struct Cli {
    /// JSON config file (category table, compression profile, scan options)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Debug-level logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the direct children of one or more folders
    Scan {
        /// Folders to scan
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[command(flatten)]
        filters: FilterArgs,

        #[command(flatten)]
        output: OutputArgs,

        /// Reuse folder sizes for unchanged folders
        #[arg(long)]
        memoize: bool,

        /// Size subfolders with a parallel walker
        #[arg(long)]
        parallel: bool,
    },

    /// Estimate compression savings for the files of a folder
    Optimize {
        /// Folder to analyse
        path: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,

        #[command(flatten)]
        output: OutputArgs,

        /// Number of algorithms to list in the totals
        #[arg(long, default_value_t = 5)]
        top: usize,
    },

    /// Print the active category table and compression profile
    Profile {
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Keep only files of this category (repeatable)
    #[arg(long = "type", value_name = "CATEGORY")]
    pub types: Vec<Category>,

    /// Comma-separated extra extensions, e.g. "log,.bak"
    #[arg(long, value_name = "LIST")]
    pub ext: Option<String>,

    /// Minimum file size in GB
    #[arg(long, value_name = "GB", allow_hyphen_values = true)]
    pub min_gb: Option<String>,

    /// Maximum file size in GB
    #[arg(long, value_name = "GB", allow_hyphen_values = true)]
    pub max_gb: Option<String>,

    /// Size preset
    #[arg(long, value_enum, conflicts_with_all = ["min_gb", "max_gb"])]
    pub size: Option<SizeArg>,

    /// Files created on or after this day (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub since: Option<String>,

    /// Files created on or before this day (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub until: Option<String>,

    /// Files created in the last N days
    #[arg(long, value_name = "N", conflicts_with_all = ["since", "until"])]
    pub last_days: Option<u32>,

    /// Name substring to look for (files and folders)
    #[arg(long, value_name = "TERM")]
    pub search: Option<String>,

    /// Match the search term case-sensitively
    #[arg(long)]
    pub case_sensitive: bool,

    /// Require the whole name to equal the search term
    #[arg(long)]
    pub exact: bool,
}

impl FilterArgs {
    /// Build the immutable criteria for one request. Malformed size or
    /// date bounds fall back to the default ranges instead of failing.
    ///
    /// A selected category with no extensions in `table` is an error: an
    /// empty extension set would lift the type restriction altogether.
    pub fn to_criteria(&self, table: &CategoryTable) -> Result<FilterCriteria> {
        let mut criteria = FilterCriteria::none();

        if let Some(&empty) = self
            .types
            .iter()
            .find(|&&c| table.extensions_of(c).is_empty())
        {
            bail!("category '{}' has no extensions to filter on", empty.label());
        }

        if !self.types.is_empty() || self.ext.is_some() {
            let custom = self.ext.as_deref().unwrap_or("");
            criteria = criteria.with_types(&self.types, custom, table);
        }

        if let Some(preset) = self.size {
            criteria = criteria.with_size_range(SizePreset::from(preset).range());
        } else if self.min_gb.is_some() || self.max_gb.is_some() {
            criteria = criteria.with_size_range(SizeRange::parse_or_default(
                self.min_gb.as_deref().unwrap_or(DEFAULT_MIN_GB),
                self.max_gb.as_deref().unwrap_or(DEFAULT_MAX_GB),
            ));
        }

        if let Some(days) = self.last_days {
            criteria = criteria.with_date_range(DateRange::last_days_from_now(days));
        } else if self.since.is_some() || self.until.is_some() {
            let today = Local::now().date_naive().format(DATE_FORMAT).to_string();
            criteria = criteria.with_date_range(DateRange::parse_or_default(
                self.since.as_deref().unwrap_or(DEFAULT_SINCE),
                self.until.as_deref().unwrap_or(&today),
            ));
        }

        if let Some(term) = &self.search {
            criteria = criteria.with_search(
                SearchQuery::new(term.as_str())
                    .case_sensitive(self.case_sensitive)
                    .exact_match(self.exact),
            );
        }

        Ok(criteria)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SizeArg {
    Small,
    Medium,
    Large,
    VeryLarge,
}

impl From<SizeArg> for SizePreset {
    fn from(arg: SizeArg) -> Self {
        match arg {
            SizeArg::Small => Self::Small,
            SizeArg::Medium => Self::Medium,
            SizeArg::Large => Self::Large,
            SizeArg::VeryLarge => Self::VeryLarge,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

#[derive(Debug, Clone, Default, Args)]
pub struct OutputArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Write to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}
