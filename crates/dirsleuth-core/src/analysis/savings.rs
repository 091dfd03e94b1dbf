/// Compression savings estimates.
///
/// All figures here are advisory projections from a static ratio table.
/// No codec is ever invoked: a file of size `s` with a registered ratio
/// `r` is simply estimated to become `s * (1 - r)`.
use crate::analysis::file_types::Category;
use crate::model::size::bytes_to_gb;
use crate::model::{Entry, EntryKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Algorithm label used in reports for files whose category has no profile.
pub const NO_OPTIMIZATION: &str = "No optimization available";

/// One algorithm and its efficiency ratio `r ∈ (0, 1)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmRatio {
    pub algorithm: String,
    pub ratio: f64,
}

/// The ordered algorithms registered for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryProfile {
    pub category: Category,
    pub algorithms: Vec<AlgorithmRatio>,
}

/// Category → ordered (algorithm → ratio) table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompressionProfile {
    categories: Vec<CategoryProfile>,
}

impl CompressionProfile {
    pub fn new(categories: Vec<CategoryProfile>) -> Self {
        Self { categories }
    }

    /// The built-in profile, built once per process. The ratios are kept
    /// exactly as published because report numbers depend on them.
    pub fn builtin() -> &'static CompressionProfile {
        static BUILTIN: OnceLock<CompressionProfile> = OnceLock::new();
        BUILTIN.get_or_init(|| Self::new(builtin_profiles()))
    }

    /// Algorithms for `category`, in table order. Empty when the category
    /// has no entry.
    pub fn algorithms_for(&self, category: Category) -> &[AlgorithmRatio] {
        self.categories
            .iter()
            .find(|p| p.category == category)
            .map(|p| p.algorithms.as_slice())
            .unwrap_or(&[])
    }

    pub fn categories(&self) -> &[CategoryProfile] {
        &self.categories
    }

    /// First ratio outside the open interval (0, 1), if any.
    pub fn first_invalid_ratio(&self) -> Option<(Category, &str, f64)> {
        self.categories.iter().find_map(|p| {
            p.algorithms
                .iter()
                .find(|a| !(a.ratio > 0.0 && a.ratio < 1.0))
                .map(|a| (p.category, a.algorithm.as_str(), a.ratio))
        })
    }

    /// Estimate savings for a file of `size_gb` in `category`.
    ///
    /// Returns an empty table when no algorithm is registered for the
    /// category; that means "nothing to suggest", not an error.
    pub fn estimate(&self, category: Category, size_gb: f64) -> SavingsTable {
        let estimates = self
            .algorithms_for(category)
            .iter()
            .map(|a| SavingsEstimate::new(&a.algorithm, size_gb, a.ratio))
            .collect();
        SavingsTable { estimates }
    }
}

impl Default for CompressionProfile {
    fn default() -> Self {
        Self::builtin().clone()
    }
}

fn builtin_profiles() -> Vec<CategoryProfile> {
    let profile = |category, algos: &[(&str, f64)]| CategoryProfile {
        category,
        algorithms: algos
            .iter()
            .map(|&(name, ratio)| AlgorithmRatio {
                algorithm: name.to_string(),
                ratio,
            })
            .collect(),
    };
    vec![
        profile(
            Category::Images,
            &[
                ("JPEG Quality 85%", 0.3),
                ("WebP Conversion", 0.5),
                ("PNG Optimization", 0.2),
                ("AVIF Conversion", 0.6),
            ],
        ),
        profile(
            Category::Videos,
            &[
                ("H.264 Compression", 0.4),
                ("H.265/HEVC", 0.6),
                ("AV1 Codec", 0.7),
                ("WebM Conversion", 0.5),
            ],
        ),
        profile(
            Category::Documents,
            &[
                ("PDF Compression", 0.3),
                ("ZIP Archive", 0.4),
                ("7-Zip Archive", 0.5),
            ],
        ),
        profile(
            Category::Audio,
            &[
                ("MP3 128kbps", 0.6),
                ("AAC 128kbps", 0.7),
                ("OGG Vorbis", 0.5),
            ],
        ),
        profile(
            Category::Archives,
            &[("7-Zip LZMA2", 0.3), ("ZIP Deflate", 0.2), ("RAR5", 0.25)],
        ),
        profile(
            Category::Code,
            &[
                ("Minification", 0.4),
                ("Gzip Compression", 0.3),
                ("Brotli Compression", 0.35),
            ],
        ),
    ]
}

/// Estimated outcome of one algorithm on one file. Sizes are in GB.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingsEstimate {
    pub algorithm: String,
    pub original_gb: f64,
    pub compressed_gb: f64,
    pub savings_gb: f64,
    pub savings_percent: f64,
}

impl SavingsEstimate {
    fn new(algorithm: &str, original_gb: f64, ratio: f64) -> Self {
        let compressed_gb = original_gb * (1.0 - ratio);
        Self {
            algorithm: algorithm.to_string(),
            original_gb,
            compressed_gb,
            savings_gb: original_gb - compressed_gb,
            savings_percent: ratio * 100.0,
        }
    }
}

/// Ordered algorithm → estimate mapping for a single file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SavingsTable {
    estimates: Vec<SavingsEstimate>,
}

impl SavingsTable {
    pub fn is_empty(&self) -> bool {
        self.estimates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.estimates.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SavingsEstimate> {
        self.estimates.iter()
    }

    pub fn get(&self, algorithm: &str) -> Option<&SavingsEstimate> {
        self.estimates.iter().find(|e| e.algorithm == algorithm)
    }

    /// The estimate with the largest saving (first one on ties).
    pub fn best(&self) -> Option<&SavingsEstimate> {
        self.estimates
            .iter()
            .reduce(|best, e| if e.savings_gb > best.savings_gb { e } else { best })
    }
}

impl<'a> IntoIterator for &'a SavingsTable {
    type Item = &'a SavingsEstimate;
    type IntoIter = std::slice::Iter<'a, SavingsEstimate>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One line of the optimisation report: a (file, algorithm) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationRow {
    pub file_name: String,
    pub extension: String,
    pub category: Category,
    pub original_gb: f64,
    pub algorithm: String,
    pub compressed_gb: f64,
    pub savings_gb: f64,
    pub savings_percent: f64,
}

/// Savings of one algorithm summed over every file it applies to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlgorithmTotal {
    pub algorithm: String,
    pub total_savings_gb: f64,
    /// Share of the total file size (all files, not just those the
    /// algorithm applies to).
    pub percent_of_files: f64,
}

/// Savings estimates for every file of a scan result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationReport {
    pub rows: Vec<OptimizationRow>,
    /// Sorted by total savings descending.
    pub totals: Vec<AlgorithmTotal>,
    pub total_items: usize,
    pub file_count: usize,
    pub folder_count: usize,
    pub files_size_gb: f64,
    pub folders_size_gb: f64,
}

impl OptimizationReport {
    /// Build the report from a finished entry sequence.
    ///
    /// Only files are estimated. Folders only contribute to the folder
    /// size total.
    pub fn build(entries: &[Entry], profile: &CompressionProfile) -> Self {
        let mut rows = Vec::new();
        let mut totals: Vec<AlgorithmTotal> = Vec::new();
        let mut total_index: HashMap<String, usize> = HashMap::new();
        let mut file_count = 0;
        let mut folder_count = 0;
        let mut files_size_gb = 0.0;
        let mut folders_size_gb = 0.0;

        for entry in entries {
            match entry.kind {
                EntryKind::Folder => {
                    folder_count += 1;
                    folders_size_gb += bytes_to_gb(entry.size_bytes);
                    continue;
                }
                EntryKind::Error => continue,
                EntryKind::File => {}
            }

            let size_gb = bytes_to_gb(entry.size_bytes);
            file_count += 1;
            files_size_gb += size_gb;

            let category = entry.category.category().unwrap_or(Category::Other);
            let extension = entry.extension_label().to_string();
            let table = profile.estimate(category, size_gb);

            if table.is_empty() {
                rows.push(OptimizationRow {
                    file_name: entry.name.to_string(),
                    extension,
                    category,
                    original_gb: size_gb,
                    algorithm: NO_OPTIMIZATION.to_string(),
                    compressed_gb: size_gb,
                    savings_gb: 0.0,
                    savings_percent: 0.0,
                });
                continue;
            }

            for est in &table {
                rows.push(OptimizationRow {
                    file_name: entry.name.to_string(),
                    extension: extension.clone(),
                    category,
                    original_gb: size_gb,
                    algorithm: est.algorithm.clone(),
                    compressed_gb: est.compressed_gb,
                    savings_gb: est.savings_gb,
                    savings_percent: est.savings_percent,
                });

                let idx = *total_index.entry(est.algorithm.clone()).or_insert_with(|| {
                    totals.push(AlgorithmTotal {
                        algorithm: est.algorithm.clone(),
                        total_savings_gb: 0.0,
                        percent_of_files: 0.0,
                    });
                    totals.len() - 1
                });
                totals[idx].total_savings_gb += est.savings_gb;
            }
        }

        for total in &mut totals {
            total.percent_of_files = if files_size_gb > 0.0 {
                total.total_savings_gb / files_size_gb * 100.0
            } else {
                0.0
            };
        }
        // Stable: algorithms with equal savings keep first-seen order.
        totals.sort_by(|a, b| b.total_savings_gb.total_cmp(&a.total_savings_gb));

        Self {
            rows,
            totals,
            total_items: entries.len(),
            file_count,
            folder_count,
            files_size_gb,
            folders_size_gb,
        }
    }

    /// The `n` algorithms with the largest total savings.
    pub fn top(&self, n: usize) -> &[AlgorithmTotal] {
        &self.totals[..n.min(self.totals.len())]
    }

    pub fn total_size_gb(&self) -> f64 {
        self.files_size_gb + self.folders_size_gb
    }
}
