/// Rendering of scan reports, optimisation reports and the active profile
/// as a text table, pretty JSON or CSV.
use crate::args::OutputFormat;
use anyhow::Result;
use dirsleuth_core::analysis::OptimizationReport;
use dirsleuth_core::model::size::{bytes_to_gb, format_count, format_gb, format_size, round2};
use dirsleuth_core::{AnalyzerConfig, ScanReport};
use serde::Serialize;
use std::io::Write;

/// Items listed in the "largest items" block of the text summary.
const TOP_ITEMS: usize = 5;

pub const SCAN_CSV_HEADER: [&str; 6] = [
    "Name",
    "Type",
    "Size (GB)",
    "Extension",
    "Category",
    "Full Path",
];

pub const OPTIMIZE_CSV_HEADER: [&str; 8] = [
    "File Name",
    "File Extension",
    "File Category",
    "Original Size (GB)",
    "Algorithm",
    "Compressed Size (GB)",
    "Savings (GB)",
    "Savings (%)",
];

// ── Scan ─────────────────────────────────────────────────────────────────────

pub fn write_scan<W: Write>(reports: &[ScanReport], format: OutputFormat, out: W) -> Result<()> {
    match format {
        OutputFormat::Table => scan_table(reports, out),
        OutputFormat::Json => match reports {
            [single] => write_json(single, out),
            many => write_json(many, out),
        },
        OutputFormat::Csv => scan_csv(reports, out),
    }
}

fn scan_table<W: Write>(reports: &[ScanReport], mut out: W) -> Result<()> {
    for (i, report) in reports.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        writeln!(out, "Scan of {}", report.root)?;
        writeln!(out, "Filters: {}", report.criteria)?;
        writeln!(out)?;

        let name_width = report
            .entries
            .iter()
            .map(|e| e.name.chars().count())
            .max()
            .unwrap_or(0)
            .clamp(4, 60);

        writeln!(
            out,
            "{:<name_width$}  {:<6}  {:>10}  {:<9}  {}",
            "Name", "Type", "Size", "Extension", "Category"
        )?;
        for entry in &report.entries {
            writeln!(
                out,
                "{:<name_width$}  {:<6}  {:>10}  {:<9}  {}",
                entry.name.as_str(),
                entry.kind.label(),
                format_size(entry.size_bytes),
                entry.extension_label(),
                entry.category.label()
            )?;
        }
        writeln!(out)?;
        summary_block(report, &mut out)?;
    }
    out.flush()?;
    Ok(())
}

fn summary_block<W: Write>(report: &ScanReport, out: &mut W) -> Result<()> {
    let s = &report.summary;
    writeln!(out, "Summary")?;
    writeln!(out, "  Total items:         {}", format_count(s.total_items as u64))?;
    writeln!(out, "  Files:               {}", format_count(s.file_count as u64))?;
    writeln!(out, "  Folders:             {}", format_count(s.folder_count as u64))?;
    if s.error_count > 0 {
        writeln!(out, "  Errors:              {}", format_count(s.error_count as u64))?;
    }
    writeln!(
        out,
        "  Total size:          {} ({:.2} GB)",
        format_size(s.total_size_bytes),
        round2(bytes_to_gb(s.total_size_bytes))
    )?;
    writeln!(out, "  Files size:          {}", format_size(s.files_size_bytes))?;
    writeln!(out, "  Folders size:        {}", format_size(s.folders_size_bytes))?;
    if let Some(largest) = &s.largest_file {
        writeln!(
            out,
            "  Largest file:        {} ({})",
            largest.name,
            format_size(largest.size_bytes)
        )?;
    }
    if let Some(smallest) = &s.smallest_file {
        writeln!(
            out,
            "  Smallest file:       {} ({})",
            smallest.name,
            format_size(smallest.size_bytes)
        )?;
    }
    if s.file_count > 0 {
        writeln!(out, "  Average file size:   {}", format_size(s.average_file_size_bytes))?;
        writeln!(out, "  Distinct extensions: {}", s.distinct_extensions)?;
    }

    let categories = report.categories();
    if !categories.is_empty() {
        writeln!(out, "By category")?;
        for stat in &categories {
            writeln!(
                out,
                "  {:<14} {:>6} files  {:>10}",
                stat.category.label(),
                format_count(stat.file_count),
                format_size(stat.total_size)
            )?;
        }
    }

    let top = report.top_items(TOP_ITEMS);
    if !top.is_empty() {
        writeln!(out, "Largest items")?;
        for (rank, entry) in top.iter().enumerate() {
            writeln!(
                out,
                "  {}. {} ({}, {})",
                rank + 1,
                entry.name,
                entry.kind.label(),
                format_size(entry.size_bytes)
            )?;
        }
    }
    Ok(())
}

fn scan_csv<W: Write>(reports: &[ScanReport], out: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(SCAN_CSV_HEADER)?;
    for entry in reports.iter().flat_map(|r| &r.entries) {
        wtr.write_record([
            entry.name.as_str(),
            entry.kind.label(),
            gb_cell(bytes_to_gb(entry.size_bytes)).as_str(),
            entry.extension_label(),
            entry.category.label(),
            entry.full_path.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

// ── Optimize ─────────────────────────────────────────────────────────────────

pub fn write_optimization<W: Write>(
    report: &OptimizationReport,
    top: usize,
    format: OutputFormat,
    out: W,
) -> Result<()> {
    match format {
        OutputFormat::Table => optimization_table(report, top, out),
        OutputFormat::Json => write_json(report, out),
        OutputFormat::Csv => optimization_csv(report, out),
    }
}

fn optimization_table<W: Write>(report: &OptimizationReport, top: usize, mut out: W) -> Result<()> {
    writeln!(
        out,
        "{:<32}  {:<14}  {:>9}  {:<26}  {:>10}  {:>9}  {:>6}",
        "File", "Category", "Original", "Algorithm", "Compressed", "Savings", "%"
    )?;
    for row in &report.rows {
        writeln!(
            out,
            "{:<32}  {:<14}  {:>9}  {:<26}  {:>10}  {:>9}  {:>5.1}%",
            truncate(&row.file_name, 32),
            row.category.label(),
            format_gb(row.original_gb),
            row.algorithm,
            format_gb(row.compressed_gb),
            format_gb(row.savings_gb),
            row.savings_percent
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Best algorithms by total savings")?;
    for (rank, total) in report.top(top).iter().enumerate() {
        writeln!(
            out,
            "  {}. {:<26} {:>10}  ({:.1}% of file size)",
            rank + 1,
            total.algorithm,
            format_gb(total.total_savings_gb),
            total.percent_of_files
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Summary")?;
    writeln!(out, "  Total items:  {}", format_count(report.total_items as u64))?;
    writeln!(
        out,
        "  Files:        {} ({})",
        format_count(report.file_count as u64),
        format_gb(report.files_size_gb)
    )?;
    writeln!(
        out,
        "  Folders:      {} ({})",
        format_count(report.folder_count as u64),
        format_gb(report.folders_size_gb)
    )?;
    writeln!(out, "  Total size:   {}", format_gb(report.total_size_gb()))?;
    out.flush()?;
    Ok(())
}

fn optimization_csv<W: Write>(report: &OptimizationReport, out: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(OPTIMIZE_CSV_HEADER)?;
    for row in &report.rows {
        wtr.write_record([
            row.file_name.as_str(),
            row.extension.as_str(),
            row.category.label(),
            gb_cell(row.original_gb).as_str(),
            row.algorithm.as_str(),
            gb_cell(row.compressed_gb).as_str(),
            gb_cell(row.savings_gb).as_str(),
            format!("{:.1}", row.savings_percent).as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

// ── Profile ──────────────────────────────────────────────────────────────────

pub fn write_profile<W: Write>(
    config: &AnalyzerConfig,
    format: OutputFormat,
    mut out: W,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            writeln!(out, "{}", config.to_json()?)?;
        }
        OutputFormat::Table => {
            writeln!(out, "Categories (first match wins)")?;
            for group in config.categories.groups() {
                writeln!(out, "  {:<14} {}", group.category.label(), group.extensions.join(" "))?;
            }
            writeln!(out)?;
            writeln!(out, "Compression profile")?;
            for profile in config.compression.categories() {
                writeln!(out, "  {}", profile.category.label())?;
                for algo in &profile.algorithms {
                    writeln!(out, "    {:<26} ratio {:.2}", algo.algorithm, algo.ratio)?;
                }
            }
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(&mut out);
            wtr.write_record(["Category", "Algorithm", "Ratio"])?;
            for profile in config.compression.categories() {
                for algo in &profile.algorithms {
                    wtr.write_record([
                        profile.category.label(),
                        algo.algorithm.as_str(),
                        algo.ratio.to_string().as_str(),
                    ])?;
                }
            }
            wtr.flush()?;
        }
    }
    out.flush()?;
    Ok(())
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn write_json<T: Serialize + ?Sized, W: Write>(value: &T, mut out: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// GB values are exported rounded to two decimals.
fn gb_cell(gb: f64) -> String {
    format!("{:.2}", round2(gb))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{head}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dirsleuth_core::analysis::{Category, CompressionProfile};
    use dirsleuth_core::{Entry, FilterCriteria};

    const GB: u64 = 1_073_741_824;

    fn sample_report() -> ScanReport {
        ScanReport::new(
            "/data",
            FilterCriteria::none(),
            vec![
                Entry::file(
                    "movie.mp4",
                    "/data/movie.mp4",
                    2 * GB,
                    Some(".mp4".into()),
                    Category::Videos,
                ),
                Entry::folder("Notes", "/data/Notes", 0),
            ],
        )
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn scan_csv_has_expected_columns_and_order() {
        let text = render(|b| write_scan(&[sample_report()], OutputFormat::Csv, b));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Name,Type,Size (GB),Extension,Category,Full Path");
        assert_eq!(lines[1], "Notes,Folder,0.00,<dir>,Folder,/data/Notes");
        assert_eq!(lines[2], "movie.mp4,File,2.00,.mp4,Videos,/data/movie.mp4");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn scan_json_single_report_is_an_object() {
        let text = render(|b| write_scan(&[sample_report()], OutputFormat::Json, b));
        let v: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["root"], "/data");
        assert_eq!(v["summary"]["total_items"], 2);
        assert_eq!(v["entries"][1]["category"], "Videos");
    }

    #[test]
    fn scan_json_several_reports_is_an_array() {
        let reports = [sample_report(), sample_report()];
        let text = render(|b| write_scan(&reports, OutputFormat::Json, b));
        let v: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn scan_table_lists_entries_and_summary() {
        let text = render(|b| write_scan(&[sample_report()], OutputFormat::Table, b));
        assert!(text.contains("Scan of /data"));
        assert!(text.contains("Filters: No filters active"));
        assert!(text.contains("movie.mp4"));
        assert!(text.contains("2.00 GB"));
        assert!(text.contains("Largest file:        movie.mp4"));
        assert!(!text.contains("Errors:"));
    }

    #[test]
    fn optimization_csv_rows() {
        let report =
            OptimizationReport::build(&sample_report().entries, CompressionProfile::builtin());
        let text = render(|b| write_optimization(&report, 5, OutputFormat::Csv, b));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], OPTIMIZE_CSV_HEADER.join(","));
        assert!(lines[0].starts_with("File Name,File Extension,File Category,"));
        assert!(lines[0].ends_with("Compressed Size (GB),Savings (GB),Savings (%)"));
        assert!(lines.contains(&"movie.mp4,.mp4,Videos,2.00,H.264 Compression,1.20,0.80,40.0"));
        assert_eq!(lines.len(), 1 + 4);
    }

    #[test]
    fn optimization_table_shows_best_algorithms() {
        let report =
            OptimizationReport::build(&sample_report().entries, CompressionProfile::builtin());
        let text = render(|b| write_optimization(&report, 2, OutputFormat::Table, b));
        assert!(text.contains("Best algorithms by total savings"));
        assert!(text.contains("1. AV1 Codec"));
        assert!(!text.contains("3. "));
    }

    #[test]
    fn profile_json_parses_back() {
        let config = AnalyzerConfig::default();
        let text = render(|b| write_profile(&config, OutputFormat::Json, b));
        let back: AnalyzerConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn profile_table_names_every_category() {
        let text = render(|b| write_profile(&AnalyzerConfig::default(), OutputFormat::Table, b));
        for label in [
            "Documents",
            "Images",
            "Videos",
            "Audio",
            "Archives",
            "Code",
            "Spreadsheets",
            "Presentations",
        ] {
            assert!(text.contains(label), "{label}");
        }
        assert!(text.contains("H.265/HEVC"));
    }

    #[test]
    fn truncate_long_names() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
    }
}
