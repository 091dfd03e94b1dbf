/// Command dispatch: load the config, drive the core, write the output.
use crate::args::{Cli, Commands, FilterArgs, OutputArgs};
use crate::render;
use anyhow::{bail, Context, Result};
use dirsleuth_core::analysis::OptimizationReport;
use dirsleuth_core::scanner::ScanRequest;
use dirsleuth_core::{AnalyzerConfig, ScanProgress, ScanReport, Scanner};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub fn run(cli: Cli) -> Result<()> {
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Scan {
            paths,
            filters,
            output,
            memoize,
            parallel,
        } => {
            config.scan.memoize_folder_sizes |= memoize;
            config.scan.parallel_sizing |= parallel;
            let reports = scan_paths(&config, &paths, &filters)?;
            let out = open_output(&output)?;
            render::write_scan(&reports, output.format, out)
        }
        Commands::Optimize {
            path,
            filters,
            output,
            top,
        } => {
            let criteria = filters.to_criteria(&config.categories)?;
            let scanner = Scanner::from_config(&config);
            let report = scanner.scan(&path, &criteria);
            if report.is_failed() {
                info!("Nothing to optimise: {}", report.entries[0].name);
            }
            let optimization = OptimizationReport::build(&report.entries, &config.compression);
            let out = open_output(&output)?;
            render::write_optimization(&optimization, top, output.format, out)
        }
        Commands::Profile { output } => {
            let out = open_output(&output)?;
            render::write_profile(&config, output.format, out)
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<AnalyzerConfig> {
    match path {
        Some(path) => AnalyzerConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(AnalyzerConfig::default()),
    }
}

/// One path runs as a background scan with progress logging; several
/// paths run as a parallel batch.
fn scan_paths(
    config: &AnalyzerConfig,
    paths: &[PathBuf],
    filters: &FilterArgs,
) -> Result<Vec<ScanReport>> {
    let criteria = filters.to_criteria(&config.categories)?;
    let scanner = Scanner::from_config(config);

    if let [path] = paths {
        let handle = scanner
            .start(path.clone(), criteria)
            .context("failed to start scanner thread")?;
        let report = handle.wait_with(|progress| {
            if let ScanProgress::Update {
                children_done,
                children_total,
                current_path,
            } = progress
            {
                debug!("[{}/{}] {}", children_done + 1, children_total, current_path);
            }
        });
        return match report {
            Some(report) => Ok(vec![report]),
            None => bail!("scan of {} was cancelled", path.display()),
        };
    }

    let requests: Vec<ScanRequest> = paths
        .iter()
        .map(|p| ScanRequest::new(p.clone(), criteria.clone()))
        .collect();
    Ok(scanner.scan_batch(&requests))
}

fn open_output(args: &OutputArgs) -> Result<Box<dyn Write>> {
    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create output file {}", path.display()))?;
            info!("Writing output to {}", path.display());
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}
