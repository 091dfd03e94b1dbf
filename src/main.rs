//! DirSleuth: folder breakdown and compression-savings analyser.
//!
//! Thin binary entry point. All logic lives in the `dirsleuth-core`
//! and `dirsleuth-cli` crates.

use clap::Parser;
use dirsleuth_cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON/CSV on stdout stay machine-readable.
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("DirSleuth starting");

    dirsleuth_cli::run(cli)
}
