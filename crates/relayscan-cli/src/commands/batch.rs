//! Batch command - extract data from many configuration files.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use relayscan_core::RelayExtractor;

use super::{file_name, read_document};
use crate::commands::process::{csv_header, csv_row};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern for input files (e.g. "exports/**/*.pdf")
    #[arg(required = true)]
    pattern: String,

    /// Directory for per-file JSON output
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Write a one-row-per-relay CSV summary to this path
    #[arg(short, long)]
    summary: Option<PathBuf>,
}

pub fn run(args: BatchArgs) -> anyhow::Result<()> {
    let files: Vec<PathBuf> = glob::glob(&args.pattern)?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();

    if files.is_empty() {
        anyhow::bail!("No files match pattern: {}", args.pattern);
    }

    if let Some(dir) = &args.output_dir {
        fs::create_dir_all(dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("##-"),
    );

    // One extractor so relay ids stay unique across the run.
    let extractor = RelayExtractor::new();
    let mut rows: Vec<[String; 12]> = Vec::new();
    let mut warning_total = 0usize;
    let mut failed = 0usize;

    for path in &files {
        pb.set_message(file_name(path));

        match read_document(path).and_then(|text| {
            extractor
                .extract(&file_name(path), &text)
                .map_err(anyhow::Error::from)
        }) {
            Ok(bundle) => {
                warning_total += bundle.report.warnings.len();

                if let Some(dir) = &args.output_dir {
                    let stem = path
                        .file_stem()
                        .map(|stem| stem.to_string_lossy().into_owned())
                        .unwrap_or_else(|| bundle.relay.relay_id.clone());
                    let target = dir.join(format!("{stem}.json"));
                    fs::write(&target, serde_json::to_string_pretty(&bundle)?)?;
                    info!("Wrote {}", target.display());
                }

                rows.push(csv_row(&bundle));
            }
            Err(err) => {
                warn!("{}: {err}", path.display());
                failed += 1;
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Done");

    if let Some(summary_path) = &args.summary {
        let mut wtr = csv::Writer::from_path(summary_path)?;
        wtr.write_record(csv_header())?;
        for row in &rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!();
    println!(
        "{} {} extracted, {} failed, {} warnings",
        style("✓").green(),
        rows.len(),
        failed,
        warning_total
    );

    if failed > 0 {
        anyhow::bail!("{failed} of {} files failed", files.len());
    }

    Ok(())
}
