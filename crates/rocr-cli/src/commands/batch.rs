//! Batch processing command for multiple receipt files.
//!
//! `.txt` files are parsed as already-recognized text (batch shape);
//! images and PDFs go through OCR (service shape).

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, error, warn};

use rocr_core::{OutputMode, ReceiptOutput, ReceiptPipeline};

const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "pdf", "png", "jpg", "jpeg", "tif", "tiff", "bmp", "webp"];

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern for input files
    #[arg(required = true)]
    input: String,

    /// Output directory for per-file JSON
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    output: Option<ReceiptOutput>,
    error: Option<String>,
    processing_time_ms: u64,
}

/// One row of summary.csv.
#[derive(Serialize)]
struct SummaryRow<'a> {
    filename: &'a str,
    status: &'a str,
    merchant: Option<&'a str>,
    date: Option<&'a str>,
    total: Option<String>,
    confidence: Option<String>,
    processing_time_ms: u64,
    error: &'a str,
}

pub async fn run(args: BatchArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str())
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!("{} Found {} files to process", style("ℹ").blue(), files.len());

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let pipeline = Arc::new(ReceiptPipeline::new(config));
    let mut results = Vec::with_capacity(files.len());

    // Files run one at a time; each document already uses the blocking pool
    for path in files {
        let file_start = Instant::now();
        let result = process_single_file(&path, &pipeline).await;
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match result {
            Ok(output) => results.push(ProcessResult {
                path,
                output: Some(output),
                error: None,
                processing_time_ms,
            }),
            Err(e) => {
                let error_msg = e.to_string();
                if !args.continue_on_error {
                    pb.abandon();
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing {} failed: {}", path.display(), error_msg);
                }
                warn!("Failed to process {}: {}", path.display(), error_msg);
                results.push(ProcessResult {
                    path,
                    output: None,
                    error: Some(error_msg),
                    processing_time_ms,
                });
            }
        }

        pb.inc(1);
    }

    pb.finish_and_clear();

    if let Some(output_dir) = &args.output_dir {
        for result in &results {
            if let Some(output) = &result.output {
                let stem = result
                    .path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("receipt");
                let output_path = output_dir.join(format!("{}.json", stem));
                fs::write(&output_path, serde_json::to_string_pretty(output)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(results.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

async fn process_single_file(path: &Path, pipeline: &Arc<ReceiptPipeline>) -> anyhow::Result<ReceiptOutput> {
    let filename = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("receipt")
        .to_string();

    let is_text = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("txt"));

    if is_text {
        let text = fs::read_to_string(path)?;
        return Ok(pipeline.parse_text(&text, &filename, OutputMode::Batch));
    }

    let data = fs::read(path)?;
    let result = pipeline.process_async(data, filename).await?;
    Ok(ReceiptOutput::Service(result))
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    for result in results {
        let filename = result.path.file_name().and_then(|s| s.to_str()).unwrap_or("");

        let row = match &result.output {
            Some(output) => {
                let (merchant, date, total) = match output {
                    ReceiptOutput::Service(r) => (
                        r.parsed.merchant.as_deref(),
                        r.parsed.date.as_deref(),
                        r.parsed.totals.total,
                    ),
                    ReceiptOutput::Batch(r) => (r.merchant.as_deref(), r.receipt_date.as_deref(), r.total),
                };
                SummaryRow {
                    filename,
                    status: "success",
                    merchant,
                    date,
                    total: total.map(|t| format!("{:.2}", t)),
                    confidence: Some(format!("{:.2}", output.confidence())),
                    processing_time_ms: result.processing_time_ms,
                    error: "",
                }
            }
            None => SummaryRow {
                filename,
                status: "error",
                merchant: None,
                date: None,
                total: None,
                confidence: None,
                processing_time_ms: result.processing_time_ms,
                error: result.error.as_deref().unwrap_or(""),
            },
        };
        wtr.serialize(row)?;
    }

    wtr.flush()?;
    Ok(())
}
