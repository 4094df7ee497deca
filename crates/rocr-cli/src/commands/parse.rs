//! Parse command - extract fields from a pre-OCR'd text file.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use tracing::info;

use rocr_core::{OutputMode, ReceiptPipeline};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Input text file
    #[arg(required = true)]
    input: PathBuf,

    /// Output JSON file (default: input with a .json extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output shape
    #[arg(short, long, value_enum, default_value = "batch")]
    mode: Mode,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Mode {
    /// merchant, receipt_date, total, confidence, raw
    Batch,
    /// engine, filename, parsed, raw_ocr
    Service,
}

impl From<Mode> for OutputMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Batch => OutputMode::Batch,
            Mode::Service => OutputMode::Service,
        }
    }
}

pub fn run(args: ParseArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;

    let text = fs::read_to_string(&args.input)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", args.input.display(), e))?;

    let filename = args
        .input
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("input.txt");

    let pipeline = ReceiptPipeline::new(config);
    let output = pipeline.parse_text(&text, filename, args.mode.into());

    let output_path = args
        .output
        .unwrap_or_else(|| args.input.with_extension("json"));
    fs::write(&output_path, serde_json::to_string_pretty(&output)?)?;

    info!("Wrote {}", output_path.display());
    println!("Parsed {}: {}", args.input.display(), output.summary());

    Ok(())
}
