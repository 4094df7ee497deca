//! Extract command - run OCR on a single image or PDF.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use rocr_core::ReceiptPipeline;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input file (image or PDF)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print JSON
    #[arg(long)]
    pretty: bool,

    /// OCR engine (overrides config)
    #[arg(short, long)]
    engine: Option<String>,
}

pub async fn run(args: ExtractArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let mut config = super::load_config(config_path)?;
    if let Some(engine) = args.engine {
        config.ocr.engine = engine;
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let data = fs::read(&args.input)?;
    let filename = args
        .input
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("upload")
        .to_string();

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.set_message(format!("Recognizing {}", filename));

    let pipeline = Arc::new(ReceiptPipeline::new(config));
    let result = pipeline.process_async(data, filename).await;
    pb.finish_and_clear();
    let result = result?;

    let output = if args.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
        println!("{}", result.summary());
    } else {
        println!("{}", output);
    }

    Ok(())
}
