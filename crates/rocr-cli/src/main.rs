//! CLI application for receipt OCR extraction.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{batch, config, extract, parse, serve};

/// Receipt OCR - extract merchant, date and total from receipts
#[derive(Parser)]
#[command(name = "rocr")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse fields from an already-recognized text file
    Parse(parse::ParseArgs),

    /// Run OCR on a single image or PDF
    Extract(extract::ExtractArgs),

    /// Process multiple files
    Batch(batch::BatchArgs),

    /// Run the HTTP service
    Serve(serve::ServeArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // Logs go to stderr; stdout carries results
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Parse(args) => parse::run(args, config_path),
        Commands::Extract(args) => extract::run(args, config_path).await,
        Commands::Batch(args) => batch::run(args, config_path).await,
        Commands::Serve(args) => serve::run(args, config_path).await,
        Commands::Config(args) => config::run(args, config_path),
    }
}
