//! Serve command - run the HTTP service.

use std::path::Path;

use clap::Args;

/// Arguments for the serve command.
#[derive(Args)]
pub struct ServeArgs {
    /// Bind host (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,
}

pub async fn run(args: ServeArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let mut config = super::load_config(config_path)?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    rocr_server::serve(config).await?;
    Ok(())
}
