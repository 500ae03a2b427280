//! Locate command handler
//!
//! Runs the pipeline once for an address and prints the report.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::{available_formats, get_formatter};
use crate::pipeline::MapPipeline;
use clap::Args;

/// Locate command arguments
#[derive(Args)]
pub struct LocateArgs {
    /// IP address to geolocate
    pub ip: String,

    /// Output format (json, text, html, url)
    #[arg(long, short = 'f', default_value = "text")]
    pub format: String,

    /// Also search for nearby places
    #[arg(long, short = 'n')]
    pub nearby: bool,

    /// External map provider for the url format
    #[arg(long)]
    pub provider: Option<String>,
}

/// Run the locate command
pub async fn run(args: LocateArgs) -> Result<()> {
    super::init_logging();

    let mut config = Config::load()?;
    if let Some(provider) = args.provider {
        config.url.default = provider;
    }

    let formatter = get_formatter(&args.format).ok_or_else(|| {
        let names: Vec<String> = available_formats().into_iter().map(|f| f.name).collect();
        Error::Config(format!(
            "Unknown format: {} (available: {})",
            args.format,
            names.join(", ")
        ))
    })?;

    let pipeline = MapPipeline::new(config)?;
    let report = pipeline.locate(args.ip.trim(), args.nearby).await?;

    println!("{}", formatter.format(&report, pipeline.config())?);
    Ok(())
}
