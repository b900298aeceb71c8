use anyhow::Context;
use clap::Parser;
use fs_mover::config::DEFAULT_CONFIG_PATH;
use fs_mover::{init_logging, start, MoverConfig};
use std::path::PathBuf;
use tracing::{info, info_span, Instrument};

#[derive(Parser)]
#[command(name = "fs-mover")]
#[command(
	about = "Watches a directory tree and moves matching files into a mirrored destination tree"
)]
struct Cli {
	/// Path to the TOML configuration file
	#[arg(short = 'c', long = "conf", default_value = DEFAULT_CONFIG_PATH)]
	conf: PathBuf,

	/// Enable verbose logging
	#[arg(short, long)]
	verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();

	let config = MoverConfig::load(&cli.conf)
		.with_context(|| format!("Failed to load config from {}", cli.conf.display()))?;

	init_logging(&config, cli.verbose);

	let span = info_span!("mover", tag = %config.log_tag);
	run(config).instrument(span).await
}

async fn run(config: MoverConfig) -> anyhow::Result<()> {
	let handle = start(config).await?;

	// Keep the program running
	tokio::signal::ctrl_c().await?;
	info!("Shutting down mover...");

	handle.stop().await?;
	Ok(())
}
