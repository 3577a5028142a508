mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::{cmd_extract, cmd_info, cmd_load};
use output::{OutputFormat, failure};

/// usbload - locate, extract and load bundled native USB libraries
#[derive(Parser)]
#[command(name = "usbload")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Loader config file (TOML)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  /// Output format
  #[arg(short, long, global = true, value_enum, default_value_t)]
  output: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Show the resolved platform and the artifacts it needs
  Info,

  /// Materialize the native libraries and print the wrapper's path
  ///
  /// Copies taken out of a packed bundle (.zip archive) live in a private
  /// temporary directory that is deleted when this command exits, so the
  /// printed path is only valid while usbload runs. Unpacked bundles are
  /// reported in place and left untouched.
  Extract {
    /// Directory or .zip archive holding the natives
    #[arg(short, long)]
    bundle: Option<PathBuf>,
  },

  /// Load the native libraries into this process
  Load {
    /// Directory or .zip archive holding the natives
    #[arg(short, long)]
    bundle: Option<PathBuf>,
  },
}

fn main() {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  if let Err(e) = run(cli) {
    failure(&format!("{:#}", e));
    std::process::exit(1);
  }
}

fn run(cli: Cli) -> Result<()> {
  let config = cmd::load_config(cli.config.as_deref())?;
  match cli.command {
    Commands::Info => cmd_info(&config, cli.output),
    Commands::Extract { bundle } => cmd_extract(config, bundle, cli.output),
    Commands::Load { bundle } => cmd_load(config, bundle, cli.output),
  }
}
