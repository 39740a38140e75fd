mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use grafter_lib::consts::{APP_NAME, DEFAULT_CONTRACT_NAME, DEFAULT_MANIFEST, DEFAULT_NETWORKS_FILE};

use crate::cmd::{AddArgs, FuraArgs, FuraCommand};
use crate::output::print_error;

/// grafter - add contracts to an existing subgraph
#[derive(Parser)]
#[command(name = APP_NAME)]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Add a new data source to the subgraph
  Add {
    /// Address of the deployed contract
    address: Option<String>,

    /// Path to the subgraph manifest
    #[arg(default_value = DEFAULT_MANIFEST)]
    manifest: PathBuf,

    /// Path to the contract ABI (fetched from a block explorer if omitted)
    #[arg(long)]
    abi: Option<PathBuf>,

    /// Name of the contract
    #[arg(long, default_value = DEFAULT_CONTRACT_NAME)]
    contract_name: String,

    /// Merge entities with the same name instead of prefixing them
    #[arg(long)]
    merge_entities: bool,

    /// Networks config file path
    #[arg(long, default_value = DEFAULT_NETWORKS_FILE)]
    network_file: PathBuf,

    /// Network of the contract (defaults to the network of the first data source)
    #[arg(long)]
    network: Option<String>,

    /// Do not run the project's codegen script
    #[arg(long)]
    skip_codegen: bool,
  },

  /// Manage subgraphs on a Fura graph node
  Fura {
    /// Graph node URL
    #[arg(short = 'g', long)]
    node: String,

    /// Access token sent as a bearer token
    #[arg(long)]
    access_token: String,

    #[command(subcommand)]
    command: FuraCommand,
  },
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let result = match cli.command {
    Commands::Add {
      address,
      manifest,
      abi,
      contract_name,
      merge_entities,
      network_file,
      network,
      skip_codegen,
    } => cmd::cmd_add(AddArgs {
      address,
      manifest,
      abi,
      contract_name,
      merge_entities,
      network_file,
      network,
      skip_codegen,
    }),
    Commands::Fura {
      node,
      access_token,
      command,
    } => cmd::cmd_fura(FuraArgs {
      node,
      access_token,
      command,
    }),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      print_error(&format!("{:#}", err));
      ExitCode::FAILURE
    }
  }
}
