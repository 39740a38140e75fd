//! Implementation of the `grafter fura` commands.

use anyhow::{Context, Result};
use clap::Subcommand;
use tracing::debug;

use grafter_lib::fura::FuraClient;

use crate::output::{print_info, print_success};

#[derive(Subcommand, Debug)]
pub enum FuraCommand {
  /// List the subgraphs that belong to the access token
  List,

  /// Show a subgraph
  Info {
    /// Subgraph name
    name: String,
  },

  /// Deploy an uploaded build as a new version of a subgraph
  Submit {
    /// Subgraph name
    name: String,

    /// IPFS hash of the uploaded build
    #[arg(long)]
    ipfs_hash: String,

    /// Label of the new version
    #[arg(long)]
    version_label: String,
  },

  /// Remove a subgraph from the node
  Revoke {
    /// Subgraph name
    name: String,
  },
}

pub struct FuraArgs {
  pub node: String,
  pub access_token: String,
  pub command: FuraCommand,
}

pub fn cmd_fura(args: FuraArgs) -> Result<()> {
  let client = FuraClient::new(&args.node, args.access_token)?;
  debug!(node = %client.node(), command = ?args.command, "running fura command");

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  match args.command {
    FuraCommand::List => {
      let subgraphs = rt.block_on(client.list())?;
      print_success(&format!("These subgraphs belong to you: {:#}", subgraphs));
    }
    FuraCommand::Info { name } => {
      let info = rt.block_on(client.info(&name))?;
      print_success(&format!("Subgraph info: {:#}", info));
    }
    FuraCommand::Submit {
      name,
      ipfs_hash,
      version_label,
    } => {
      let deployment = rt.block_on(client.submit(&name, &ipfs_hash, &version_label))?;
      print_success(&format!("Deployed to {}", name));
      print_info("Subgraph endpoints:");
      print_info(&format!("Queries (HTTP):     {}", deployment.queries));
      print_info(&format!("Playground:         {}", deployment.playground));
    }
    FuraCommand::Revoke { name } => {
      rt.block_on(client.revoke(&name))?;
      print_success(&format!("Revoked subgraph: {}", name));
    }
  }
  Ok(())
}
