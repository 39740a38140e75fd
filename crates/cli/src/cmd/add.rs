//! Implementation of the `grafter add` command.
//!
//! This command adds a contract to an existing subgraph: it generates the
//! ABI, schema, mapping and test files, appends a data source to the
//! manifest, records the address in the networks file and runs codegen.

use std::path::PathBuf;

use anyhow::{Context, Result};
use owo_colors::{OwoColorize, Stream};
use tracing::debug;

use grafter_lib::abi::ExplorerClient;
use grafter_lib::add::{AddOptions, CodegenOutcome, add};

use crate::output::{print_info, print_success, print_warning, symbols};

/// Arguments of the add command as parsed from the command line.
pub struct AddArgs {
  pub address: Option<String>,
  pub manifest: PathBuf,
  pub abi: Option<PathBuf>,
  pub contract_name: String,
  pub merge_entities: bool,
  pub network_file: PathBuf,
  pub network: Option<String>,
  pub skip_codegen: bool,
}

impl From<AddArgs> for AddOptions {
  fn from(args: AddArgs) -> Self {
    AddOptions {
      address: args.address,
      manifest_path: args.manifest,
      abi: args.abi,
      contract_name: args.contract_name,
      merge_entities: args.merge_entities,
      network_file: args.network_file,
      network: args.network,
      skip_codegen: args.skip_codegen,
    }
  }
}

/// Execute the add command.
///
/// A failing codegen script is printed as a warning; every other failure is
/// returned and ends the process with exit code 1.
pub fn cmd_add(args: AddArgs) -> Result<()> {
  let options = AddOptions::from(args);
  let explorer = ExplorerClient::from_env();
  debug!(manifest = %options.manifest_path.display(), abi = ?options.abi, "running add");

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let report = rt
    .block_on(add(&options, &explorer))
    .with_context(|| format!("Failed to add contract {}", options.contract_name))?;

  for name in &report.renamed {
    print_info(&format!("Renamed colliding event to {}", name));
  }
  for name in &report.merged {
    print_info(&format!("Merged event {} into the existing entity", name));
  }
  if report.shared_mapping {
    print_info("Every event was merged, reusing the mapping of the first data source");
  }

  for path in &report.written {
    println!(
      "  {} {}",
      symbols::ADD.if_supports_color(Stream::Stdout, |s| s.green()),
      path.display()
    );
  }

  match &report.codegen {
    CodegenOutcome::Skipped => {}
    CodegenOutcome::Succeeded { command } => print_success(&format!("Ran {}", command)),
    CodegenOutcome::Failed(err) => print_warning(&format!("Code generation failed: {}", err)),
  }

  print_success(&format!(
    "Added data source {} on {}",
    report.contract_name, report.network
  ));
  Ok(())
}
