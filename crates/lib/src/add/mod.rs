//! Add-contract orchestration.
//!
//! This module provides the core logic for the `grafter add` command, which
//! registers a new contract as a data source of an existing subgraph:
//! generated files first, then the manifest, then `networks.json`, then the
//! project's codegen script. A failing stage stops everything after it;
//! files written by earlier stages are left in place.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::abi::{AbiError, AbiSource, ExplorerClient};
use crate::codegen::{CodegenError, PackageManager, detect_package_manager, run_codegen};
use crate::collision::{self, CollisionError};
use crate::consts::{DEFAULT_CONTRACT_NAME, DEFAULT_MANIFEST, DEFAULT_NETWORKS_FILE};
use crate::datasource::{self, ManifestDefaults, SynthesizeError};
use crate::manifest::{ManifestError, ManifestTree, Segment};
use crate::networks::{NetworksError, update_networks_file};
use crate::registry::{DuplicateContractName, NameRegistry};
use crate::scaffold::{self, ScaffoldError};

/// Options for the add operation.
#[derive(Debug, Clone)]
pub struct AddOptions {
  /// Address of the deployed contract.
  pub address: Option<String>,
  pub manifest_path: PathBuf,
  /// Local ABI file; fetched from a block explorer when absent.
  pub abi: Option<PathBuf>,
  pub contract_name: String,
  /// Fold colliding events into the existing entities instead of renaming them.
  pub merge_entities: bool,
  pub network_file: PathBuf,
  /// Network of the new data source; defaults to that of the first data source.
  pub network: Option<String>,
  pub skip_codegen: bool,
}

impl Default for AddOptions {
  fn default() -> Self {
    Self {
      address: None,
      manifest_path: PathBuf::from(DEFAULT_MANIFEST),
      abi: None,
      contract_name: DEFAULT_CONTRACT_NAME.to_string(),
      merge_entities: false,
      network_file: PathBuf::from(DEFAULT_NETWORKS_FILE),
      network: None,
      skip_codegen: false,
    }
  }
}

/// What happened to the project's codegen script.
#[derive(Debug)]
pub enum CodegenOutcome {
  Skipped,
  Succeeded { command: String },
  /// The script failed; everything before it was still written.
  Failed(CodegenError),
}

/// Result of a successful add operation.
#[derive(Debug)]
pub struct AddReport {
  pub contract_name: String,
  pub network: String,
  /// Generated files, the manifest and the networks file.
  pub written: Vec<PathBuf>,
  /// Events renamed to `<Contract><Event>`.
  pub renamed: Vec<String>,
  /// Events merged into existing entities.
  pub merged: Vec<String>,
  /// True when the new data source reuses the first data source's mapping.
  pub shared_mapping: bool,
  pub codegen: CodegenOutcome,
}

impl AddReport {
  /// The codegen failure to surface as a warning, if any.
  pub fn codegen_warning(&self) -> Option<&CodegenError> {
    match &self.codegen {
      CodegenOutcome::Failed(err) => Some(err),
      _ => None,
    }
  }
}

/// Errors that can occur while adding a contract.
#[derive(Debug, Error)]
pub enum AddError {
  #[error("no contract address given, pass the address of the deployed contract")]
  MissingAddress,

  #[error(transparent)]
  Duplicate(#[from] DuplicateContractName),

  #[error("no network given and the manifest has no data source to take one from, pass --network")]
  MissingNetwork,

  #[error(transparent)]
  Collision(#[from] CollisionError),

  #[error(transparent)]
  Manifest(#[from] ManifestError),

  #[error(transparent)]
  Abi(#[from] AbiError),

  #[error(transparent)]
  Synthesize(#[from] SynthesizeError),

  #[error(transparent)]
  Scaffold(#[from] ScaffoldError),

  #[error(transparent)]
  Networks(#[from] NetworksError),

  /// Only package manager detection is fatal; a failing script is reported in
  /// [`AddReport::codegen`].
  #[error(transparent)]
  PackageManager(#[from] CodegenError),
}

/// Directory generated paths are resolved against.
fn project_root(manifest_path: &Path) -> PathBuf {
  match manifest_path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
    _ => PathBuf::from("."),
  }
}

/// Add a contract to the subgraph at `options.manifest_path`.
pub async fn add(options: &AddOptions, explorer: &ExplorerClient) -> Result<AddReport, AddError> {
  let address = match options.address.as_deref().map(str::trim) {
    Some(address) if !address.is_empty() => address,
    _ => return Err(AddError::MissingAddress),
  };
  let contract_name = options.contract_name.as_str();

  let mut manifest = ManifestTree::load(&options.manifest_path)?;
  let registry = NameRegistry::from_manifest(&manifest);
  registry.ensure_unique_contract_name(contract_name)?;

  let network = match &options.network {
    Some(network) => network.clone(),
    None => manifest
      .get_str(&[Segment::Key("dataSources"), Segment::Index(0), Segment::Key("network")])
      .map(str::to_string)
      .ok_or(AddError::MissingNetwork)?,
  };
  // Reject non-Ethereum manifests before touching the network or disk.
  ManifestDefaults::from_manifest(&manifest)?;
  info!(contract = contract_name, network = %network, address, "adding contract");

  let source = match &options.abi {
    Some(path) => AbiSource::Local(path.clone()),
    None => AbiSource::Explorer {
      network: network.clone(),
      address: address.to_string(),
    },
  };
  let abi = source.load(contract_name, explorer).await?;
  info!(events = abi.events().count(), "loaded ABI");

  let collisions = collision::resolve(&abi, registry.entities(), contract_name, options.merge_entities)?;
  let renamed: Vec<String> = if options.merge_entities {
    Vec::new()
  } else {
    let mut renamed = Vec::new();
    for event in abi.events().filter(|event| registry.has_entity(event.name())) {
      let name = format!("{}{}", contract_name, event.name());
      if !renamed.contains(&name) {
        renamed.push(name);
      }
    }
    renamed
  };

  let root = project_root(&options.manifest_path);
  let resolved = collisions.to_descriptor(contract_name);
  let files = scaffold::write_all(&root, &resolved, manifest.schema_file(), &collisions.collision_entities)?;
  info!(root = %root.display(), "wrote generated files");

  let node = datasource::synthesize(
    &manifest,
    contract_name,
    &network,
    address,
    &collisions,
    options.merge_entities,
  )?;
  manifest.append_data_source(node)?;
  manifest.write(&options.manifest_path)?;
  info!(path = %options.manifest_path.display(), "updated manifest");

  update_networks_file(&options.network_file, &network, contract_name, address)?;

  let codegen = if options.skip_codegen {
    CodegenOutcome::Skipped
  } else {
    let manager = detect_package_manager()?;
    run_codegen_step(&manager, &root).await
  };

  let mut written: Vec<PathBuf> = files.paths().map(Path::to_path_buf).collect();
  written.push(options.manifest_path.clone());
  written.push(options.network_file.clone());

  Ok(AddReport {
    contract_name: contract_name.to_string(),
    network,
    written,
    renamed,
    shared_mapping: options.merge_entities && collisions.only_collisions,
    merged: collisions.collision_entities,
    codegen,
  })
}

async fn run_codegen_step(manager: &PackageManager, root: &Path) -> CodegenOutcome {
  match run_codegen(manager, root).await {
    Ok(()) => CodegenOutcome::Succeeded {
      command: manager.codegen_command(),
    },
    Err(err) => {
      warn!(error = %err, "code generation failed");
      CodegenOutcome::Failed(err)
    }
  }
}
