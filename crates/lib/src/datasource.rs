//! Synthesis of the data source node for a new contract.

use heck::ToKebabCase;
use serde_yaml::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::abi::AbiDescriptor;
use crate::collision::CollisionResult;
use crate::consts::{
  ABIS_DIR, DEFAULT_API_VERSION, DEFAULT_DATA_SOURCE_KIND, MAPPING_KIND, MAPPING_LANGUAGE, MAPPINGS_DIR,
};
use crate::manifest::{AbiReference, DataSource, EventHandler, ManifestTree, Mapping, Segment, Source};

/// Errors that can occur while synthesizing a data source.
#[derive(Debug, Error)]
pub enum SynthesizeError {
  /// An existing data source is not indexed from an Ethereum-like chain.
  #[error("unsupported data source kind '{kind}', only ethereum data sources can be added")]
  UnsupportedProtocol { kind: String },

  /// Every event was merged but there is no data source to borrow a mapping from.
  #[error("all events of {contract} were merged, but the manifest has no data source to share a mapping with")]
  NoDataSourceToMerge { contract: String },

  /// The generated node could not be converted to YAML.
  #[error("failed to serialize data source: {0}")]
  Serialize(#[source] serde_yaml::Error),
}

/// Settings the new data source inherits from the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestDefaults {
  pub kind: String,
  pub api_version: String,
}

impl Default for ManifestDefaults {
  fn default() -> Self {
    Self {
      kind: DEFAULT_DATA_SOURCE_KIND.to_string(),
      api_version: DEFAULT_API_VERSION.to_string(),
    }
  }
}

impl ManifestDefaults {
  /// Take kind and mapping API version from the first data source.
  ///
  /// Fails if any data source or template is not an Ethereum one.
  pub fn from_manifest(manifest: &ManifestTree) -> Result<Self, SynthesizeError> {
    let nodes = manifest.data_sources().iter().chain(manifest.templates());
    for kind in nodes.filter_map(|node| node.get("kind").and_then(Value::as_str)) {
      if !is_ethereum_kind(kind) {
        return Err(SynthesizeError::UnsupportedProtocol { kind: kind.to_string() });
      }
    }

    let first = |path: &[Segment<'_>]| {
      let mut full = vec![Segment::Key("dataSources"), Segment::Index(0)];
      full.extend_from_slice(path);
      manifest.get_str(&full).map(str::to_string)
    };

    let defaults = Self::default();
    Ok(Self {
      kind: first(&[Segment::Key("kind")]).unwrap_or(defaults.kind),
      api_version: first(&[Segment::Key("mapping"), Segment::Key("apiVersion")]).unwrap_or(defaults.api_version),
    })
  }
}

fn is_ethereum_kind(kind: &str) -> bool {
  kind == "ethereum" || kind.starts_with("ethereum/")
}

/// Build the data source node for `abi`.
///
/// One handler per event entry in ABI order; overloaded events get numbered
/// handler names. Entities are the event names with duplicates removed.
pub fn build(
  contract_name: &str,
  network: &str,
  address: &str,
  abi: &AbiDescriptor,
  defaults: &ManifestDefaults,
) -> DataSource {
  let mut entities: Vec<String> = Vec::new();
  let mut event_handlers = Vec::new();

  for (alias, event) in abi.event_aliases() {
    let name = event.name();
    if !entities.iter().any(|e| e == name) {
      entities.push(name.to_string());
    }
    event_handlers.push(EventHandler {
      event: event.signature(),
      handler: format!("handle{}", alias),
    });
  }

  DataSource {
    kind: defaults.kind.clone(),
    name: contract_name.to_string(),
    network: network.to_string(),
    source: Source {
      address: address.to_string(),
      abi: contract_name.to_string(),
    },
    mapping: Mapping {
      kind: MAPPING_KIND.to_string(),
      api_version: defaults.api_version.clone(),
      language: MAPPING_LANGUAGE.to_string(),
      entities,
      abis: vec![AbiReference {
        name: contract_name.to_string(),
        file: format!("./{}/{}.json", ABIS_DIR, contract_name),
      }],
      event_handlers,
      file: format!("./{}/{}.ts", MAPPINGS_DIR, mapping_file_stem(contract_name)),
    },
  }
}

/// File stem shared by the mapping and test files of a contract.
pub fn mapping_file_stem(contract_name: &str) -> String {
  contract_name.to_kebab_case()
}

/// Build the node to append for a new contract, as YAML.
///
/// When merging and every event collided, the new data source owns no
/// entities; it then reuses `mapping` and `source.abi` of the first existing
/// data source and keeps only its own address.
pub fn synthesize(
  manifest: &ManifestTree,
  contract_name: &str,
  network: &str,
  address: &str,
  collisions: &CollisionResult,
  merge_entities: bool,
) -> Result<Value, SynthesizeError> {
  let defaults = ManifestDefaults::from_manifest(manifest)?;
  let abi = collisions.to_descriptor(contract_name);
  let data_source = build(contract_name, network, address, &abi, &defaults);
  debug!(
    contract = contract_name,
    handlers = data_source.mapping.event_handlers.len(),
    entities = data_source.mapping.entities.len(),
    "built data source"
  );

  let mut node = data_source.to_value().map_err(SynthesizeError::Serialize)?;

  if merge_entities && collisions.only_collisions {
    let first = manifest.data_sources().first().ok_or_else(|| SynthesizeError::NoDataSourceToMerge {
      contract: contract_name.to_string(),
    })?;
    info!(contract = contract_name, "all events merged, sharing mapping of the first data source");
    share_mapping(&mut node, first);
  }

  Ok(node)
}

fn share_mapping(node: &mut Value, first: &Value) {
  let Some(node) = node.as_mapping_mut() else {
    return;
  };

  if let Some(mapping) = first.get("mapping") {
    node.insert(Value::String("mapping".into()), mapping.clone());
  }

  let abi = first.get("source").and_then(|source| source.get("abi"));
  if let (Some(abi), Some(Value::Mapping(source))) = (abi, node.get_mut("source")) {
    source.insert(Value::String("abi".into()), abi.clone());
  }
}
