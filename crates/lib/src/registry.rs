//! Names already claimed by a manifest.
//!
//! Entity names come from every data source's and template's
//! `mapping.entities`; contract names are the `name` of each of those nodes.

use std::collections::HashSet;

use serde_yaml::Value;
use thiserror::Error;

use crate::manifest::ManifestTree;

/// A data source or template with the requested name already exists.
#[derive(Debug, Error)]
#[error("Datasource or template with name {name} already exists, please choose a different name")]
pub struct DuplicateContractName {
  pub name: String,
}

/// Entity and contract names in use by a manifest.
#[derive(Debug, Clone, Default)]
pub struct NameRegistry {
  entities: HashSet<String>,
  contract_names: Vec<String>,
}

impl NameRegistry {
  /// Scan `dataSources` and `templates` of a manifest.
  pub fn from_manifest(manifest: &ManifestTree) -> Self {
    let nodes = manifest.data_sources().iter().chain(manifest.templates());

    let mut registry = Self::default();
    for node in nodes {
      if let Some(name) = node.get("name").and_then(Value::as_str) {
        registry.contract_names.push(name.to_string());
      }

      let entities = node
        .get("mapping")
        .and_then(|m| m.get("entities"))
        .and_then(Value::as_sequence);
      for entity in entities.into_iter().flatten().filter_map(Value::as_str) {
        registry.entities.insert(entity.to_string());
      }
    }

    registry
  }

  /// Build a registry from explicit names.
  pub fn new<E, C>(entities: E, contract_names: C) -> Self
  where
    E: IntoIterator,
    E::Item: Into<String>,
    C: IntoIterator,
    C::Item: Into<String>,
  {
    Self {
      entities: entities.into_iter().map(Into::into).collect(),
      contract_names: contract_names.into_iter().map(Into::into).collect(),
    }
  }

  pub fn entities(&self) -> &HashSet<String> {
    &self.entities
  }

  /// Data source and template names, in manifest order.
  pub fn contract_names(&self) -> &[String] {
    &self.contract_names
  }

  pub fn has_entity(&self, name: &str) -> bool {
    self.entities.contains(name)
  }

  pub fn has_contract_name(&self, name: &str) -> bool {
    self.contract_names.iter().any(|n| n == name)
  }

  /// Fail if `name` is already used by a data source or template.
  pub fn ensure_unique_contract_name(&self, name: &str) -> Result<(), DuplicateContractName> {
    if self.has_contract_name(name) {
      return Err(DuplicateContractName { name: name.to_string() });
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const MANIFEST: &str = r#"
dataSources:
  - name: Gravity
    mapping:
      entities:
        - Gravatar
        - Transfer
  - name: Token
    mapping:
      entities:
        - Transfer
templates:
  - name: Pool
    mapping:
      entities:
        - Swap
"#;

  #[test]
  fn collects_entities_from_data_sources_and_templates() {
    let tree = ManifestTree::parse(MANIFEST).unwrap();
    let registry = NameRegistry::from_manifest(&tree);

    assert!(registry.has_entity("Gravatar"));
    assert!(registry.has_entity("Transfer"));
    assert!(registry.has_entity("Swap"));
    assert!(!registry.has_entity("Approval"));
    assert_eq!(registry.entities().len(), 3);
  }

  #[test]
  fn collects_contract_names_in_order() {
    let tree = ManifestTree::parse(MANIFEST).unwrap();
    let registry = NameRegistry::from_manifest(&tree);

    assert_eq!(registry.contract_names(), ["Gravity", "Token", "Pool"]);
  }

  #[test]
  fn template_name_counts_as_taken() {
    let tree = ManifestTree::parse(MANIFEST).unwrap();
    let registry = NameRegistry::from_manifest(&tree);

    let err = registry.ensure_unique_contract_name("Pool").unwrap_err();
    assert_eq!(err.name, "Pool");
    assert!(err.to_string().contains("Pool already exists"));
    assert!(registry.ensure_unique_contract_name("Factory").is_ok());
  }

  #[test]
  fn nodes_without_mapping_are_tolerated() {
    let tree = ManifestTree::parse("dataSources:\n  - name: Bare\n").unwrap();
    let registry = NameRegistry::from_manifest(&tree);

    assert!(registry.entities().is_empty());
    assert_eq!(registry.contract_names(), ["Bare"]);
  }
}
