//! Typed data source nodes.
//!
//! Field order here is the order keys appear in the written manifest.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

/// A data source binding a contract to its indexing mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
  pub kind: String,
  pub name: String,
  pub network: String,
  pub source: Source,
  pub mapping: Mapping,
}

/// Where the contract lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
  pub address: String,
  pub abi: String,
}

/// How events are turned into entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mapping {
  pub kind: String,
  pub api_version: String,
  pub language: String,
  pub entities: Vec<String>,
  pub abis: Vec<AbiReference>,
  pub event_handlers: Vec<EventHandler>,
  pub file: String,
}

/// An ABI file made available to the mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbiReference {
  pub name: String,
  pub file: String,
}

/// Routes one event signature to a handler function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventHandler {
  pub event: String,
  pub handler: String,
}

impl DataSource {
  /// Convert into an ordered YAML node ready to append to a manifest.
  pub fn to_value(&self) -> Result<Value, serde_yaml::Error> {
    serde_yaml::to_value(self)
  }
}
