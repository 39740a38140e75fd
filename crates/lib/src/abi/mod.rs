//! Contract ABI descriptors.
//!
//! Only the parts of an ABI entry this crate inspects are typed. Each entry
//! also holds its source object, so a written ABI file matches its input key
//! for key.
//!
//! # Accepted Files
//!
//! - a bare JSON array of entries
//! - an artifact object with an `abi` array (Truffle, Hardhat, Foundry)
//! - an object with `compilerOutput.abi`

pub mod fetch;

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::debug;

pub use fetch::{AbiSource, ExplorerClient};

/// Errors that can occur while acquiring an ABI.
#[derive(Debug, Error)]
pub enum AbiError {
  /// Failed to read a local ABI file.
  #[error("failed to read ABI file {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// The ABI JSON could not be parsed.
  #[error("failed to parse ABI: {0}")]
  Parse(#[source] serde_json::Error),

  /// The JSON parsed but holds no recognizable ABI.
  #[error("no ABI found in {0}")]
  InvalidFormat(String),

  /// The explorer has no verified ABI for the address.
  #[error("ABI not found for {address} on {network}, try loading it from a local file")]
  NotFound { network: String, address: String },

  /// The explorer could not be reached or answered with garbage.
  #[error("failed to fetch ABI from {url}: {source}")]
  Network {
    url: String,
    #[source]
    source: reqwest::Error,
  },
}

/// A contract's interface description.
#[derive(Debug, Clone, PartialEq)]
pub struct AbiDescriptor {
  pub contract_name: String,
  pub entries: Vec<AbiEntry>,
}

/// One function, event, constructor or error declaration.
///
/// The entry keeps the JSON object it was read from and serializes back to
/// it unchanged; a rename rewrites the `name` key in place.
#[derive(Debug, Clone, PartialEq)]
pub struct AbiEntry {
  kind: String,
  name: Option<String>,
  inputs: Vec<AbiParam>,
  raw: Map<String, Value>,
}

/// A parameter of an entry, possibly a tuple with components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbiParam {
  #[serde(default)]
  pub name: String,

  #[serde(rename = "type")]
  pub kind: String,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub indexed: Option<bool>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub components: Option<Vec<AbiParam>>,

  #[serde(flatten)]
  pub rest: Map<String, Value>,
}

impl AbiEntry {
  /// Create an event entry with the given inputs.
  pub fn event(name: &str, inputs: Vec<AbiParam>) -> Self {
    Self::declare("event", name, inputs)
  }

  /// Create a function entry without outputs.
  pub fn function(name: &str, inputs: Vec<AbiParam>) -> Self {
    Self::declare("function", name, inputs)
  }

  fn declare(kind: &str, name: &str, inputs: Vec<AbiParam>) -> Self {
    let raw = match json!({ "type": kind, "name": name, "inputs": inputs }) {
      Value::Object(raw) => raw,
      _ => Map::new(),
    };
    Self {
      kind: kind.to_string(),
      name: Some(name.to_string()),
      inputs,
      raw,
    }
  }

  /// The entry type; entries without one are functions.
  pub fn kind(&self) -> &str {
    &self.kind
  }

  pub fn inputs(&self) -> &[AbiParam] {
    &self.inputs
  }

  /// Replace the declared name, keeping every other key where it was.
  pub fn rename(&mut self, name: &str) {
    self.name = Some(name.to_string());
    self.raw.insert("name".to_string(), Value::String(name.to_string()));
  }

  pub fn is_event(&self) -> bool {
    self.kind == "event"
  }

  /// The declared name, empty for anonymous entries such as constructors.
  pub fn name(&self) -> &str {
    self.name.as_deref().unwrap_or_default()
  }

  /// Canonical event signature, e.g. `Transfer(indexed address,indexed address,uint256)`.
  pub fn signature(&self) -> String {
    let params: Vec<String> = self
      .inputs
      .iter()
      .map(|param| {
        let kind = param.canonical_type();
        if param.indexed == Some(true) {
          format!("indexed {}", kind)
        } else {
          kind
        }
      })
      .collect();
    format!("{}({})", self.name(), params.join(","))
  }
}

impl Serialize for AbiEntry {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    self.raw.serialize(serializer)
  }
}

impl<'de> Deserialize<'de> for AbiEntry {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = Map::<String, Value>::deserialize(deserializer)?;

    let kind = match raw.get("type") {
      None => "function".to_string(),
      Some(Value::String(kind)) => kind.clone(),
      Some(other) => return Err(de::Error::custom(format!("entry type must be a string, got {}", other))),
    };
    let name = match raw.get("name") {
      None | Some(Value::Null) => None,
      Some(Value::String(name)) => Some(name.clone()),
      Some(other) => return Err(de::Error::custom(format!("entry name must be a string, got {}", other))),
    };
    let inputs = match raw.get("inputs") {
      None | Some(Value::Null) => Vec::new(),
      Some(inputs) => Vec::<AbiParam>::deserialize(inputs).map_err(de::Error::custom)?,
    };

    Ok(Self {
      kind,
      name,
      inputs,
      raw,
    })
  }
}

impl AbiParam {
  pub fn new(name: &str, kind: &str) -> Self {
    Self {
      name: name.to_string(),
      kind: kind.to_string(),
      indexed: None,
      components: None,
      rest: Map::new(),
    }
  }

  pub fn indexed(mut self) -> Self {
    self.indexed = Some(true);
    self
  }

  pub fn with_components(mut self, components: Vec<AbiParam>) -> Self {
    self.components = Some(components);
    self
  }

  /// Type with tuples expanded into their component types.
  pub fn canonical_type(&self) -> String {
    match (self.kind.strip_prefix("tuple"), &self.components) {
      (Some(array_suffix), Some(components)) => {
        let inner: Vec<String> = components.iter().map(AbiParam::canonical_type).collect();
        format!("({}){}", inner.join(","), array_suffix)
      }
      _ => self.kind.clone(),
    }
  }
}

impl AbiDescriptor {
  pub fn new(contract_name: &str, entries: Vec<AbiEntry>) -> Self {
    Self {
      contract_name: contract_name.to_string(),
      entries,
    }
  }

  /// Load an ABI from a local JSON file.
  pub fn load(contract_name: &str, path: &Path) -> Result<Self, AbiError> {
    debug!(path = %path.display(), contract = contract_name, "loading ABI from file");
    let content = fs::read_to_string(path).map_err(|e| AbiError::Read {
      path: path.to_path_buf(),
      source: e,
    })?;
    let json: Value = serde_json::from_str(&content).map_err(AbiError::Parse)?;
    Self::from_json(contract_name, json, &path.display().to_string())
  }

  /// Extract an ABI from already parsed JSON.
  ///
  /// `origin` names the input in error messages.
  pub fn from_json(contract_name: &str, json: Value, origin: &str) -> Result<Self, AbiError> {
    let array = match json {
      Value::Array(_) => json,
      Value::Object(mut object) => {
        let nested = object
          .get_mut("compilerOutput")
          .and_then(|output| output.get_mut("abi"))
          .map(Value::take);
        match object.remove("abi").or(nested) {
          Some(abi @ Value::Array(_)) => abi,
          _ => return Err(AbiError::InvalidFormat(origin.to_string())),
        }
      }
      _ => return Err(AbiError::InvalidFormat(origin.to_string())),
    };

    let entries: Vec<AbiEntry> = serde_json::from_value(array).map_err(AbiError::Parse)?;
    Ok(Self::new(contract_name, entries))
  }

  /// Event entries in declaration order.
  pub fn events(&self) -> impl Iterator<Item = &AbiEntry> {
    self.entries.iter().filter(|entry| entry.is_event())
  }

  /// Events paired with a unique alias.
  ///
  /// The first event of a name keeps it; later overloads get `Name1`,
  /// `Name2`, ... This matches the class names generated bindings use.
  pub fn event_aliases(&self) -> Vec<(String, &AbiEntry)> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    self
      .events()
      .map(|event| {
        let count = seen.entry(event.name()).or_insert(0);
        let alias = match *count {
          0 => event.name().to_string(),
          n => format!("{}{}", event.name(), n),
        };
        *count += 1;
        (alias, event)
      })
      .collect()
  }

  /// The entries as pretty-printed JSON.
  pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&self.entries)
  }
}
