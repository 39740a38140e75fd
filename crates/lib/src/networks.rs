//! The `networks.json` registry of deployed contract addresses.
//!
//! Layout: `{ "<network>": { "<contract>": { "address": "<address>" } } }`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum NetworksError {
  #[error("failed to read networks file {}: {source}", path.display())]
  Read { path: PathBuf, source: io::Error },

  #[error("failed to parse networks file {}: {source}", path.display())]
  Parse { path: PathBuf, source: serde_json::Error },

  #[error("networks file {}: '{key}' is not an object", path.display())]
  NotAnObject { path: PathBuf, key: String },

  #[error("failed to write networks file {}: {source}", path.display())]
  Write { path: PathBuf, source: io::Error },
}

/// Record `address` for `contract` on `network`.
///
/// Other networks and contracts keep their order; an existing entry for the
/// contract is replaced. The file is created when missing.
pub fn update_networks_file(path: &Path, network: &str, contract: &str, address: &str) -> Result<(), NetworksError> {
  let mut root = match fs::read_to_string(path) {
    Ok(content) if content.trim().is_empty() => Map::new(),
    Ok(content) => parse(path, &content)?,
    Err(e) if e.kind() == io::ErrorKind::NotFound => {
      debug!(path = %path.display(), "networks file missing, creating it");
      Map::new()
    }
    Err(e) => {
      return Err(NetworksError::Read {
        path: path.to_path_buf(),
        source: e,
      });
    }
  };

  let contracts = root
    .entry(network.to_string())
    .or_insert_with(|| Value::Object(Map::new()))
    .as_object_mut()
    .ok_or_else(|| NetworksError::NotAnObject {
      path: path.to_path_buf(),
      key: network.to_string(),
    })?;
  contracts.insert(contract.to_string(), json!({ "address": address }));

  let write_err = |e| NetworksError::Write {
    path: path.to_path_buf(),
    source: e,
  };
  let mut content = serde_json::to_string_pretty(&Value::Object(root)).map_err(io::Error::other).map_err(write_err)?;
  content.push('\n');
  fs::write(path, content).map_err(write_err)?;

  info!(path = %path.display(), network, contract, "updated networks file");
  Ok(())
}

fn parse(path: &Path, content: &str) -> Result<Map<String, Value>, NetworksError> {
  let value: Value = serde_json::from_str(content).map_err(|e| NetworksError::Parse {
    path: path.to_path_buf(),
    source: e,
  })?;
  match value {
    Value::Object(map) => Ok(map),
    _ => Err(NetworksError::NotAnObject {
      path: path.to_path_buf(),
      key: "<root>".to_string(),
    }),
  }
}
