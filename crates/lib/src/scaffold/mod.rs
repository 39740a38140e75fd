//! Generated project files for a new data source.
//!
//! Paths are resolved against the project root, the directory holding the
//! manifest:
//! - `abis/<Contract>.json`: the resolved ABI
//! - the manifest's `schema.file`: entity types appended
//! - `src/<contract>.ts`: event handlers
//! - `tests/<contract>-utils.ts`: mock event constructors
//!
//! Events listed as collision entities are merged into existing entities and
//! never get a type or handler of their own.

mod templates;
mod types;

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::abi::AbiDescriptor;
use crate::consts::{ABIS_DIR, MAPPINGS_DIR, TESTS_DIR};
use crate::datasource::mapping_file_stem;

pub use templates::{mapping_source, schema_types, test_utils_source};
pub use types::{EventField, asc_type, event_fields, graphql_type};

/// Errors that can occur while writing generated files.
#[derive(Debug, Error)]
pub enum ScaffoldError {
  #[error("failed to create directory {}: {source}", path.display())]
  CreateDir { path: PathBuf, source: io::Error },

  #[error("failed to write file {}: {source}", path.display())]
  Write { path: PathBuf, source: io::Error },

  #[error("failed to serialize ABI: {0}")]
  Serialize(#[source] serde_json::Error),
}

/// Files written for one data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaffoldFiles {
  pub abi: PathBuf,
  /// `None` when the manifest declares no schema file.
  pub schema: Option<PathBuf>,
  pub mapping: PathBuf,
  pub tests: PathBuf,
}

impl ScaffoldFiles {
  pub fn paths(&self) -> impl Iterator<Item = &Path> {
    [Some(&self.abi), self.schema.as_ref(), Some(&self.mapping), Some(&self.tests)]
      .into_iter()
      .flatten()
      .map(PathBuf::as_path)
  }
}

/// Write every generated file for `abi`.
pub fn write_all(
  root: &Path,
  abi: &AbiDescriptor,
  schema_file: Option<&str>,
  collision_entities: &[String],
) -> Result<ScaffoldFiles, ScaffoldError> {
  let abi_path = write_abi(root, abi)?;
  let schema = match schema_file {
    Some(file) => Some(write_schema(&root.join(file), abi, collision_entities)?),
    None => {
      warn!("manifest declares no schema file, skipping entity generation");
      None
    }
  };
  let mapping = write_mapping(root, abi, collision_entities)?;
  let tests = write_tests(root, abi)?;

  Ok(ScaffoldFiles {
    abi: abi_path,
    schema,
    mapping,
    tests,
  })
}

/// Write the ABI to `abis/<Contract>.json`.
pub fn write_abi(root: &Path, abi: &AbiDescriptor) -> Result<PathBuf, ScaffoldError> {
  let path = root.join(ABIS_DIR).join(format!("{}.json", abi.contract_name));
  let content = abi.to_json_pretty().map_err(ScaffoldError::Serialize)?;
  write_file(&path, &content)?;
  Ok(path)
}

/// Append entity types for the kept events to the schema at `path`.
pub fn write_schema(path: &Path, abi: &AbiDescriptor, collision_entities: &[String]) -> Result<PathBuf, ScaffoldError> {
  let types = schema_types(abi, collision_entities);
  if types.is_empty() {
    debug!(path = %path.display(), "no new entities for schema");
    return Ok(path.to_path_buf());
  }

  let write_err = |e| ScaffoldError::Write {
    path: path.to_path_buf(),
    source: e,
  };

  let separator = match fs::read_to_string(path) {
    Ok(existing) if existing.is_empty() => "",
    Ok(existing) if existing.ends_with('\n') => "\n",
    Ok(_) => "\n\n",
    Err(e) if e.kind() == io::ErrorKind::NotFound => "",
    Err(e) => return Err(write_err(e)),
  };

  ensure_parent(path)?;
  let mut file = OpenOptions::new().create(true).append(true).open(path).map_err(write_err)?;
  file
    .write_all(format!("{}{}", separator, types).as_bytes())
    .map_err(write_err)?;

  debug!(path = %path.display(), "appended entities to schema");
  Ok(path.to_path_buf())
}

/// Write the mapping to `src/<contract>.ts`.
pub fn write_mapping(root: &Path, abi: &AbiDescriptor, collision_entities: &[String]) -> Result<PathBuf, ScaffoldError> {
  let stem = mapping_file_stem(&abi.contract_name);
  let path = root.join(MAPPINGS_DIR).join(format!("{}.ts", stem));
  write_file(&path, &mapping_source(abi, &abi.contract_name, collision_entities))?;
  Ok(path)
}

/// Write mock event helpers to `tests/<contract>-utils.ts`.
pub fn write_tests(root: &Path, abi: &AbiDescriptor) -> Result<PathBuf, ScaffoldError> {
  let stem = mapping_file_stem(&abi.contract_name);
  let path = root.join(TESTS_DIR).join(format!("{}-utils.ts", stem));
  write_file(&path, &test_utils_source(abi, &abi.contract_name))?;
  Ok(path)
}

fn ensure_parent(path: &Path) -> Result<(), ScaffoldError> {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).map_err(|e| ScaffoldError::CreateDir {
      path: parent.to_path_buf(),
      source: e,
    })?;
  }
  Ok(())
}

fn write_file(path: &Path, content: &str) -> Result<(), ScaffoldError> {
  ensure_parent(path)?;
  fs::write(path, content).map_err(|e| ScaffoldError::Write {
    path: path.to_path_buf(),
    source: e,
  })?;
  debug!(path = %path.display(), "wrote file");
  Ok(())
}
