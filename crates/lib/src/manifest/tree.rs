//! Path-addressable manifest tree.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use thiserror::Error;
use tracing::debug;

/// Top-level key holding the bound data sources.
pub const DATA_SOURCES_KEY: &str = "dataSources";

/// Top-level key holding the unbound data source templates.
pub const TEMPLATES_KEY: &str = "templates";

/// One step of a path into the manifest tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
  /// A key in a YAML mapping.
  Key(&'a str),
  /// A position in a YAML sequence.
  Index(usize),
}

impl fmt::Display for Segment<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Segment::Key(key) => write!(f, "{}", key),
      Segment::Index(index) => write!(f, "{}", index),
    }
  }
}

/// Renders a path as `dataSources.0.mapping`.
pub fn display_path(path: &[Segment<'_>]) -> String {
  path.iter().map(ToString::to_string).collect::<Vec<_>>().join(".")
}

/// Errors that can occur when working with a manifest tree.
#[derive(Debug, Error)]
pub enum ManifestError {
  /// Failed to read the manifest file.
  #[error("failed to read manifest {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// Failed to parse the manifest YAML.
  #[error("failed to parse manifest: {0}")]
  Parse(#[source] serde_yaml::Error),

  /// Failed to serialize the manifest YAML.
  #[error("failed to serialize manifest: {0}")]
  Serialize(#[source] serde_yaml::Error),

  /// Failed to write the manifest file.
  #[error("failed to write manifest {}: {source}", path.display())]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// The manifest document is not a YAML mapping.
  #[error("manifest root must be a mapping")]
  NotAMapping,

  /// A path does not resolve to a node that can hold the requested value.
  #[error("manifest path '{path}' does not exist")]
  PathNotFound { path: String },
}

/// A parsed manifest that remembers its source text.
///
/// Until the first mutation, [`ManifestTree::to_yaml_string`] hands back the
/// exact text that was loaded.
#[derive(Debug, Clone)]
pub struct ManifestTree {
  source: String,
  root: Value,
  dirty: bool,
}

impl ManifestTree {
  /// Load a manifest from disk.
  pub fn load(path: &Path) -> Result<Self, ManifestError> {
    debug!(path = %path.display(), "loading manifest");
    let source = fs::read_to_string(path).map_err(|e| ManifestError::Read {
      path: path.to_path_buf(),
      source: e,
    })?;
    Self::parse(&source)
  }

  /// Parse a manifest from YAML text.
  pub fn parse(source: &str) -> Result<Self, ManifestError> {
    let root: Value = serde_yaml::from_str(source).map_err(ManifestError::Parse)?;
    if !root.is_mapping() {
      return Err(ManifestError::NotAMapping);
    }

    Ok(Self {
      source: source.to_string(),
      root,
      dirty: false,
    })
  }

  /// The whole tree.
  pub fn root(&self) -> &Value {
    &self.root
  }

  /// Whether the tree differs from the loaded text.
  pub fn is_modified(&self) -> bool {
    self.dirty
  }

  /// Look up the node at `path`.
  pub fn get(&self, path: &[Segment<'_>]) -> Option<&Value> {
    path.iter().try_fold(&self.root, |node, segment| match segment {
      Segment::Key(key) => node.as_mapping()?.get(*key),
      Segment::Index(index) => node.as_sequence()?.get(*index),
    })
  }

  /// Look up a string scalar at `path`.
  pub fn get_str(&self, path: &[Segment<'_>]) -> Option<&str> {
    self.get(path).and_then(Value::as_str)
  }

  /// Replace the node at `path`.
  ///
  /// The parent must exist. A missing final key is appended to its mapping;
  /// a sequence index must already be in bounds.
  pub fn set(&mut self, path: &[Segment<'_>], value: Value) -> Result<(), ManifestError> {
    let Some((last, parents)) = path.split_last() else {
      if !value.is_mapping() {
        return Err(ManifestError::NotAMapping);
      }
      self.root = value;
      self.dirty = true;
      return Ok(());
    };

    let not_found = || ManifestError::PathNotFound {
      path: display_path(path),
    };

    let mut node = &mut self.root;
    for segment in parents {
      node = match segment {
        Segment::Key(key) => node.as_mapping_mut().and_then(|m| m.get_mut(*key)),
        Segment::Index(index) => node.as_sequence_mut().and_then(|s| s.get_mut(*index)),
      }
      .ok_or_else(not_found)?;
    }

    match last {
      Segment::Key(key) => {
        let mapping = node.as_mapping_mut().ok_or_else(not_found)?;
        mapping.insert(Value::String((*key).to_string()), value);
      }
      Segment::Index(index) => {
        let slot = node
          .as_sequence_mut()
          .and_then(|s| s.get_mut(*index))
          .ok_or_else(not_found)?;
        *slot = value;
      }
    }

    self.dirty = true;
    Ok(())
  }

  /// All nodes under `dataSources`, empty when the key is absent.
  pub fn data_sources(&self) -> &[Value] {
    self.sequence(DATA_SOURCES_KEY)
  }

  /// All nodes under `templates`, empty when the key is absent.
  pub fn templates(&self) -> &[Value] {
    self.sequence(TEMPLATES_KEY)
  }

  /// Path of the GraphQL schema, relative to the manifest.
  pub fn schema_file(&self) -> Option<&str> {
    self.get_str(&[Segment::Key("schema"), Segment::Key("file")])
  }

  fn sequence(&self, key: &str) -> &[Value] {
    self
      .get(&[Segment::Key(key)])
      .and_then(Value::as_sequence)
      .map(Vec::as_slice)
      .unwrap_or_default()
  }

  /// Append a node to the end of `dataSources`.
  ///
  /// Existing entries keep their order. The sequence is created when the
  /// manifest has none yet.
  pub fn append_data_source(&mut self, data_source: Value) -> Result<(), ManifestError> {
    let root = self.root.as_mapping_mut().ok_or(ManifestError::NotAMapping)?;

    match root.get_mut(DATA_SOURCES_KEY) {
      Some(Value::Sequence(sequence)) => sequence.push(data_source),
      Some(Value::Null) | None => {
        root.insert(
          Value::String(DATA_SOURCES_KEY.to_string()),
          Value::Sequence(vec![data_source]),
        );
      }
      Some(_) => {
        return Err(ManifestError::PathNotFound {
          path: DATA_SOURCES_KEY.to_string(),
        });
      }
    }

    self.dirty = true;
    Ok(())
  }

  /// Serialize the tree back to YAML.
  pub fn to_yaml_string(&self) -> Result<String, ManifestError> {
    if !self.dirty {
      return Ok(self.source.clone());
    }
    serde_yaml::to_string(&self.root).map_err(ManifestError::Serialize)
  }

  /// Write the tree to `path`.
  pub fn write(&self, path: &Path) -> Result<(), ManifestError> {
    let content = self.to_yaml_string()?;
    fs::write(path, content).map_err(|e| ManifestError::Write {
      path: path.to_path_buf(),
      source: e,
    })?;
    debug!(path = %path.display(), modified = self.dirty, "wrote manifest");
    Ok(())
  }
}

/// Builds a mapping from string keys, keeping the given order.
pub fn mapping<I, K>(entries: I) -> Value
where
  I: IntoIterator<Item = (K, Value)>,
  K: Into<String>,
{
  let mut map = Mapping::new();
  for (key, value) in entries {
    map.insert(Value::String(key.into()), value);
  }
  Value::Mapping(map)
}
