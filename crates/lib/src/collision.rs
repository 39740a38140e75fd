//! Event/entity collision resolution.
//!
//! Every event of a new contract becomes an entity of the same name. When that
//! name is already declared by the manifest, the event is either renamed to
//! `<Contract><Event>` or, in merge mode, dropped so the existing entity
//! absorbs it. A renamed event that would collide again is fatal.

use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, warn};

use crate::abi::{AbiDescriptor, AbiEntry};

/// A collision that renaming cannot fix.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CollisionError {
  #[error(
    "Contract name ('{contract}') + event name ('{event}') entity already exists. \
     Choose a different contract name or rerun with --merge-entities"
  )]
  EntityExists { contract: String, event: String },
}

/// Outcome of resolving an ABI against existing entity names.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionResult {
  /// The ABI entries after renaming or merging.
  pub abi_data: Vec<AbiEntry>,
  /// Event names merged into existing entities, each listed once.
  pub collision_entities: Vec<String>,
  /// True when no event escaped collision (vacuously true without events).
  pub only_collisions: bool,
}

impl CollisionResult {
  /// The resolved entries as a descriptor for `contract_name`.
  pub fn to_descriptor(&self, contract_name: &str) -> AbiDescriptor {
    AbiDescriptor::new(contract_name, self.abi_data.clone())
  }
}

/// Reconcile the events of `abi` with `existing` entity names.
///
/// Non-event entries and non-colliding events pass through in order. The
/// input descriptor is never modified, so a fatal collision leaves nothing
/// half-renamed behind.
pub fn resolve(
  abi: &AbiDescriptor,
  existing: &HashSet<String>,
  contract_name: &str,
  merge_entities: bool,
) -> Result<CollisionResult, CollisionError> {
  // Events that keep their own name; a rename must not land on one of these.
  let untouched: HashSet<&str> = abi
    .events()
    .map(AbiEntry::name)
    .filter(|name| !existing.contains(*name))
    .collect();

  let mut abi_data = Vec::with_capacity(abi.entries.len());
  let mut collision_entities: Vec<String> = Vec::new();
  let mut only_collisions = true;

  for entry in &abi.entries {
    if !entry.is_event() {
      abi_data.push(entry.clone());
      continue;
    }

    let name = entry.name();
    if !existing.contains(name) {
      only_collisions = false;
      abi_data.push(entry.clone());
      continue;
    }

    let prefixed = format!("{}{}", contract_name, name);
    if existing.contains(&prefixed) || (!merge_entities && untouched.contains(prefixed.as_str())) {
      return Err(CollisionError::EntityExists {
        contract: contract_name.to_string(),
        event: name.to_string(),
      });
    }

    if merge_entities {
      debug!(event = name, "merging event into existing entity");
      if !collision_entities.iter().any(|e| e == name) {
        collision_entities.push(name.to_string());
      }
    } else {
      warn!(event = name, renamed = %prefixed, "event collides with an existing entity, renaming");
      let mut renamed = entry.clone();
      renamed.rename(&prefixed);
      abi_data.push(renamed);
    }
  }

  Ok(CollisionResult {
    abi_data,
    collision_entities,
    only_collisions,
  })
}
