//! Source text for generated schema, mapping and test files.

use std::collections::HashSet;

use heck::ToLowerCamelCase;

use super::types::{EventField, asc_type, event_fields, graphql_type, param_name, value_constructor};
use crate::abi::{AbiDescriptor, AbiEntry};

/// Events that get their own entity, with their binding class alias.
///
/// Merged events and repeated overloads of an already emitted entity are
/// left out.
fn entity_events<'a>(abi: &'a AbiDescriptor, collision_entities: &[String]) -> Vec<(String, &'a AbiEntry)> {
  let mut emitted: HashSet<String> = HashSet::new();
  abi
    .event_aliases()
    .into_iter()
    .filter(|(_, event)| !collision_entities.iter().any(|c| c == event.name()))
    .filter(|(_, event)| emitted.insert(event.name().to_string()))
    .collect()
}

/// Events that get a handler: every kept event, overloads included.
fn handler_events<'a>(abi: &'a AbiDescriptor, collision_entities: &[String]) -> Vec<(String, &'a AbiEntry)> {
  abi
    .event_aliases()
    .into_iter()
    .filter(|(_, event)| !collision_entities.iter().any(|c| c == event.name()))
    .collect()
}

/// GraphQL entity definitions, one per event.
pub fn schema_types(abi: &AbiDescriptor, collision_entities: &[String]) -> String {
  let mut out = String::new();
  for (_, event) in entity_events(abi, collision_entities) {
    if !out.is_empty() {
      out.push('\n');
    }
    out.push_str(&format!("type {} @entity(immutable: true) {{\n", event.name()));
    out.push_str("  id: Bytes!\n");
    for EventField { field, kind, .. } in event_fields(event.inputs()) {
      out.push_str(&format!("  {}: {}! # {}\n", field, graphql_type(&kind), kind));
    }
    out.push_str(ENTITY_BLOCK_FIELDS);
    out.push_str("}\n");
  }
  out
}

const ENTITY_BLOCK_FIELDS: &str = "  blockNumber: BigInt!
  blockTimestamp: BigInt!
  transactionHash: Bytes!
";

const HANDLER_BLOCK_ASSIGNMENTS: &str = "
  entity.blockNumber = event.block.number
  entity.blockTimestamp = event.block.timestamp
  entity.transactionHash = event.transaction.hash

  entity.save()
}
";

/// AssemblyScript mapping with one handler per event.
pub fn mapping_source(abi: &AbiDescriptor, contract_name: &str, collision_entities: &[String]) -> String {
  let handlers = handler_events(abi, collision_entities);
  if handlers.is_empty() {
    return String::new();
  }
  let entities: Vec<_> = entity_events(abi, collision_entities)
    .into_iter()
    .map(|(_, event)| event.name().to_string())
    .collect();
  let imports: Vec<_> = handlers
    .iter()
    .map(|(alias, _)| format!("  {} as {}Event", alias, alias))
    .collect();

  let mut out = format!(
    "import {{\n{}\n}} from \"../generated/{2}/{2}\"\nimport {{ {} }} from \"../generated/schema\"\n",
    imports.join(",\n"),
    entities.join(", "),
    contract_name
  );

  for (alias, event) in &handlers {
    out.push_str(&format!(
      "\nexport function handle{0}(event: {0}Event): void {{\n  let entity = new {1}(\n    event.transaction.hash.concatI32(event.logIndex.toI32())\n  )\n",
      alias,
      event.name()
    ));
    for field in event_fields(event.inputs()) {
      out.push_str(&format!("  entity.{} = event.params.{}\n", field.field, field.accessor));
    }
    out.push_str(HANDLER_BLOCK_ASSIGNMENTS);
  }
  out
}

/// Unit test helpers building mock events for each handler.
pub fn test_utils_source(abi: &AbiDescriptor, contract_name: &str) -> String {
  let events = abi.event_aliases();

  let mut out = String::from(
    "import { newMockEvent } from \"matchstick-as\"\nimport { ethereum, Address, BigInt, Bytes } from \"@graphprotocol/graph-ts\"\n",
  );
  if events.is_empty() {
    return out;
  }
  let aliases: Vec<_> = events.iter().map(|(alias, _)| alias.as_str()).collect();
  out.push_str(&format!(
    "import {{ {} }} from \"../generated/{1}/{1}\"\n",
    aliases.join(", "),
    contract_name
  ));

  for (alias, event) in &events {
    let var = format!("{}Event", alias.to_lower_camel_case());
    let params: Vec<(String, &str)> = event
      .inputs()
      .iter()
      .enumerate()
      .map(|(index, param)| (param_name(param, index), param.kind.as_str()))
      .collect();
    let args: Vec<_> = params
      .iter()
      .map(|(name, kind)| format!("{}: {}", name, asc_type(kind)))
      .collect();

    out.push_str(&format!(
      "\nexport function create{0}Event({1}): {0} {{\n  let {2} = changetype<{0}>(newMockEvent())\n\n  {2}.parameters = new Array()\n",
      alias,
      args.join(", "),
      var
    ));
    for (name, kind) in &params {
      out.push_str(&match value_constructor(kind) {
        Some(constructor) => format!(
          "\n  {0}.parameters.push(\n    new ethereum.EventParam(\"{1}\", ethereum.Value.{2}({1}))\n  )\n",
          var, name, constructor
        ),
        None => format!("\n  // {}: {} has no ethereum.Value constructor, push it by hand\n", name, kind),
      });
    }
    out.push_str(&format!("\n  return {}\n}}\n", var));
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::abi::AbiParam;

  fn token_abi() -> AbiDescriptor {
    AbiDescriptor::new(
      "Token",
      vec![
        AbiEntry::event(
          "Transfer",
          vec![
            AbiParam::new("from", "address").indexed(),
            AbiParam::new("to", "address").indexed(),
            AbiParam::new("value", "uint256"),
          ],
        ),
        AbiEntry::function("approve", vec![]),
        AbiEntry::event("Paused", vec![AbiParam::new("", "bool")]),
      ],
    )
  }

  #[test]
  fn schema_has_one_type_per_event() {
    let schema = schema_types(&token_abi(), &[]);

    assert_eq!(
      schema,
      "type Transfer @entity(immutable: true) {
  id: Bytes!
  from: Bytes! # address
  to: Bytes! # address
  value: BigInt! # uint256
  blockNumber: BigInt!
  blockTimestamp: BigInt!
  transactionHash: Bytes!
}

type Paused @entity(immutable: true) {
  id: Bytes!
  param0: Boolean! # bool
  blockNumber: BigInt!
  blockTimestamp: BigInt!
  transactionHash: Bytes!
}
"
    );
  }

  #[test]
  fn schema_skips_merged_entities() {
    let schema = schema_types(&token_abi(), &["Transfer".to_string()]);

    assert!(!schema.contains("type Transfer "));
    assert!(schema.contains("type Paused "));
  }

  #[test]
  fn mapping_imports_events_and_entities() {
    let mapping = mapping_source(&token_abi(), "Token", &[]);

    assert!(mapping.starts_with("import {\n  Transfer as TransferEvent,\n  Paused as PausedEvent\n}"));
    assert!(mapping.contains("from \"../generated/Token/Token\""));
    assert!(mapping.contains("import { Transfer, Paused } from \"../generated/schema\""));
    assert!(mapping.contains("export function handleTransfer(event: TransferEvent): void {"));
    assert!(mapping.contains("  entity.value = event.params.value\n"));
    assert!(mapping.contains("  entity.param0 = event.params.param0\n"));
  }

  #[test]
  fn mapping_for_overloads_reuses_entity() {
    let abi = AbiDescriptor::new(
      "Token",
      vec![
        AbiEntry::event("Transfer", vec![AbiParam::new("value", "uint256")]),
        AbiEntry::event("Transfer", vec![AbiParam::new("value", "uint256"), AbiParam::new("memo", "string")]),
      ],
    );

    let mapping = mapping_source(&abi, "Token", &[]);

    assert!(mapping.contains("export function handleTransfer1(event: Transfer1Event): void {"));
    assert!(mapping.contains("import { Transfer } from \"../generated/schema\""));
  }

  #[test]
  fn mapping_without_events_is_empty() {
    let abi = AbiDescriptor::new("Token", vec![AbiEntry::function("approve", vec![])]);
    assert!(mapping_source(&abi, "Token", &[]).is_empty());
  }

  #[test]
  fn mapping_handler_has_full_body() {
    let abi = AbiDescriptor::new("Token", vec![AbiEntry::event("Paused", vec![AbiParam::new("", "bool")])]);

    assert_eq!(
      mapping_source(&abi, "Token", &[]),
      "import {
  Paused as PausedEvent
} from \"../generated/Token/Token\"
import { Paused } from \"../generated/schema\"

export function handlePaused(event: PausedEvent): void {
  let entity = new Paused(
    event.transaction.hash.concatI32(event.logIndex.toI32())
  )
  entity.param0 = event.params.param0

  entity.blockNumber = event.block.number
  entity.blockTimestamp = event.block.timestamp
  entity.transactionHash = event.transaction.hash

  entity.save()
}
"
    );
  }

  #[test]
  fn test_utils_for_one_event() {
    let abi = AbiDescriptor::new("Token", vec![AbiEntry::event("Paused", vec![AbiParam::new("account", "address")])]);

    assert_eq!(
      test_utils_source(&abi, "Token"),
      "import { newMockEvent } from \"matchstick-as\"
import { ethereum, Address, BigInt, Bytes } from \"@graphprotocol/graph-ts\"
import { Paused } from \"../generated/Token/Token\"

export function createPausedEvent(account: Address): Paused {
  let pausedEvent = changetype<Paused>(newMockEvent())

  pausedEvent.parameters = new Array()

  pausedEvent.parameters.push(
    new ethereum.EventParam(\"account\", ethereum.Value.fromAddress(account))
  )

  return pausedEvent
}
"
    );
  }

  #[test]
  fn test_utils_build_mock_events() {
    let utils = test_utils_source(&token_abi(), "Token");

    assert!(utils.contains("import { Transfer, Paused } from \"../generated/Token/Token\""));
    assert!(utils.contains("export function createTransferEvent(from: Address, to: Address, value: BigInt): Transfer {"));
    assert!(utils.contains("let transferEvent = changetype<Transfer>(newMockEvent())"));
    assert!(utils.contains("new ethereum.EventParam(\"value\", ethereum.Value.fromUnsignedBigInt(value))"));
    assert!(utils.contains("export function createPausedEvent(param0: boolean): Paused {"));
  }
}
